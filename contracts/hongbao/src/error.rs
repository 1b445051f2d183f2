use cosmwasm_std::{StdError, Uint128};
use hongbao_common::CampaignKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("campaign {campaign_id} not found")]
    CampaignNotFound { campaign_id: u64 },

    #[error("campaign {campaign_id} is outside its time window for this operation (expiry: {expiry}, now: {now})")]
    Expired {
        campaign_id: u64,
        expiry: u64,
        now: u64,
    },

    #[error("{account} is not eligible for campaign {campaign_id}: {reason}")]
    NotEligible {
        campaign_id: u64,
        account: String,
        reason: String,
    },

    #[error("campaign {campaign_id} pool exhausted: {remaining} left, minimum claim is {minimum}")]
    PoolExhausted {
        campaign_id: u64,
        remaining: Uint128,
        minimum: Uint128,
    },

    #[error("insufficient escrow: need {needed}, have {available}")]
    InsufficientEscrow { needed: Uint128, available: Uint128 },

    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("campaign {campaign_id} is not a {expected} campaign")]
    KindMismatch {
        campaign_id: u64,
        expected: CampaignKind,
    },

    #[error("campaign {campaign_id} invariant violated: {reason}")]
    InvariantViolation { campaign_id: u64, reason: String },

    #[error("randomness unavailable: {reason}")]
    RandomnessUnavailable { reason: String },
}

impl ContractError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ContractError::InvalidParameters {
            reason: reason.into(),
        }
    }
}
