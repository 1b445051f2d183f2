use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Coin, Timestamp, Uint128};
use hongbao_common::{AssetInfo, AwardTier, CampaignKind};

use crate::state::Config;

#[cw_serde]
pub struct InstantiateMsg {
    /// Defaults to the instantiating address
    pub admin: Option<String>,
    pub creation_fee: Coin,
    pub randomness_oracle: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create a classic (lottery) campaign. The full award total is pulled
    /// from the sender as escrow; the creation fee is attached as funds.
    CreateCampaign {
        name: String,
        asset: AssetInfo,
        expiry: Timestamp,
        draws_per_account: u32,
        participants: Vec<String>,
        awards: Vec<AwardTier>,
    },
    /// Create a snatch (pool-splitting) campaign escrowing `amount`.
    CreateSnatchCampaign {
        name: String,
        asset: AssetInfo,
        amount: Uint128,
        expiry: Timestamp,
        claims_per_account: u32,
        min_snatch_amount: Uint128,
        max_snatch_amount: Uint128,
    },
    /// Draw once from a classic campaign.
    Draw { campaign_id: u64 },
    /// Snatch once from a snatch campaign.
    Snatch { campaign_id: u64 },
    /// Refund the unclaimed escrow and delete an expired classic campaign.
    /// Owner only.
    CloseCampaign { campaign_id: u64 },
    /// Refund the unclaimed escrow and delete an expired snatch campaign.
    /// Owner only.
    CloseSnatchCampaign { campaign_id: u64 },
    /// Add escrow to an active snatch campaign. Owner only.
    RefillSnatchCampaign { campaign_id: u64, amount: Uint128 },
    /// Update configuration. Admin only. An empty `randomness_oracle`
    /// removes the oracle.
    UpdateConfig {
        admin: Option<String>,
        creation_fee: Option<Coin>,
        randomness_oracle: Option<String>,
    },
    /// Send all accrued creation fees to `recipient` (default: admin).
    /// Admin only.
    CollectFees { recipient: Option<String> },
}

#[cw_serde]
pub struct MigrateMsg {}

/// Query message for the randomness oracle contract.
#[cw_serde]
pub enum OracleQueryMsg {
    LatestRound {},
    Beacon { round: u64 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(CampaignInfoResponse)]
    Campaign { campaign_id: u64 },
    #[returns(SnatchCampaignInfoResponse)]
    SnatchCampaign { campaign_id: u64 },
    /// Claims `account` has left; zero for accounts that cannot claim.
    #[returns(u32)]
    RemainingDraws { campaign_id: u64, account: String },
    #[returns(CampaignKind)]
    CampaignKind { campaign_id: u64 },
    #[returns(CampaignsResponse)]
    Campaigns {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(FeeBalancesResponse)]
    FeeBalances {},
}

#[cw_serde]
pub struct CampaignInfoResponse {
    pub id: u64,
    pub name: String,
    pub owner: String,
    pub asset: AssetInfo,
    pub expiry: Timestamp,
    pub remaining_awards: Vec<AwardTier>,
    pub remaining_award_amount: Uint128,
    pub draws_per_account: u32,
    pub participant_count: u32,
    pub total_draws_used: u64,
    pub total_paid: Uint128,
}

#[cw_serde]
pub struct SnatchCampaignInfoResponse {
    pub id: u64,
    pub name: String,
    pub owner: String,
    pub asset: AssetInfo,
    pub expiry: Timestamp,
    pub remaining_amount: Uint128,
    pub min_snatch_amount: Uint128,
    pub max_snatch_amount: Uint128,
    pub claims_per_account: u32,
    pub total_claims: u64,
    pub total_funded: Uint128,
    pub total_paid: Uint128,
}

#[cw_serde]
pub struct CampaignSummary {
    pub id: u64,
    pub kind: CampaignKind,
    pub name: String,
    pub owner: String,
    pub asset: AssetInfo,
    pub expiry: Timestamp,
    pub remaining_escrow: Uint128,
}

#[cw_serde]
pub struct CampaignsResponse {
    pub campaigns: Vec<CampaignSummary>,
}

#[cw_serde]
pub struct FeeBalancesResponse {
    pub fees: Vec<Coin>,
}

/// Arguments of `CreateCampaign`, unpacked for the handler.
pub struct CreateCampaignParams {
    pub name: String,
    pub asset: AssetInfo,
    pub expiry: Timestamp,
    pub draws_per_account: u32,
    pub participants: Vec<String>,
    pub awards: Vec<AwardTier>,
}

/// Arguments of `CreateSnatchCampaign`, unpacked for the handler.
pub struct CreateSnatchCampaignParams {
    pub name: String,
    pub asset: AssetInfo,
    pub amount: Uint128,
    pub expiry: Timestamp,
    pub claims_per_account: u32,
    pub min_snatch_amount: Uint128,
    pub max_snatch_amount: Uint128,
}

pub struct UpdateConfigParams {
    pub admin: Option<String>,
    pub creation_fee: Option<Coin>,
    pub randomness_oracle: Option<String>,
}
