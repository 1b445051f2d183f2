use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

/// The two campaign flavours: a discrete-tier lottery or a pool split into
/// bounded random portions.
#[cw_serde]
#[derive(Copy)]
pub enum CampaignKind {
    Classic,
    Snatch,
}

impl CampaignKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignKind::Classic => "classic",
            CampaignKind::Snatch => "snatch",
        }
    }
}

impl fmt::Display for CampaignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fungible asset escrowed by a campaign.
///
/// Native assets move through the bank module; cw20 assets through the
/// token contract at `contract_addr`.
#[cw_serde]
pub enum AssetInfo {
    Native { denom: String },
    Cw20 { contract_addr: String },
}

impl AssetInfo {
    pub fn native(denom: impl Into<String>) -> Self {
        AssetInfo::Native {
            denom: denom.into(),
        }
    }

    pub fn cw20(contract_addr: impl Into<String>) -> Self {
        AssetInfo::Cw20 {
            contract_addr: contract_addr.into(),
        }
    }

    /// Denom of a native asset, `None` for cw20.
    pub fn native_denom(&self) -> Option<&str> {
        match self {
            AssetInfo::Native { denom } => Some(denom),
            AssetInfo::Cw20 { .. } => None,
        }
    }
}

impl fmt::Display for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetInfo::Native { denom } => write!(f, "native:{}", denom),
            AssetInfo::Cw20 { contract_addr } => write!(f, "cw20:{}", contract_addr),
        }
    }
}

/// One award tier of a classic campaign. `count` is the number of awards
/// still available, each paying `amount`.
#[cw_serde]
pub struct AwardTier {
    pub label: String,
    pub count: u32,
    pub amount: Uint128,
}

impl AwardTier {
    pub fn new(label: impl Into<String>, count: u32, amount: impl Into<Uint128>) -> Self {
        Self {
            label: label.into(),
            count,
            amount: amount.into(),
        }
    }

    /// `count * amount`, the escrow still backing this tier.
    pub fn value(&self) -> Option<Uint128> {
        self.amount.checked_mul(Uint128::from(self.count)).ok()
    }
}
