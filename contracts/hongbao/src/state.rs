use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use hongbao_common::{AssetInfo, AwardTier, CampaignKind};

use crate::error::ContractError;

pub const CONFIG: Item<Config> = Item::new("config");
pub const NEXT_CAMPAIGN_ID: Item<u64> = Item::new("next_campaign_id");
pub const CAMPAIGNS: Map<u64, Campaign> = Map::new("campaigns");

/// Per-account claim counter, keyed by (campaign id, account).
/// For classic campaigns the key doubles as the allow-list entry: it is
/// created at campaign creation with a zero count, and an absent key means
/// the account may not draw.
pub const CLAIMS: Map<(u64, &Addr), u32> = Map::new("claims");

/// Bumped on every claim so no two claims seed the generator identically.
pub const ENTROPY_NONCE: Item<u64> = Item::new("entropy_nonce");

/// Creation fees accrued and not yet collected, per denom.
pub const FEE_BALANCES: Map<&str, Uint128> = Map::new("fee_balances");

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    /// Minimum fee attached to every campaign creation
    pub creation_fee: Coin,
    /// Contract answering drand-style `LatestRound {}` / `Beacon { round }`
    /// queries. When set, every claim mixes the latest beacon into its seed.
    pub randomness_oracle: Option<Addr>,
}

#[cw_serde]
pub struct Campaign {
    pub id: u64,
    pub name: String,
    pub owner: Addr,
    pub asset: AssetInfo,
    pub expiry: Timestamp,
    pub created_at: Timestamp,
    /// Escrow pulled in so far (creation plus refills)
    pub total_funded: Uint128,
    /// Escrow pushed out to claimants so far
    pub total_paid: Uint128,
    pub pool: CampaignPool,
}

#[cw_serde]
pub enum CampaignPool {
    Classic(ClassicPool),
    Snatch(SnatchPool),
}

#[cw_serde]
pub struct ClassicPool {
    pub tiers: Vec<AwardTier>,
    pub draws_per_account: u32,
    /// Size of the allow-list
    pub participant_count: u32,
    /// Draws consumed campaign-wide, wins and losses alike
    pub total_draws_used: u64,
    /// Cached sum of `count * amount` over all tiers
    pub remaining_award_amount: Uint128,
}

#[cw_serde]
pub struct SnatchPool {
    pub remaining_amount: Uint128,
    pub min_snatch_amount: Uint128,
    pub max_snatch_amount: Uint128,
    pub claims_per_account: u32,
    pub total_claims: u64,
}

/// An account's view of one campaign's claim ledger while a claim is being
/// evaluated.
#[derive(Debug)]
pub struct Claimant<'a> {
    pub campaign_id: u64,
    pub account: &'a Addr,
    /// Claims (draws or snatches) used before this one
    pub used: u32,
}

impl<'a> Claimant<'a> {
    pub fn new(campaign_id: u64, account: &'a Addr, used: u32) -> Self {
        Self {
            campaign_id,
            account,
            used,
        }
    }

    pub fn not_eligible(&self, reason: impl Into<String>) -> ContractError {
        ContractError::NotEligible {
            campaign_id: self.campaign_id,
            account: self.account.to_string(),
            reason: reason.into(),
        }
    }
}

impl ClassicPool {
    pub fn remaining_award_count(&self) -> u64 {
        self.tiers.iter().map(|t| u64::from(t.count)).sum()
    }

    /// Draws still available across the whole allow-list.
    pub fn remaining_draws(&self) -> u64 {
        (u64::from(self.participant_count) * u64::from(self.draws_per_account))
            .saturating_sub(self.total_draws_used)
    }

    pub fn tier_total(&self) -> Option<Uint128> {
        self.tiers
            .iter()
            .try_fold(Uint128::zero(), |acc, tier| acc.checked_add(tier.value()?).ok())
    }
}

impl Campaign {
    pub fn kind(&self) -> CampaignKind {
        match self.pool {
            CampaignPool::Classic(_) => CampaignKind::Classic,
            CampaignPool::Snatch(_) => CampaignKind::Snatch,
        }
    }

    /// Escrow the engine still holds for this campaign.
    pub fn remaining_escrow(&self) -> Uint128 {
        match &self.pool {
            CampaignPool::Classic(pool) => pool.remaining_award_amount,
            CampaignPool::Snatch(pool) => pool.remaining_amount,
        }
    }

    pub fn is_active(&self, now: Timestamp) -> bool {
        now < self.expiry
    }

    pub fn expired_error(&self, now: Timestamp) -> ContractError {
        ContractError::Expired {
            campaign_id: self.id,
            expiry: self.expiry.seconds(),
            now: now.seconds(),
        }
    }

    pub fn classic(&self) -> Result<&ClassicPool, ContractError> {
        match &self.pool {
            CampaignPool::Classic(pool) => Ok(pool),
            CampaignPool::Snatch(_) => Err(self.kind_mismatch(CampaignKind::Classic)),
        }
    }

    pub fn classic_mut(&mut self) -> Result<&mut ClassicPool, ContractError> {
        let mismatch = self.kind_mismatch(CampaignKind::Classic);
        match &mut self.pool {
            CampaignPool::Classic(pool) => Ok(pool),
            CampaignPool::Snatch(_) => Err(mismatch),
        }
    }

    pub fn snatch(&self) -> Result<&SnatchPool, ContractError> {
        match &self.pool {
            CampaignPool::Snatch(pool) => Ok(pool),
            CampaignPool::Classic(_) => Err(self.kind_mismatch(CampaignKind::Snatch)),
        }
    }

    pub fn snatch_mut(&mut self) -> Result<&mut SnatchPool, ContractError> {
        let mismatch = self.kind_mismatch(CampaignKind::Snatch);
        match &mut self.pool {
            CampaignPool::Snatch(pool) => Ok(pool),
            CampaignPool::Classic(_) => Err(mismatch),
        }
    }

    fn kind_mismatch(&self, expected: CampaignKind) -> ContractError {
        ContractError::KindMismatch {
            campaign_id: self.id,
            expected,
        }
    }

    /// Solvency checks run before every write of a campaign record:
    /// what is left equals what was funded minus what was paid, and a classic
    /// campaign's cached award amount matches its tiers.
    pub fn verify_invariants(&self) -> Result<(), ContractError> {
        let violation = |reason: String| ContractError::InvariantViolation {
            campaign_id: self.id,
            reason,
        };

        let expected_remaining = self
            .total_funded
            .checked_sub(self.total_paid)
            .map_err(|_| {
                violation(format!(
                    "paid {} exceeds funded {}",
                    self.total_paid, self.total_funded
                ))
            })?;
        if self.remaining_escrow() != expected_remaining {
            return Err(violation(format!(
                "remaining {} != funded {} - paid {}",
                self.remaining_escrow(),
                self.total_funded,
                self.total_paid
            )));
        }

        if let CampaignPool::Classic(pool) = &self.pool {
            let tier_total = pool
                .tier_total()
                .ok_or_else(|| violation("tier total overflows".to_string()))?;
            if tier_total != pool.remaining_award_amount {
                return Err(violation(format!(
                    "remaining award amount {} != tier total {}",
                    pool.remaining_award_amount, tier_total
                )));
            }
        }

        Ok(())
    }
}
