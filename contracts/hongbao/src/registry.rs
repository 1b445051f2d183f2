//! The campaign registry: the id-keyed table of campaign records and their
//! per-account claim ledgers.
//!
//! All writes to `CAMPAIGNS` and `CLAIMS` go through here. Ids come from a
//! monotonically increasing counter and are never handed out twice, even
//! after the record they named has been removed.

use cosmwasm_std::{Addr, Order, StdResult, Storage, Timestamp};
use hongbao_common::AssetInfo;

use crate::error::ContractError;
use crate::state::{Campaign, CAMPAIGNS, CLAIMS, NEXT_CAMPAIGN_ID};

pub const MAX_NAME_LENGTH: usize = 64;

/// Stores a new campaign under the next free id and seeds its allow-list.
/// The `id` field of `campaign` is overwritten.
pub fn create(
    storage: &mut dyn Storage,
    now: Timestamp,
    mut campaign: Campaign,
    allow_list: &[Addr],
) -> Result<u64, ContractError> {
    validate_name(&campaign.name)?;
    validate_asset(&campaign.asset)?;
    if campaign.expiry <= now {
        return Err(ContractError::invalid(format!(
            "expiry {} is not after current time {}",
            campaign.expiry.seconds(),
            now.seconds()
        )));
    }

    let id = NEXT_CAMPAIGN_ID.load(storage)?;
    campaign.id = id;
    campaign.verify_invariants()?;

    CAMPAIGNS.save(storage, id, &campaign)?;
    for account in allow_list {
        CLAIMS.save(storage, (id, account), &0)?;
    }
    NEXT_CAMPAIGN_ID.save(storage, &(id + 1))?;

    Ok(id)
}

pub fn load(storage: &dyn Storage, campaign_id: u64) -> Result<Campaign, ContractError> {
    CAMPAIGNS
        .may_load(storage, campaign_id)?
        .ok_or(ContractError::CampaignNotFound { campaign_id })
}

/// Read-modify-write of one campaign record.
///
/// `action` works on a private copy; the record is written back only if
/// `action` succeeds and the result passes the solvency invariants.
pub fn update<T, F>(
    storage: &mut dyn Storage,
    campaign_id: u64,
    action: F,
) -> Result<(Campaign, T), ContractError>
where
    F: FnOnce(&mut Campaign) -> Result<T, ContractError>,
{
    let mut campaign = load(storage, campaign_id)?;
    let output = action(&mut campaign)?;
    campaign.verify_invariants()?;
    CAMPAIGNS.save(storage, campaign_id, &campaign)?;
    Ok((campaign, output))
}

/// Deletes a campaign and its claim ledger. Removing an id that is not
/// present is an error, not a no-op.
pub fn remove(storage: &mut dyn Storage, campaign_id: u64) -> Result<Campaign, ContractError> {
    let campaign = load(storage, campaign_id)?;

    let accounts = CLAIMS
        .prefix(campaign_id)
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<Addr>>>()?;
    for account in &accounts {
        CLAIMS.remove(storage, (campaign_id, account));
    }
    CAMPAIGNS.remove(storage, campaign_id);

    Ok(campaign)
}

/// Claims used by `account`. `None` means the account has no ledger entry,
/// which for a classic campaign means it is not on the allow-list.
pub fn claims_used(
    storage: &dyn Storage,
    campaign_id: u64,
    account: &Addr,
) -> StdResult<Option<u32>> {
    CLAIMS.may_load(storage, (campaign_id, account))
}

pub fn record_claims(
    storage: &mut dyn Storage,
    campaign_id: u64,
    account: &Addr,
    used: u32,
) -> StdResult<()> {
    CLAIMS.save(storage, (campaign_id, account), &used)
}

fn validate_name(name: &str) -> Result<(), ContractError> {
    if name.trim().is_empty() {
        return Err(ContractError::invalid("campaign name is empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ContractError::invalid(format!(
            "campaign name is {} bytes, max {}",
            name.len(),
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_asset(asset: &AssetInfo) -> Result<(), ContractError> {
    let empty = match asset {
        AssetInfo::Native { denom } => denom.is_empty(),
        AssetInfo::Cw20 { contract_addr } => contract_addr.is_empty(),
    };
    if empty {
        return Err(ContractError::invalid("asset identifier is empty"));
    }
    Ok(())
}
