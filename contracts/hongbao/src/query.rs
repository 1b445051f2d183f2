use cosmwasm_std::{to_json_binary, Binary, Coin, Deps, Order, StdResult};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::msg::{
    CampaignInfoResponse, CampaignSummary, CampaignsResponse, FeeBalancesResponse,
    SnatchCampaignInfoResponse,
};
use crate::registry;
use crate::state::{CampaignPool, CAMPAIGNS, CONFIG, FEE_BALANCES};

pub fn query_config(deps: Deps) -> Result<Binary, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    Ok(to_json_binary(&config)?)
}

pub fn query_campaign(deps: Deps, campaign_id: u64) -> Result<Binary, ContractError> {
    let campaign = registry::load(deps.storage, campaign_id)?;
    let pool = campaign.classic()?;

    Ok(to_json_binary(&CampaignInfoResponse {
        id: campaign.id,
        name: campaign.name.clone(),
        owner: campaign.owner.to_string(),
        asset: campaign.asset.clone(),
        expiry: campaign.expiry,
        remaining_awards: pool.tiers.clone(),
        remaining_award_amount: pool.remaining_award_amount,
        draws_per_account: pool.draws_per_account,
        participant_count: pool.participant_count,
        total_draws_used: pool.total_draws_used,
        total_paid: campaign.total_paid,
    })?)
}

pub fn query_snatch_campaign(deps: Deps, campaign_id: u64) -> Result<Binary, ContractError> {
    let campaign = registry::load(deps.storage, campaign_id)?;
    let pool = campaign.snatch()?;

    Ok(to_json_binary(&SnatchCampaignInfoResponse {
        id: campaign.id,
        name: campaign.name.clone(),
        owner: campaign.owner.to_string(),
        asset: campaign.asset.clone(),
        expiry: campaign.expiry,
        remaining_amount: pool.remaining_amount,
        min_snatch_amount: pool.min_snatch_amount,
        max_snatch_amount: pool.max_snatch_amount,
        claims_per_account: pool.claims_per_account,
        total_claims: pool.total_claims,
        total_funded: campaign.total_funded,
        total_paid: campaign.total_paid,
    })?)
}

/// Claims `account` may still make. Accounts off a classic allow-list, and
/// strings that are not valid addresses, get 0.
pub fn query_remaining_draws(
    deps: Deps,
    campaign_id: u64,
    account: String,
) -> Result<Binary, ContractError> {
    let campaign = registry::load(deps.storage, campaign_id)?;
    let Ok(account) = deps.api.addr_validate(&account) else {
        return Ok(to_json_binary(&0u32)?);
    };
    let used = registry::claims_used(deps.storage, campaign_id, &account)?;

    let remaining = match &campaign.pool {
        CampaignPool::Classic(pool) => used
            .map(|used| pool.draws_per_account.saturating_sub(used))
            .unwrap_or(0),
        CampaignPool::Snatch(pool) => pool
            .claims_per_account
            .saturating_sub(used.unwrap_or(0)),
    };
    Ok(to_json_binary(&remaining)?)
}

pub fn query_campaign_kind(deps: Deps, campaign_id: u64) -> Result<Binary, ContractError> {
    let campaign = registry::load(deps.storage, campaign_id)?;
    Ok(to_json_binary(&campaign.kind())?)
}

pub fn query_campaigns(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> Result<Binary, ContractError> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let campaigns = CAMPAIGNS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (id, campaign) = item?;
            Ok(CampaignSummary {
                id,
                kind: campaign.kind(),
                remaining_escrow: campaign.remaining_escrow(),
                name: campaign.name,
                owner: campaign.owner.to_string(),
                asset: campaign.asset,
                expiry: campaign.expiry,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(to_json_binary(&CampaignsResponse { campaigns })?)
}

pub fn query_fee_balances(deps: Deps) -> Result<Binary, ContractError> {
    let fees = FEE_BALANCES
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(denom, amount)| Coin { denom, amount }))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(to_json_binary(&FeeBalancesResponse { fees })?)
}
