use std::collections::BTreeSet;

use cosmwasm_std::{
    Addr, BankMsg, Coin, DepsMut, Env, Event, MessageInfo, Order, Response, StdError, StdResult,
    Storage, Uint128,
};
use hongbao_common::random::seed_hex;
use hongbao_common::{AssetInfo, CampaignKind};

use crate::asset;
use crate::entropy;
use crate::error::ContractError;
use crate::lottery::{self, DrawOutcome};
use crate::msg::{CreateCampaignParams, CreateSnatchCampaignParams, UpdateConfigParams};
use crate::registry;
use crate::state::{
    Campaign, CampaignPool, Claimant, ClassicPool, SnatchPool, CONFIG, FEE_BALANCES,
};

pub const MAX_AWARD_TIERS: usize = 32;
pub const MAX_LABEL_LENGTH: usize = 32;

/// Create a classic campaign. The award total is escrowed in full.
pub fn create_campaign(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateCampaignParams,
) -> Result<Response, ContractError> {
    let CreateCampaignParams {
        name,
        asset,
        expiry,
        draws_per_account,
        participants,
        awards,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    let asset = asset::validate(deps.api, asset)?;

    if awards.len() > MAX_AWARD_TIERS {
        return Err(ContractError::invalid(format!(
            "{} award tiers given, max {}",
            awards.len(),
            MAX_AWARD_TIERS
        )));
    }
    for tier in &awards {
        if tier.label.is_empty() || tier.label.len() > MAX_LABEL_LENGTH {
            return Err(ContractError::invalid(format!(
                "award label must be 1 to {} bytes",
                MAX_LABEL_LENGTH
            )));
        }
        if tier.amount.is_zero() {
            return Err(ContractError::invalid(format!(
                "award tier {} has a zero amount",
                tier.label
            )));
        }
    }

    let mut seen = BTreeSet::new();
    let mut allow_list = Vec::with_capacity(participants.len());
    for participant in &participants {
        let addr = deps.api.addr_validate(participant)?;
        if !seen.insert(addr.clone()) {
            return Err(ContractError::invalid(format!(
                "participant {} listed twice",
                addr
            )));
        }
        allow_list.push(addr);
    }
    let participant_count = u32::try_from(allow_list.len())
        .map_err(|_| ContractError::invalid("too many participants"))?;

    let mut pool = ClassicPool {
        tiers: awards,
        draws_per_account,
        participant_count,
        total_draws_used: 0,
        remaining_award_amount: Uint128::zero(),
    };
    let escrow = pool
        .tier_total()
        .ok_or_else(|| ContractError::invalid("award total overflows"))?;
    pool.remaining_award_amount = escrow;

    let transfer = asset::pull(
        &deps.querier,
        &env,
        &info.funds,
        &asset,
        &info.sender,
        escrow,
    )?;
    let fee_paid = settle_creation_funds(&info.funds, &asset, escrow, &config.creation_fee)?;

    let campaign = Campaign {
        id: 0,
        name,
        owner: info.sender.clone(),
        asset,
        expiry,
        created_at: env.block.time,
        total_funded: escrow,
        total_paid: Uint128::zero(),
        pool: CampaignPool::Classic(pool),
    };
    let event = created_event(&campaign, escrow);
    let campaign_id = registry::create(deps.storage, env.block.time, campaign, &allow_list)?;
    accrue_fee(deps.storage, &config.creation_fee.denom, fee_paid)?;

    Ok(Response::new()
        .add_messages(transfer)
        .add_attribute("action", "create_campaign")
        .add_attribute("campaign_id", campaign_id.to_string())
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("escrow", escrow.to_string())
        .add_attribute("fee_paid", fee_paid.to_string())
        .add_event(event.add_attribute("campaign_id", campaign_id.to_string())))
}

/// Create a snatch campaign escrowing `amount`.
pub fn create_snatch_campaign(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateSnatchCampaignParams,
) -> Result<Response, ContractError> {
    let CreateSnatchCampaignParams {
        name,
        asset,
        amount,
        expiry,
        claims_per_account,
        min_snatch_amount,
        max_snatch_amount,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    let asset = asset::validate(deps.api, asset)?;

    if min_snatch_amount.is_zero() {
        return Err(ContractError::invalid("min_snatch_amount must be positive"));
    }
    if min_snatch_amount > max_snatch_amount {
        return Err(ContractError::invalid(format!(
            "min_snatch_amount {} exceeds max_snatch_amount {}",
            min_snatch_amount, max_snatch_amount
        )));
    }

    let transfer = asset::pull(
        &deps.querier,
        &env,
        &info.funds,
        &asset,
        &info.sender,
        amount,
    )?;
    let fee_paid = settle_creation_funds(&info.funds, &asset, amount, &config.creation_fee)?;

    let campaign = Campaign {
        id: 0,
        name,
        owner: info.sender.clone(),
        asset,
        expiry,
        created_at: env.block.time,
        total_funded: amount,
        total_paid: Uint128::zero(),
        pool: CampaignPool::Snatch(SnatchPool {
            remaining_amount: amount,
            min_snatch_amount,
            max_snatch_amount,
            claims_per_account,
            total_claims: 0,
        }),
    };
    let event = created_event(&campaign, amount);
    let campaign_id = registry::create(deps.storage, env.block.time, campaign, &[])?;
    accrue_fee(deps.storage, &config.creation_fee.denom, fee_paid)?;

    Ok(Response::new()
        .add_messages(transfer)
        .add_attribute("action", "create_snatch_campaign")
        .add_attribute("campaign_id", campaign_id.to_string())
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("escrow", amount.to_string())
        .add_attribute("fee_paid", fee_paid.to_string())
        .add_event(event.add_attribute("campaign_id", campaign_id.to_string())))
}

/// One draw against a classic campaign by the sender.
/// Checks run in order: expiry, allow-list, per-account limit.
pub fn draw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    campaign_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let campaign = registry::load(deps.storage, campaign_id)?;
    campaign.classic()?;
    if !campaign.is_active(env.block.time) {
        return Err(campaign.expired_error(env.block.time));
    }

    let used = registry::claims_used(deps.storage, campaign_id, &info.sender)?
        .ok_or_else(|| {
            Claimant::new(campaign_id, &info.sender, 0).not_eligible("not on the allow-list")
        })?;

    let mut rng = entropy::claim_rng(
        deps.storage,
        &deps.querier,
        &env,
        &config,
        &info.sender,
        campaign_id,
    )?;
    let mut claimant = Claimant::new(campaign_id, &info.sender, used);

    let (campaign, outcome) = registry::update(deps.storage, campaign_id, |campaign| {
        let outcome = lottery::draw(campaign.classic_mut()?, &mut claimant, &mut rng)?;
        if let DrawOutcome::Won { amount, .. } = &outcome {
            campaign.total_paid = campaign
                .total_paid
                .checked_add(*amount)
                .map_err(StdError::from)?;
        }
        Ok(outcome)
    })?;
    registry::record_claims(deps.storage, campaign_id, &info.sender, claimant.used)?;

    let response = Response::new()
        .add_attribute("action", "draw")
        .add_attribute("campaign_id", campaign_id.to_string())
        .add_attribute("account", info.sender.to_string())
        .add_attribute("draws_used", claimant.used.to_string())
        .add_attribute("seed", seed_hex(rng.seed()));

    match outcome {
        DrawOutcome::Won { tier, amount } => {
            let payout = asset::push(&campaign.asset, &info.sender, amount)?;
            Ok(response
                .add_messages(payout)
                .add_attribute("outcome", "won")
                .add_event(
                    Event::new("hongbao_draw_won")
                        .add_attribute("campaign_id", campaign_id.to_string())
                        .add_attribute("account", info.sender.to_string())
                        .add_attribute("tier", tier)
                        .add_attribute("amount", amount.to_string()),
                ))
        }
        DrawOutcome::Lost => Ok(response.add_attribute("outcome", "lost").add_event(
            Event::new("hongbao_draw_lost")
                .add_attribute("campaign_id", campaign_id.to_string())
                .add_attribute("account", info.sender.to_string()),
        )),
    }
}

/// One claim against a snatch campaign by the sender.
/// Checks run in order: expiry, pool exhaustion, per-account limit.
pub fn snatch(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    campaign_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let campaign = registry::load(deps.storage, campaign_id)?;
    campaign.snatch()?;
    if !campaign.is_active(env.block.time) {
        return Err(campaign.expired_error(env.block.time));
    }

    let used = registry::claims_used(deps.storage, campaign_id, &info.sender)?.unwrap_or(0);
    let mut rng = entropy::claim_rng(
        deps.storage,
        &deps.querier,
        &env,
        &config,
        &info.sender,
        campaign_id,
    )?;
    let mut claimant = Claimant::new(campaign_id, &info.sender, used);

    let (campaign, amount) = registry::update(deps.storage, campaign_id, |campaign| {
        let amount = crate::snatch::snatch(campaign.snatch_mut()?, &mut claimant, &mut rng)?;
        campaign.total_paid = campaign
            .total_paid
            .checked_add(amount)
            .map_err(StdError::from)?;
        Ok(amount)
    })?;
    registry::record_claims(deps.storage, campaign_id, &info.sender, claimant.used)?;

    let payout = asset::push(&campaign.asset, &info.sender, amount)?;

    Ok(Response::new()
        .add_messages(payout)
        .add_attribute("action", "snatch")
        .add_attribute("campaign_id", campaign_id.to_string())
        .add_attribute("account", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("claims_used", claimant.used.to_string())
        .add_attribute("seed", seed_hex(rng.seed()))
        .add_event(
            Event::new("hongbao_snatched")
                .add_attribute("campaign_id", campaign_id.to_string())
                .add_attribute("account", info.sender.to_string())
                .add_attribute("amount", amount.to_string()),
        ))
}

/// Close an expired campaign of `kind`: refund the unclaimed escrow to the
/// owner and delete the record with its ledger. Owner only.
pub fn close_campaign(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    campaign_id: u64,
    kind: CampaignKind,
) -> Result<Response, ContractError> {
    let campaign = registry::load(deps.storage, campaign_id)?;
    if campaign.kind() != kind {
        return Err(ContractError::KindMismatch {
            campaign_id,
            expected: kind,
        });
    }
    if info.sender != campaign.owner {
        return Err(ContractError::Unauthorized {
            reason: "only the campaign owner can close it".to_string(),
        });
    }
    if campaign.is_active(env.block.time) {
        return Err(campaign.expired_error(env.block.time));
    }

    let campaign = registry::remove(deps.storage, campaign_id)?;
    let refund = campaign.remaining_escrow();
    let transfer = asset::push(&campaign.asset, &campaign.owner, refund)?;

    let action = match kind {
        CampaignKind::Classic => "close_campaign",
        CampaignKind::Snatch => "close_snatch_campaign",
    };
    Ok(Response::new()
        .add_messages(transfer)
        .add_attribute("action", action)
        .add_attribute("campaign_id", campaign_id.to_string())
        .add_attribute("refunded", refund.to_string())
        .add_event(
            Event::new("hongbao_campaign_closed")
                .add_attribute("campaign_id", campaign_id.to_string())
                .add_attribute("kind", kind.as_str())
                .add_attribute("owner", campaign.owner.to_string())
                .add_attribute("refunded", refund.to_string())
                .add_attribute("total_paid", campaign.total_paid.to_string()),
        ))
}

/// Add escrow to an active snatch campaign. Owner only; the per-claim
/// bounds are left untouched.
pub fn refill_snatch_campaign(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    campaign_id: u64,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let campaign = registry::load(deps.storage, campaign_id)?;
    campaign.snatch()?;
    if info.sender != campaign.owner {
        return Err(ContractError::Unauthorized {
            reason: "only the campaign owner can refill it".to_string(),
        });
    }
    if !campaign.is_active(env.block.time) {
        return Err(campaign.expired_error(env.block.time));
    }
    if amount.is_zero() {
        return Err(ContractError::invalid("refill amount must be positive"));
    }

    let transfer = asset::pull(
        &deps.querier,
        &env,
        &info.funds,
        &campaign.asset,
        &info.sender,
        amount,
    )?;
    ensure_exact_funds(&info.funds, &campaign.asset, amount)?;

    let (campaign, _) = registry::update(deps.storage, campaign_id, |campaign| {
        campaign.total_funded = campaign
            .total_funded
            .checked_add(amount)
            .map_err(StdError::from)?;
        let pool = campaign.snatch_mut()?;
        pool.remaining_amount = pool
            .remaining_amount
            .checked_add(amount)
            .map_err(StdError::from)?;
        Ok(())
    })?;
    let remaining = campaign.remaining_escrow();

    Ok(Response::new()
        .add_messages(transfer)
        .add_attribute("action", "refill_snatch_campaign")
        .add_attribute("campaign_id", campaign_id.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("hongbao_campaign_refilled")
                .add_attribute("campaign_id", campaign_id.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("remaining", remaining.to_string()),
        ))
}

pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        admin,
        creation_fee,
        randomness_oracle,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(admin) = admin {
        config.admin = deps.api.addr_validate(&admin)?;
    }
    if let Some(fee) = creation_fee {
        validate_fee(&fee)?;
        config.creation_fee = fee;
    }
    if let Some(oracle) = randomness_oracle {
        config.randomness_oracle = if oracle.is_empty() {
            None
        } else {
            Some(deps.api.addr_validate(&oracle)?)
        };
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_event(
            Event::new("hongbao_config_updated")
                .add_attribute("admin", config.admin.to_string())
                .add_attribute("creation_fee", config.creation_fee.to_string())
                .add_attribute(
                    "randomness_oracle",
                    config
                        .randomness_oracle
                        .as_ref()
                        .map(Addr::to_string)
                        .unwrap_or_default(),
                ),
        ))
}

/// Send every accrued creation fee to `recipient` (default: admin).
pub fn collect_fees(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    recipient: Option<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can collect fees".to_string(),
        });
    }
    let recipient = match recipient {
        Some(addr) => deps.api.addr_validate(&addr)?,
        None => config.admin,
    };

    let fees = FEE_BALANCES
        .range(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<(String, Uint128)>>>()?;
    for (denom, _) in &fees {
        FEE_BALANCES.remove(deps.storage, denom);
    }
    let coins: Vec<Coin> = fees
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(denom, amount)| Coin { denom, amount })
        .collect();

    let collected = coins
        .iter()
        .map(Coin::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let mut response = Response::new()
        .add_attribute("action", "collect_fees")
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("amount", collected.clone())
        .add_event(
            Event::new("hongbao_fees_collected")
                .add_attribute("recipient", recipient.to_string())
                .add_attribute("amount", collected),
        );
    if !coins.is_empty() {
        response = response.add_message(BankMsg::Send {
            to_address: recipient.to_string(),
            amount: coins,
        });
    }
    Ok(response)
}

pub fn validate_fee(fee: &Coin) -> Result<(), ContractError> {
    if fee.denom.trim().is_empty() {
        return Err(ContractError::invalid("creation fee denom is empty"));
    }
    Ok(())
}

fn created_event(campaign: &Campaign, escrow: Uint128) -> Event {
    Event::new("hongbao_campaign_created")
        .add_attribute("kind", campaign.kind().as_str())
        .add_attribute("owner", campaign.owner.to_string())
        .add_attribute("asset", campaign.asset.to_string())
        .add_attribute("escrow", escrow.to_string())
        .add_attribute("expiry", campaign.expiry.seconds().to_string())
}

/// Splits the funds attached to a creation call into native escrow and
/// creation fee, and returns the fee paid.
///
/// `asset::pull` has already checked the escrow is covered. When escrow and
/// fee share a denom, everything beyond the escrow counts as fee. Otherwise
/// the escrow denom must be sent exactly, and coins of any other denom are
/// rejected.
fn settle_creation_funds(
    funds: &[Coin],
    asset: &AssetInfo,
    escrow: Uint128,
    fee: &Coin,
) -> Result<Uint128, ContractError> {
    let escrow_denom = asset.native_denom();
    if let Some(coin) = funds
        .iter()
        .find(|c| c.denom != fee.denom && Some(c.denom.as_str()) != escrow_denom)
    {
        return Err(ContractError::invalid(format!(
            "unexpected funds {}",
            coin
        )));
    }

    let fee_sent = asset::native_sent(funds, &fee.denom);
    let fee_paid = match escrow_denom {
        Some(denom) if denom == fee.denom => fee_sent.checked_sub(escrow).map_err(StdError::from)?,
        Some(denom) => {
            let sent = asset::native_sent(funds, denom);
            if sent != escrow {
                return Err(ContractError::invalid(format!(
                    "sent {}{} for an escrow of {}{}",
                    sent, denom, escrow, denom
                )));
            }
            fee_sent
        }
        None => fee_sent,
    };

    if fee_paid < fee.amount {
        return Err(ContractError::invalid(format!(
            "creation fee of {} required, {}{} paid",
            fee, fee_paid, fee.denom
        )));
    }
    Ok(fee_paid)
}

/// Refills carry no fee: native escrow must be sent exactly and nothing
/// else may be attached.
fn ensure_exact_funds(
    funds: &[Coin],
    asset: &AssetInfo,
    amount: Uint128,
) -> Result<(), ContractError> {
    let stray = match asset.native_denom() {
        Some(denom) => {
            funds.iter().any(|c| c.denom != denom) || asset::native_sent(funds, denom) != amount
        }
        None => !funds.is_empty(),
    };
    if stray {
        return Err(ContractError::invalid(format!(
            "funds attached to a refill of {} {} must match it exactly",
            amount, asset
        )));
    }
    Ok(())
}

fn accrue_fee(
    storage: &mut dyn Storage,
    denom: &str,
    amount: Uint128,
) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Ok(());
    }
    FEE_BALANCES.update(storage, denom, |balance| -> StdResult<_> {
        Ok(balance.unwrap_or_default().checked_add(amount)?)
    })?;
    Ok(())
}
