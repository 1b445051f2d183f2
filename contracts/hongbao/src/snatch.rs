//! Splitting allocator for snatch campaigns: each claim takes a uniformly
//! random amount in `[min, max]`, capped at what is left in the pool.

use cosmwasm_std::{StdError, Uint128};
use hongbao_common::RandomnessSource;

use crate::error::ContractError;
use crate::state::{Claimant, SnatchPool};

/// Takes one portion of the pool for `claimant` and returns the amount paid.
///
/// Fails with `PoolExhausted` once the pool has dropped below the minimum
/// claim, and with `NotEligible` once the claimant has used all its claims.
/// An exhausted pool stays open; closing it is up to the owner.
pub fn snatch(
    pool: &mut SnatchPool,
    claimant: &mut Claimant,
    rng: &mut impl RandomnessSource,
) -> Result<Uint128, ContractError> {
    if pool.remaining_amount < pool.min_snatch_amount || pool.remaining_amount.is_zero() {
        return Err(ContractError::PoolExhausted {
            campaign_id: claimant.campaign_id,
            remaining: pool.remaining_amount,
            minimum: pool.min_snatch_amount,
        });
    }
    if claimant.used >= pool.claims_per_account {
        return Err(claimant.not_eligible(format!(
            "snatch limit of {} reached",
            pool.claims_per_account
        )));
    }

    let drawn = draw_amount(pool.min_snatch_amount, pool.max_snatch_amount, rng)?;
    let paid = drawn.min(pool.remaining_amount);

    pool.remaining_amount -= paid;
    pool.total_claims += 1;
    claimant.used += 1;

    Ok(paid)
}

/// Uniform in `[min, max]`; deterministic when the bounds coincide.
fn draw_amount(
    min: Uint128,
    max: Uint128,
    rng: &mut impl RandomnessSource,
) -> Result<Uint128, ContractError> {
    let spread = max.checked_sub(min).map_err(StdError::from)?;
    if spread.is_zero() {
        return Ok(min);
    }
    // spread + 1 overflows only for the full u128 range
    let offset = match spread.u128().checked_add(1) {
        Some(width) => rng.next_below(width),
        None => rng.next_below(u128::MAX),
    };
    Ok(min.checked_add(Uint128::new(offset)).map_err(StdError::from)?)
}
