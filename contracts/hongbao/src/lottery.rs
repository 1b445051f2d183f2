//! Lottery allocator for classic campaigns.
//!
//! Each draw wins with probability `min(1, A / R)` where `A` is the number of
//! award units left and `R` the number of draws still available across the
//! whole allow-list. Once `A >= R` every remaining draw wins, so awards are
//! fully handed out whenever the allow-list uses all of its draws, and a win
//! is impossible once `A == 0`. A winning draw picks a unit uniformly among
//! the remaining ones, so tiers are weighted by their remaining count.

use cosmwasm_std::{StdError, Uint128};
use hongbao_common::RandomnessSource;

use crate::error::ContractError;
use crate::state::{Claimant, ClassicPool};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOutcome {
    Won { tier: String, amount: Uint128 },
    Lost,
}

/// Runs one draw for an allow-listed claimant. On success the claimant's
/// counter is incremented, win or lose.
///
/// The per-account limit is the only eligibility check made here; expiry and
/// allow-list membership are the caller's to verify.
pub fn draw(
    pool: &mut ClassicPool,
    claimant: &mut Claimant,
    rng: &mut impl RandomnessSource,
) -> Result<DrawOutcome, ContractError> {
    if claimant.used >= pool.draws_per_account {
        return Err(claimant.not_eligible(format!(
            "draw limit of {} reached",
            pool.draws_per_account
        )));
    }

    let awards_left = pool.remaining_award_count();
    // The caller still has a draw, so this is at least 1.
    let draws_left = pool.remaining_draws().max(1);

    let outcome = if awards_left > 0
        && rng.next_below(u128::from(draws_left)) < u128::from(awards_left)
    {
        let index = pick_tier(pool, awards_left, rng);
        let tier = &mut pool.tiers[index];
        tier.count -= 1;
        let won = DrawOutcome::Won {
            tier: tier.label.clone(),
            amount: tier.amount,
        };
        pool.remaining_award_amount = pool
            .remaining_award_amount
            .checked_sub(tier.amount)
            .map_err(StdError::from)?;
        won
    } else {
        DrawOutcome::Lost
    };

    pool.total_draws_used += 1;
    claimant.used += 1;

    Ok(outcome)
}

/// Index of the tier holding the `n`-th remaining unit, `n` uniform in
/// `[0, awards_left)`.
fn pick_tier(pool: &ClassicPool, awards_left: u64, rng: &mut impl RandomnessSource) -> usize {
    let mut ticket = rng.next_below(u128::from(awards_left)) as u64;
    for (index, tier) in pool.tiers.iter().enumerate() {
        let count = u64::from(tier.count);
        if ticket < count {
            return index;
        }
        ticket -= count;
    }
    // Unreachable while awards_left is the sum of the counts.
    pool.tiers
        .iter()
        .rposition(|t| t.count > 0)
        .unwrap_or_default()
}
