//! Per-claim seeding of the randomness source.
//!
//! Block data alone is visible to (and partly chosen by) block producers, so
//! the seed is only as unpredictable as its least predictable input. When a
//! randomness oracle is configured its latest verified beacon is mixed in.

use cosmwasm_std::{Addr, Env, QuerierWrapper, Storage};
use hongbao_common::{SeedBuilder, Sha256Rng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ContractError;
use crate::msg::OracleQueryMsg;
use crate::state::{Config, ENTROPY_NONCE};

/// Beacon as answered by the oracle. Extra fields are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct BeaconResponse {
    pub round: u64,
    pub randomness: Vec<u8>,
    pub verified: bool,
}

/// Builds a freshly seeded generator for one claim by `sender` against
/// `campaign_id`. Bumps the stored nonce so the seed is never reused.
pub fn claim_rng(
    storage: &mut dyn Storage,
    querier: &QuerierWrapper,
    env: &Env,
    config: &Config,
    sender: &Addr,
    campaign_id: u64,
) -> Result<Sha256Rng, ContractError> {
    let nonce = ENTROPY_NONCE.may_load(storage)?.unwrap_or_default();
    ENTROPY_NONCE.save(storage, &(nonce + 1))?;

    let tx_index = env
        .transaction
        .as_ref()
        .map(|tx| tx.index)
        .unwrap_or_default();

    let mut seed = SeedBuilder::new(b"hongbao/claim")
        .mix(nonce.to_be_bytes())
        .mix(env.block.chain_id.as_str())
        .mix(env.block.height.to_be_bytes())
        .mix(env.block.time.nanos().to_be_bytes())
        .mix(tx_index.to_be_bytes())
        .mix(sender.as_str())
        .mix(campaign_id.to_be_bytes());

    if let Some(oracle) = &config.randomness_oracle {
        seed = seed.mix(latest_beacon(querier, oracle)?);
    }

    Ok(Sha256Rng::from_seed(seed.finish()))
}

fn latest_beacon(querier: &QuerierWrapper, oracle: &Addr) -> Result<Vec<u8>, ContractError> {
    let round: u64 = querier
        .query_wasm_smart(oracle, &OracleQueryMsg::LatestRound {})
        .map_err(|e| unavailable(format!("latest round query failed: {}", e)))?;
    if round == 0 {
        return Err(unavailable("oracle has no beacons yet"));
    }

    let beacon: Option<BeaconResponse> = querier
        .query_wasm_smart(oracle, &OracleQueryMsg::Beacon { round })
        .map_err(|e| unavailable(format!("beacon query failed: {}", e)))?;
    let beacon = beacon.ok_or_else(|| unavailable(format!("beacon for round {} missing", round)))?;

    if !beacon.verified || beacon.randomness.len() != 32 {
        return Err(unavailable(format!(
            "beacon for round {} is unverified or malformed",
            round
        )));
    }
    Ok(beacon.randomness)
}

fn unavailable(reason: impl Into<String>) -> ContractError {
    ContractError::RandomnessUnavailable {
        reason: reason.into(),
    }
}
