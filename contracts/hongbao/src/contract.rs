use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response};
use cw2::{get_contract_version, set_contract_version};
use hongbao_common::CampaignKind;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{
    CreateCampaignParams, CreateSnatchCampaignParams, ExecuteMsg, InstantiateMsg, MigrateMsg,
    QueryMsg, UpdateConfigParams,
};
use crate::query;
use crate::state::{Config, CONFIG, ENTROPY_NONCE, NEXT_CAMPAIGN_ID};

const CONTRACT_NAME: &str = "crates.io:hongbao";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    execute::validate_fee(&msg.creation_fee)?;

    let admin = match msg.admin {
        Some(admin) => deps.api.addr_validate(&admin)?,
        None => info.sender.clone(),
    };
    let randomness_oracle = msg
        .randomness_oracle
        .map(|oracle| deps.api.addr_validate(&oracle))
        .transpose()?;

    let config = Config {
        admin: admin.clone(),
        creation_fee: msg.creation_fee,
        randomness_oracle,
    };
    CONFIG.save(deps.storage, &config)?;
    NEXT_CAMPAIGN_ID.save(deps.storage, &1)?;
    ENTROPY_NONCE.save(deps.storage, &0)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "hongbao")
        .add_attribute("admin", admin.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateCampaign {
            name,
            asset,
            expiry,
            draws_per_account,
            participants,
            awards,
        } => execute::create_campaign(
            deps,
            env,
            info,
            CreateCampaignParams {
                name,
                asset,
                expiry,
                draws_per_account,
                participants,
                awards,
            },
        ),
        ExecuteMsg::CreateSnatchCampaign {
            name,
            asset,
            amount,
            expiry,
            claims_per_account,
            min_snatch_amount,
            max_snatch_amount,
        } => execute::create_snatch_campaign(
            deps,
            env,
            info,
            CreateSnatchCampaignParams {
                name,
                asset,
                amount,
                expiry,
                claims_per_account,
                min_snatch_amount,
                max_snatch_amount,
            },
        ),
        ExecuteMsg::Draw { campaign_id } => execute::draw(deps, env, info, campaign_id),
        ExecuteMsg::Snatch { campaign_id } => execute::snatch(deps, env, info, campaign_id),
        ExecuteMsg::CloseCampaign { campaign_id } => {
            execute::close_campaign(deps, env, info, campaign_id, CampaignKind::Classic)
        }
        ExecuteMsg::CloseSnatchCampaign { campaign_id } => {
            execute::close_campaign(deps, env, info, campaign_id, CampaignKind::Snatch)
        }
        ExecuteMsg::RefillSnatchCampaign {
            campaign_id,
            amount,
        } => execute::refill_snatch_campaign(deps, env, info, campaign_id, amount),
        ExecuteMsg::UpdateConfig {
            admin,
            creation_fee,
            randomness_oracle,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                admin,
                creation_fee,
                randomness_oracle,
            },
        ),
        ExecuteMsg::CollectFees { recipient } => execute::collect_fees(deps, env, info, recipient),
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Campaign { campaign_id } => query::query_campaign(deps, campaign_id),
        QueryMsg::SnatchCampaign { campaign_id } => query::query_snatch_campaign(deps, campaign_id),
        QueryMsg::RemainingDraws {
            campaign_id,
            account,
        } => query::query_remaining_draws(deps, campaign_id, account),
        QueryMsg::CampaignKind { campaign_id } => query::query_campaign_kind(deps, campaign_id),
        QueryMsg::Campaigns { start_after, limit } => {
            query::query_campaigns(deps, start_after, limit)
        }
        QueryMsg::FeeBalances {} => query::query_fee_balances(deps),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
