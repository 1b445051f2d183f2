//! Asset gateway: moves escrow in and out of the engine, for native denoms
//! through the bank module and for cw20 tokens through the token contract.
//!
//! Transfers are emitted as messages on the response, so a failing transfer
//! reverts the whole call together with the state change that caused it.

use cosmwasm_std::{
    coins, to_json_binary, Addr, Api, BankMsg, Coin, CosmosMsg, Env, QuerierWrapper, StdResult,
    Uint128, WasmMsg,
};
use cw20::{AllowanceResponse, BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};
use hongbao_common::AssetInfo;

use crate::error::ContractError;

/// Normalizes a user-supplied asset; cw20 addresses must be valid.
pub fn validate(api: &dyn Api, asset: AssetInfo) -> Result<AssetInfo, ContractError> {
    match asset {
        AssetInfo::Native { denom } => {
            if denom.trim().is_empty() {
                return Err(ContractError::invalid("native denom is empty"));
            }
            Ok(AssetInfo::Native { denom })
        }
        AssetInfo::Cw20 { contract_addr } => Ok(AssetInfo::Cw20 {
            contract_addr: api.addr_validate(&contract_addr)?.to_string(),
        }),
    }
}

pub fn balance_of(
    querier: &QuerierWrapper,
    asset: &AssetInfo,
    account: &Addr,
) -> StdResult<Uint128> {
    match asset {
        AssetInfo::Native { denom } => Ok(querier.query_balance(account, denom)?.amount),
        AssetInfo::Cw20 { contract_addr } => {
            let res: BalanceResponse = querier.query_wasm_smart(
                contract_addr,
                &Cw20QueryMsg::Balance {
                    address: account.to_string(),
                },
            )?;
            Ok(res.balance)
        }
    }
}

/// Sum of `denom` attached to the call.
pub fn native_sent(funds: &[Coin], denom: &str) -> Uint128 {
    funds
        .iter()
        .filter(|c| c.denom == denom)
        .map(|c| c.amount)
        .sum()
}

/// Pulls `amount` from `owner` into escrow.
///
/// Native escrow must already be attached to the call. For cw20 the owner's
/// balance and allowance are checked up front so a shortfall surfaces as
/// `InsufficientEscrow` rather than a failed submessage, and a `TransferFrom`
/// is returned for the caller to emit.
pub fn pull(
    querier: &QuerierWrapper,
    env: &Env,
    funds: &[Coin],
    asset: &AssetInfo,
    owner: &Addr,
    amount: Uint128,
) -> Result<Option<CosmosMsg>, ContractError> {
    if amount.is_zero() {
        return Ok(None);
    }

    match asset {
        AssetInfo::Native { denom } => {
            let sent = native_sent(funds, denom);
            if sent < amount {
                return Err(ContractError::InsufficientEscrow {
                    needed: amount,
                    available: sent,
                });
            }
            Ok(None)
        }
        AssetInfo::Cw20 { contract_addr } => {
            let balance = balance_of(querier, asset, owner)?;
            if balance < amount {
                return Err(ContractError::InsufficientEscrow {
                    needed: amount,
                    available: balance,
                });
            }

            let allowance: AllowanceResponse = querier.query_wasm_smart(
                contract_addr,
                &Cw20QueryMsg::Allowance {
                    owner: owner.to_string(),
                    spender: env.contract.address.to_string(),
                },
            )?;
            if allowance.allowance < amount {
                return Err(ContractError::InsufficientEscrow {
                    needed: amount,
                    available: allowance.allowance,
                });
            }

            Ok(Some(
                WasmMsg::Execute {
                    contract_addr: contract_addr.clone(),
                    msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
                        owner: owner.to_string(),
                        recipient: env.contract.address.to_string(),
                        amount,
                    })?,
                    funds: vec![],
                }
                .into(),
            ))
        }
    }
}

/// Pays `amount` out of escrow to `recipient`. Nothing is emitted for zero.
pub fn push(asset: &AssetInfo, recipient: &Addr, amount: Uint128) -> StdResult<Option<CosmosMsg>> {
    if amount.is_zero() {
        return Ok(None);
    }

    let msg = match asset {
        AssetInfo::Native { denom } => BankMsg::Send {
            to_address: recipient.to_string(),
            amount: coins(amount.u128(), denom),
        }
        .into(),
        AssetInfo::Cw20 { contract_addr } => WasmMsg::Execute {
            contract_addr: contract_addr.clone(),
            msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                recipient: recipient.to_string(),
                amount,
            })?,
            funds: vec![],
        }
        .into(),
    };
    Ok(Some(msg))
}
