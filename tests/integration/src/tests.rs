//! Integration tests for the HongBao campaign contract.
//!
//! These tests drive the contract through its `instantiate` / `execute` /
//! `query` entry points using `cosmwasm_std::testing` mocks. cw20 token
//! contracts and the randomness oracle are stood in for with
//! `MockQuerier::update_wasm`.
//!
//! Run:
//! ```bash
//! cargo test -p hongbao-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    coin, coins, from_json, to_json_binary, Addr, BankMsg, ContractResult, CosmosMsg, Env,
    MemoryStorage, OwnedDeps, Response, SystemError, SystemResult, Timestamp, Uint128, WasmMsg,
    WasmQuery,
};
use cw20::{AllowanceResponse, BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, Expiration};
use hongbao::contract::{execute, instantiate, query};
use hongbao::entropy::BeaconResponse;
use hongbao::msg::{
    CampaignsResponse, ExecuteMsg, InstantiateMsg, OracleQueryMsg, QueryMsg,
    SnatchCampaignInfoResponse,
};
use hongbao::ContractError;
use hongbao_common::{AssetInfo, AwardTier, CampaignKind};

type TestDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Constants ───

const FEE_DENOM: &str = "uinj";
const FEE: u128 = 500;

// ─── Helpers ───

fn setup(oracle: Option<&Addr>) -> TestDeps {
    let mut deps = mock_dependencies();
    let admin = deps.api.addr_make("admin");
    instantiate(
        deps.as_mut(),
        mock_env(),
        message_info(&admin, &[]),
        InstantiateMsg {
            admin: None,
            creation_fee: coin(FEE, FEE_DENOM),
            randomness_oracle: oracle.map(Addr::to_string),
        },
    )
    .unwrap();
    deps
}

fn expiry() -> Timestamp {
    mock_env().block.time.plus_seconds(86_400)
}

fn after_expiry() -> Env {
    let mut env = mock_env();
    env.block.time = expiry().plus_seconds(1);
    env
}

fn accounts(deps: &TestDeps, prefix: &str, n: usize) -> Vec<Addr> {
    (0..n)
        .map(|i| deps.api.addr_make(&format!("{}{}", prefix, i)))
        .collect()
}

fn attr<'a>(res: &'a Response, key: &str) -> &'a str {
    &res.attributes.iter().find(|a| a.key == key).unwrap().value
}

fn has_event(res: &Response, ty: &str) -> bool {
    res.events.iter().any(|e| e.ty == ty)
}

/// Stand-ins for the contracts the engine queries.
#[derive(Clone, Default)]
struct WasmMocks {
    /// (token address, owner balance, allowance to the engine)
    token: Option<(String, u128, u128)>,
    /// (oracle address, randomness of the latest beacon)
    oracle: Option<(String, Option<Vec<u8>>)>,
}

fn install(deps: &mut TestDeps, mocks: WasmMocks) {
    deps.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { contract_addr, msg } => {
            if let Some((token, balance, allowance)) = &mocks.token {
                if contract_addr == token {
                    let bin = match from_json::<Cw20QueryMsg>(msg).unwrap() {
                        Cw20QueryMsg::Balance { .. } => to_json_binary(&BalanceResponse {
                            balance: Uint128::new(*balance),
                        }),
                        Cw20QueryMsg::Allowance { .. } => to_json_binary(&AllowanceResponse {
                            allowance: Uint128::new(*allowance),
                            expires: Expiration::Never {},
                        }),
                        other => panic!("unexpected token query: {:?}", other),
                    };
                    return SystemResult::Ok(ContractResult::Ok(bin.unwrap()));
                }
            }
            if let Some((oracle, randomness)) = &mocks.oracle {
                if contract_addr == oracle {
                    let bin = match from_json::<OracleQueryMsg>(msg).unwrap() {
                        OracleQueryMsg::LatestRound {} => to_json_binary(&1000u64),
                        OracleQueryMsg::Beacon { round } => {
                            to_json_binary(&randomness.as_ref().map(|r| BeaconResponse {
                                round,
                                randomness: r.clone(),
                                verified: true,
                            }))
                        }
                    };
                    return SystemResult::Ok(ContractResult::Ok(bin.unwrap()));
                }
            }
            SystemResult::Err(SystemError::NoSuchContract {
                addr: contract_addr.clone(),
            })
        }
        _ => SystemResult::Err(SystemError::UnsupportedRequest {
            kind: "wasm".to_string(),
        }),
    });
}

fn token_mock(token: &Addr, balance: u128, allowance: u128) -> WasmMocks {
    WasmMocks {
        token: Some((token.to_string(), balance, allowance)),
        oracle: None,
    }
}

fn cw20_transfer(msg: &CosmosMsg) -> (String, Cw20ExecuteMsg) {
    match msg {
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr, msg, ..
        }) => (contract_addr.clone(), from_json(msg).unwrap()),
        other => panic!("unexpected message: {:?}", other),
    }
}

fn bank_paid(res: &Response) -> u128 {
    res.messages
        .iter()
        .map(|m| match &m.msg {
            CosmosMsg::Bank(BankMsg::Send { amount, .. }) => {
                amount.iter().map(|c| c.amount.u128()).sum::<u128>()
            }
            other => panic!("unexpected message: {:?}", other),
        })
        .sum()
}

fn snatch_info(deps: &TestDeps, campaign_id: u64) -> SnatchCampaignInfoResponse {
    from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::SnatchCampaign { campaign_id },
        )
        .unwrap(),
    )
    .unwrap()
}

fn create_native_snatch(
    deps: &mut TestDeps,
    owner: &Addr,
    amount: u128,
    min: u128,
    max: u128,
    per_account: u32,
) -> u64 {
    let res = execute(
        deps.as_mut(),
        mock_env(),
        message_info(owner, &coins(amount + FEE, FEE_DENOM)),
        ExecuteMsg::CreateSnatchCampaign {
            name: "red packet".to_string(),
            asset: AssetInfo::native(FEE_DENOM),
            amount: Uint128::new(amount),
            expiry: expiry(),
            claims_per_account: per_account,
            min_snatch_amount: Uint128::new(min),
            max_snatch_amount: Uint128::new(max),
        },
    )
    .unwrap();
    attr(&res, "campaign_id").parse().unwrap()
}

fn classic_msg(
    asset: AssetInfo,
    participants: &[Addr],
    draws: u32,
    awards: Vec<AwardTier>,
) -> ExecuteMsg {
    ExecuteMsg::CreateCampaign {
        name: "spring festival".to_string(),
        asset,
        expiry: expiry(),
        draws_per_account: draws,
        participants: participants.iter().map(Addr::to_string).collect(),
        awards,
    }
}

// ─── cw20 campaigns ───

#[test]
fn test_cw20_classic_campaign_lifecycle() {
    let mut deps = setup(None);
    let owner = deps.api.addr_make("owner");
    let token = deps.api.addr_make("token");
    install(&mut deps, token_mock(&token, 1_000, 123));

    let participants = accounts(&deps, "guest", 10);
    let awards = vec![
        AwardTier::new("grand", 1, 100u128),
        AwardTier::new("lucky", 2, 10u128),
        AwardTier::new("small", 3, 1u128),
    ];
    let res = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &coins(FEE, FEE_DENOM)),
        classic_msg(AssetInfo::cw20(token.as_str()), &participants, 1, awards),
    )
    .unwrap();
    let id: u64 = attr(&res, "campaign_id").parse().unwrap();

    // Escrow is pulled with a TransferFrom into the engine
    assert_eq!(res.messages.len(), 1);
    let (contract, pull) = cw20_transfer(&res.messages[0].msg);
    assert_eq!(contract, token.to_string());
    assert_eq!(
        pull,
        Cw20ExecuteMsg::TransferFrom {
            owner: owner.to_string(),
            recipient: mock_env().contract.address.to_string(),
            amount: Uint128::new(123),
        }
    );

    let mut paid = Uint128::zero();
    let mut wins = 0;
    for account in &participants {
        let res = execute(
            deps.as_mut(),
            mock_env(),
            message_info(account, &[]),
            ExecuteMsg::Draw { campaign_id: id },
        )
        .unwrap();
        for sub in &res.messages {
            let (contract, transfer) = cw20_transfer(&sub.msg);
            assert_eq!(contract, token.to_string());
            match transfer {
                Cw20ExecuteMsg::Transfer { recipient, amount } => {
                    assert_eq!(recipient, account.to_string());
                    paid += amount;
                    wins += 1;
                }
                other => panic!("unexpected transfer: {:?}", other),
            }
        }
    }
    assert_eq!(wins, 6);
    assert_eq!(paid, Uint128::new(123));

    // Everything was paid out, so closing refunds nothing
    let res = execute(
        deps.as_mut(),
        after_expiry(),
        message_info(&owner, &[]),
        ExecuteMsg::CloseCampaign { campaign_id: id },
    )
    .unwrap();
    assert!(res.messages.is_empty());
    assert_eq!(attr(&res, "refunded"), "0");
}

#[test]
fn test_cw20_escrow_shortfall() {
    let mut deps = setup(None);
    let owner = deps.api.addr_make("owner");
    let token = deps.api.addr_make("token");
    let participants = accounts(&deps, "guest", 2);
    let awards = || vec![AwardTier::new("only", 2, 50u128)];

    install(&mut deps, token_mock(&token, 1_000, 99));
    let err = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &coins(FEE, FEE_DENOM)),
        classic_msg(AssetInfo::cw20(token.as_str()), &participants, 1, awards()),
    )
    .unwrap_err();
    match err {
        ContractError::InsufficientEscrow { needed, available } => {
            assert_eq!(needed, Uint128::new(100));
            assert_eq!(available, Uint128::new(99));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    install(&mut deps, token_mock(&token, 40, 1_000));
    let err = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &coins(FEE, FEE_DENOM)),
        classic_msg(AssetInfo::cw20(token.as_str()), &participants, 1, awards()),
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::InsufficientEscrow { .. }));

    // Funded, but a coin other than the fee is attached
    install(&mut deps, token_mock(&token, 1_000, 1_000));
    let err = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &[coin(FEE, FEE_DENOM), coin(1, "uatom")]),
        classic_msg(AssetInfo::cw20(token.as_str()), &participants, 1, awards()),
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::InvalidParameters { .. }));

    let campaigns: CampaignsResponse = from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Campaigns {
                start_after: None,
                limit: None,
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert!(campaigns.campaigns.is_empty());
}

#[test]
fn test_cw20_snatch_refill() {
    let mut deps = setup(None);
    let owner = deps.api.addr_make("owner");
    let token = deps.api.addr_make("token");
    install(&mut deps, token_mock(&token, 10_000, 10_000));

    let res = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &coins(FEE, FEE_DENOM)),
        ExecuteMsg::CreateSnatchCampaign {
            name: "red packet".to_string(),
            asset: AssetInfo::cw20(token.as_str()),
            amount: Uint128::new(1_000),
            expiry: expiry(),
            claims_per_account: 1,
            min_snatch_amount: Uint128::new(100),
            max_snatch_amount: Uint128::new(300),
        },
    )
    .unwrap();
    let id: u64 = attr(&res, "campaign_id").parse().unwrap();

    // cw20 refills carry no native funds
    let err = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &coins(FEE, FEE_DENOM)),
        ExecuteMsg::RefillSnatchCampaign {
            campaign_id: id,
            amount: Uint128::new(500),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::InvalidParameters { .. }));

    let res = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &[]),
        ExecuteMsg::RefillSnatchCampaign {
            campaign_id: id,
            amount: Uint128::new(500),
        },
    )
    .unwrap();
    let (_, pull) = cw20_transfer(&res.messages[0].msg);
    assert!(matches!(
        pull,
        Cw20ExecuteMsg::TransferFrom { amount, .. } if amount == Uint128::new(500)
    ));

    let info = snatch_info(&deps, id);
    assert_eq!(info.remaining_amount, Uint128::new(1_500));
    assert_eq!(info.total_funded, Uint128::new(1_500));
    assert_eq!(info.max_snatch_amount, Uint128::new(300));
}

// ─── Allocation properties ───

#[test]
fn test_snatch_stays_solvent_under_random_bounds() {
    let mut deps = setup(None);
    let owner = deps.api.addr_make("owner");
    let id = create_native_snatch(&mut deps, &owner, 5_000, 1, 50, 3);
    let claimants = accounts(&deps, "claimant", 40);

    let mut paid_total = 0u128;
    for round in 0..3 {
        for account in &claimants {
            let res = execute(
                deps.as_mut(),
                mock_env(),
                message_info(account, &[]),
                ExecuteMsg::Snatch { campaign_id: id },
            )
            .unwrap();
            let paid = bank_paid(&res);
            assert!((1..=50).contains(&paid));
            paid_total += paid;

            let info = snatch_info(&deps, id);
            assert_eq!(info.remaining_amount + info.total_paid, info.total_funded);
            assert_eq!(info.total_paid.u128(), paid_total);
        }

        if round == 1 {
            execute(
                deps.as_mut(),
                mock_env(),
                message_info(&owner, &coins(2_000, FEE_DENOM)),
                ExecuteMsg::RefillSnatchCampaign {
                    campaign_id: id,
                    amount: Uint128::new(2_000),
                },
            )
            .unwrap();
        }
    }

    let info = snatch_info(&deps, id);
    assert_eq!(info.total_funded, Uint128::new(7_000));
    assert_eq!(info.total_claims, 120);

    // Every account used its three claims; a fourth is refused
    let err = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&claimants[0], &[]),
        ExecuteMsg::Snatch { campaign_id: id },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::NotEligible { .. }));

    let res = execute(
        deps.as_mut(),
        after_expiry(),
        message_info(&owner, &[]),
        ExecuteMsg::CloseSnatchCampaign { campaign_id: id },
    )
    .unwrap();
    assert_eq!(bank_paid(&res) + paid_total, 7_000);
}

#[test]
fn test_classic_surplus_draws_hand_out_every_award() {
    let mut deps = setup(None);
    let owner = deps.api.addr_make("owner");
    let participants = accounts(&deps, "guest", 20);
    let awards = vec![
        AwardTier::new("jackpot", 1, 1_000u128),
        AwardTier::new("runner-up", 4, 250u128),
    ];

    let res = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&owner, &coins(2_000 + FEE, FEE_DENOM)),
        classic_msg(AssetInfo::native(FEE_DENOM), &participants, 2, awards),
    )
    .unwrap();
    let id: u64 = attr(&res, "campaign_id").parse().unwrap();

    let (mut wins, mut losses, mut paid) = (0, 0, 0u128);
    for _ in 0..2 {
        for account in &participants {
            let res = execute(
                deps.as_mut(),
                mock_env(),
                message_info(account, &[]),
                ExecuteMsg::Draw { campaign_id: id },
            )
            .unwrap();
            if has_event(&res, "hongbao_draw_won") {
                wins += 1;
            } else {
                losses += 1;
            }
            paid += bank_paid(&res);
        }
    }
    assert_eq!((wins, losses, paid), (5, 35, 2_000));

    let remaining: u32 = from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::RemainingDraws {
                campaign_id: id,
                account: participants[0].to_string(),
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(remaining, 0);
}

// ─── Randomness oracle ───

#[test]
fn test_oracle_beacon_is_mixed_into_claims() {
    let oracle = MockApi::default().addr_make("oracle");
    let mut with_oracle = setup(Some(&oracle));
    install(
        &mut with_oracle,
        WasmMocks {
            token: None,
            oracle: Some((oracle.to_string(), Some(vec![7u8; 32]))),
        },
    );
    let mut without = setup(None);

    let owner = without.api.addr_make("owner");
    let alice = without.api.addr_make("alice");
    let mut seeds = vec![];
    for deps in [&mut with_oracle, &mut without] {
        let id = create_native_snatch(deps, &owner, 1_000, 1, 100, 1);
        let res = execute(
            deps.as_mut(),
            mock_env(),
            message_info(&alice, &[]),
            ExecuteMsg::Snatch { campaign_id: id },
        )
        .unwrap();
        seeds.push(attr(&res, "seed").to_string());
    }
    assert_eq!(seeds[0].len(), 64);
    assert_ne!(seeds[0], seeds[1]);
}

#[test]
fn test_missing_beacon_rejects_claim() {
    let oracle = MockApi::default().addr_make("oracle");
    let mut deps = setup(Some(&oracle));
    install(
        &mut deps,
        WasmMocks {
            token: None,
            oracle: Some((oracle.to_string(), None)),
        },
    );
    let owner = deps.api.addr_make("owner");
    let id = create_native_snatch(&mut deps, &owner, 1_000, 1, 100, 1);
    let before = snatch_info(&deps, id);

    let alice = deps.api.addr_make("alice");
    let err = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&alice, &[]),
        ExecuteMsg::Snatch { campaign_id: id },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::RandomnessUnavailable { .. }));
    assert_eq!(snatch_info(&deps, id), before);

    // Dropping the oracle restores block-derived seeding
    let admin = deps.api.addr_make("admin");
    execute(
        deps.as_mut(),
        mock_env(),
        message_info(&admin, &[]),
        ExecuteMsg::UpdateConfig {
            admin: None,
            creation_fee: None,
            randomness_oracle: Some(String::new()),
        },
    )
    .unwrap();
    execute(
        deps.as_mut(),
        mock_env(),
        message_info(&alice, &[]),
        ExecuteMsg::Snatch { campaign_id: id },
    )
    .unwrap();
}

#[test]
fn test_malformed_beacon_rejects_claim() {
    let oracle = MockApi::default().addr_make("oracle");
    let cases = [
        (0u64, vec![9u8; 32], true),
        (1000, vec![9u8; 32], false),
        (1000, vec![9u8; 31], true),
        (1000, vec![9u8; 48], true),
    ];

    for (latest, randomness, verified) in cases {
        let mut deps = setup(Some(&oracle));
        let owner = deps.api.addr_make("owner");
        let id = create_native_snatch(&mut deps, &owner, 1_000, 1, 100, 1);
        let before = snatch_info(&deps, id);

        let oracle_addr = oracle.to_string();
        deps.querier.update_wasm(move |query| match query {
            WasmQuery::Smart { contract_addr, msg } if *contract_addr == oracle_addr => {
                let bin = match from_json::<OracleQueryMsg>(msg).unwrap() {
                    OracleQueryMsg::LatestRound {} => to_json_binary(&latest),
                    OracleQueryMsg::Beacon { round } => to_json_binary(&Some(BeaconResponse {
                        round,
                        randomness: randomness.clone(),
                        verified,
                    })),
                };
                SystemResult::Ok(ContractResult::Ok(bin.unwrap()))
            }
            _ => SystemResult::Err(SystemError::UnsupportedRequest {
                kind: "wasm".to_string(),
            }),
        });

        let alice = deps.api.addr_make("alice");
        let err = execute(
            deps.as_mut(),
            mock_env(),
            message_info(&alice, &[]),
            ExecuteMsg::Snatch { campaign_id: id },
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::RandomnessUnavailable { .. }));
        assert_eq!(snatch_info(&deps, id), before);
    }
}

// ─── Registry ───

#[test]
fn test_campaign_listing_across_kinds() {
    let mut deps = setup(None);
    let owner = deps.api.addr_make("owner");
    let participants = accounts(&deps, "guest", 2);

    for _ in 0..2 {
        execute(
            deps.as_mut(),
            mock_env(),
            message_info(&owner, &coins(10 + FEE, FEE_DENOM)),
            classic_msg(
                AssetInfo::native(FEE_DENOM),
                &participants,
                1,
                vec![AwardTier::new("only", 1, 10u128)],
            ),
        )
        .unwrap();
        create_native_snatch(&mut deps, &owner, 100, 10, 10, 1);
    }

    execute(
        deps.as_mut(),
        after_expiry(),
        message_info(&owner, &[]),
        ExecuteMsg::CloseSnatchCampaign { campaign_id: 2 },
    )
    .unwrap();

    let listing: CampaignsResponse = from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Campaigns {
                start_after: None,
                limit: None,
            },
        )
        .unwrap(),
    )
    .unwrap();
    let ids: Vec<(u64, CampaignKind)> = listing
        .campaigns
        .iter()
        .map(|c| (c.id, c.kind))
        .collect();
    assert_eq!(
        ids,
        vec![
            (1, CampaignKind::Classic),
            (3, CampaignKind::Classic),
            (4, CampaignKind::Snatch),
        ]
    );

    let err = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::CampaignKind { campaign_id: 2 },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::CampaignNotFound { campaign_id: 2 }));
}

#[test]
fn test_message_wire_format() {
    let msg = serde_json::to_value(ExecuteMsg::Draw { campaign_id: 7 }).unwrap();
    assert_eq!(msg, serde_json::json!({ "draw": { "campaign_id": 7 } }));

    let asset = serde_json::to_value(AssetInfo::cw20("token")).unwrap();
    assert_eq!(
        asset,
        serde_json::json!({ "cw20": { "contract_addr": "token" } })
    );

    let kind: CampaignKind = serde_json::from_str("\"snatch\"").unwrap();
    assert_eq!(kind, CampaignKind::Snatch);
}
