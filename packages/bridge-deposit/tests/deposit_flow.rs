//! Deposit Flow Integration Test
//!
//! Drives a full deposit through the public API: catalog published late by a
//! provider, debounced simulation, confirm and close. Collaborators are local
//! fakes so the test needs no network.
//!
//! ## Running
//!
//! ```bash
//! cd packages/bridge-deposit
//! RUST_LOG=debug cargo test --test deposit_flow -- --nocapture
//! ```

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use bridge_deposit::engine::{BridgeFees, BridgeSimulation, ExecuteSimulation};
use bridge_deposit::{
    BridgeAndExecuteParams, BridgeAndExecuteResult, BridgeEngine, CatalogHandle, ConfirmBlocker,
    DepositConfig, DepositError, DepositOrchestrator, DepositServices, DepositTarget,
    EngineFailure, ErrorKind, ExecuteOptions, FiatValueLookup, FlowPhase, Market,
    MultiStepResult, SimulationPhase, SimulationResult, SupportedChains, WalletSession,
};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const CATALOG_JSON: &str = r#"[
    {
        "id": 42161,
        "name": "Arbitrum One",
        "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 },
        "explorerUrl": "https://arbiscan.io",
        "tokens": [
            {
                "address": "0xaf88d065e77c8cc2239327c5edb3a432268e5831",
                "symbol": "USDC",
                "name": "USD Coin",
                "decimals": 6
            }
        ]
    }
]"#;

const USDC: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
const POOL: Address = address!("794a61358D6845594F94dc1DB02A252b5b4814aD");
const USER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .ok();
}

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeEngine {
    simulated: Mutex<Vec<U256>>,
    executed: Mutex<Vec<(BridgeAndExecuteParams, ExecuteOptions)>>,
    execution: Mutex<Option<Result<BridgeAndExecuteResult, EngineFailure>>>,
}

impl FakeEngine {
    fn simulated(&self) -> Vec<U256> {
        self.simulated.lock().unwrap().clone()
    }

    fn executed(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    fn fail_next_execution(&self, message: &str) {
        *self.execution.lock().unwrap() = Some(Err(EngineFailure::from(message)));
    }
}

#[async_trait]
impl BridgeEngine for FakeEngine {
    async fn simulate_bridge_and_execute(
        &self,
        params: &BridgeAndExecuteParams,
    ) -> Result<SimulationResult, EngineFailure> {
        self.simulated.lock().unwrap().push(params.amount);
        Ok(SimulationResult {
            bridge_simulation: Some(BridgeSimulation {
                fees: BridgeFees {
                    total: "0.5".to_string(),
                    ..Default::default()
                },
                destination_amount: Some("24.5".to_string()),
            }),
            execute_simulation: ExecuteSimulation {
                gas_used: 200_000,
                gas_price: U256::from(10_000_000_000u64),
                gas_fee: None,
            },
            multi_step: MultiStepResult {
                requires_bridging: true,
                sources: Vec::new(),
                destination_chain_id: params.to_chain_id,
            },
        })
    }

    async fn bridge_and_execute(
        &self,
        params: &BridgeAndExecuteParams,
        options: &ExecuteOptions,
    ) -> Result<BridgeAndExecuteResult, EngineFailure> {
        self.executed
            .lock()
            .unwrap()
            .push((params.clone(), *options));

        if let Some(scripted) = self.execution.lock().unwrap().take() {
            return scripted;
        }

        Ok(BridgeAndExecuteResult {
            execute_transaction_hash: Some("0xdeadbeef".to_string()),
            execute_explorer_url: None,
        })
    }
}

struct OneDollar;

impl FiatValueLookup for OneDollar {
    fn fiat_value(&self, quantity: &BigDecimal, _token: &str) -> BigDecimal {
        quantity.clone()
    }
}

struct FixedWallet;

impl WalletSession for FixedWallet {
    fn address(&self) -> Option<Address> {
        Some(USER)
    }

    fn balance(&self, symbol: &str) -> Option<BigDecimal> {
        (symbol == "USDC").then(|| BigDecimal::from(50))
    }
}

fn flow(engine: Arc<FakeEngine>, catalog: CatalogHandle) -> DepositOrchestrator {
    let services = DepositServices {
        engine,
        fiat: Arc::new(OneDollar),
        wallet: Arc::new(FixedWallet),
        catalog,
    };
    let target = DepositTarget {
        asset: USDC,
        market: Market {
            id: "aave-v3-arbitrum".to_string(),
            name: "Aave V3 Arbitrum".to_string(),
            chain_id: 42161,
            pool_address: POOL,
        },
    };
    let config = DepositConfig {
        debounce: Duration::from_millis(300),
        ..Default::default()
    };

    DepositOrchestrator::new(services, target, config)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_deposit_end_to_end() {
    init_tracing();

    let engine = Arc::new(FakeEngine::default());
    let catalog = CatalogHandle::new();
    let deposit = flow(engine.clone(), catalog.clone());
    deposit.open().await;

    // Catalog not loaded yet: confirm is blocked, nothing reaches the engine
    deposit.set_amount("25").await;
    assert!(matches!(
        deposit.confirm_blocker().await,
        Some(ConfirmBlocker::AssetUnresolved { .. })
    ));
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(
        deposit.snapshot().await.simulation_error,
        Some(DepositError::CatalogUnavailable)
    );
    assert!(engine.simulated().is_empty());

    // Provider finishes loading
    catalog.publish(assert_ok!(SupportedChains::from_json(CATALOG_JSON)));

    deposit.set_amount("24").await;
    deposit.set_amount("25.0").await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(engine.simulated(), vec![U256::from(25_000_000u64)]);

    let snapshot = deposit.snapshot().await;
    assert_eq!(snapshot.simulation, SimulationPhase::Idle);
    assert!(snapshot.can_confirm());
    let summary = snapshot.summary.expect("summary for 25.0");
    assert_eq!(summary.destination_amount, "24.5");
    assert_eq!(summary.execution_gas_display, "0.002 ETH");
    assert_eq!(summary.bridge_fee_usd, BigDecimal::from_str("0.5").unwrap());

    let outcome = assert_ok!(deposit.confirm().await);
    assert!(outcome.success);
    assert_eq!(
        outcome.explorer_url.as_deref(),
        Some("https://arbiscan.io/tx/0xdeadbeef")
    );
    assert_eq!(deposit.snapshot().await.phase, FlowPhase::Done(outcome));

    // A completed flow cannot be confirmed twice
    assert_err!(deposit.confirm().await);
    assert_eq!(engine.executed(), 1);

    deposit.close().await;
    assert_eq!(deposit.snapshot().await.phase, FlowPhase::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_execution_failure_allows_retry() {
    init_tracing();

    let engine = Arc::new(FakeEngine::default());
    let catalog = CatalogHandle::new();
    catalog.publish(assert_ok!(SupportedChains::from_json(CATALOG_JSON)));

    let deposit = flow(engine.clone(), catalog);
    deposit.open().await;
    deposit.set_amount("10").await;

    engine.fail_next_execution("User rejected the request.");
    let outcome = assert_ok!(deposit.confirm().await);
    assert!(!outcome.success);
    assert_eq!(outcome.error_kind, Some(ErrorKind::Rejected));
    assert_eq!(deposit.snapshot().await.phase, FlowPhase::Editing);

    engine.fail_next_execution("insufficient funds for gas");
    let outcome = assert_ok!(deposit.confirm().await);
    assert_eq!(outcome.error_kind, Some(ErrorKind::InsufficientFunds));

    let outcome = assert_ok!(deposit.confirm().await);
    assert!(outcome.success);
    assert_eq!(engine.executed(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_balance_policy_caps_max_amount() {
    init_tracing();

    let catalog = CatalogHandle::new();
    catalog.publish(assert_ok!(SupportedChains::from_json(CATALOG_JSON)));
    let deposit = flow(Arc::new(FakeEngine::default()), catalog);
    deposit.open().await;

    // 90% of the 50 USDC balance
    let max = assert_ok!(deposit.set_max_amount().await);
    assert_eq!(max, "45");

    deposit.set_amount("45.000001").await;
    assert!(matches!(
        deposit.confirm_blocker().await,
        Some(ConfirmBlocker::ExceedsAllowedBalance { .. })
    ));
}
