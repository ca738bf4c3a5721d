//! Deposit Orchestrator
//!
//! Owns the state of one open deposit attempt and wires user intents to the
//! controllers:
//!
//! - amount edits arm a debounce timer that launches a simulation
//! - confirm runs a single-flight execution and, on success, moves the flow
//!   into a terminal `Done` state holding the outcome
//! - close cancels the pending timer and clears all state
//!
//! Every simulation is tagged with the amount it was launched for and every
//! async continuation with the flow epoch at launch. Results whose amount no
//! longer matches, or that land after the flow was closed, are discarded.
//! At most one simulation is in flight; a debounce firing meanwhile only
//! requests a re-run once the in-flight call has landed.
//!
//! Each orchestrator instance is an independent flow. Clones share the flow.

use alloy::primitives::Address;
use bigdecimal::{BigDecimal, Zero};
use std::fmt;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::builder::DepositParamsBuilder;
use crate::catalog::{CatalogHandle, TokenResolver};
use crate::config::DepositConfig;
use crate::engine::{BridgeEngine, MultiStepResult};
use crate::error::DepositError;
use crate::execution::ExecutionController;
use crate::fiat::FiatValueLookup;
use crate::simulation::SimulationController;
use crate::timer::DebounceTimer;
use crate::types::{DepositOutcome, Market, SimulationSummary};
use crate::units::{
    amounts_equal, decimal_to_base_units, format_base_units, max_depositable, parse_decimal,
    to_base_units,
};
use crate::wallet::WalletSession;

// ============================================================================
// Public Types
// ============================================================================

/// Collaborators injected into every flow
#[derive(Clone)]
pub struct DepositServices {
    pub engine: Arc<dyn BridgeEngine>,
    pub fiat: Arc<dyn FiatValueLookup>,
    pub wallet: Arc<dyn WalletSession>,
    pub catalog: CatalogHandle,
}

/// What a flow deposits, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositTarget {
    pub asset: Address,
    pub market: Market,
}

/// Lifecycle of a flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowPhase {
    Closed,
    Editing,
    /// Terminal display state after a confirmed deposit
    Done(DepositOutcome),
}

/// Simulation state machine: `Idle -> Debouncing -> Simulating -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    Idle,
    Debouncing,
    Simulating,
}

/// First reason the confirm action is unavailable
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfirmBlocker {
    #[error("the deposit flow is closed")]
    FlowClosed,

    #[error("the deposit has already completed")]
    AlreadyCompleted,

    #[error("a deposit is already being executed")]
    ExecutionInFlight,

    #[error("enter an amount")]
    EmptyAmount,

    #[error("amount is not a valid number")]
    InvalidAmount,

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("connect a wallet")]
    WalletNotConnected,

    #[error("asset cannot be deposited: {reason}")]
    AssetUnresolved { reason: String },

    #[error("{symbol} balance is not available")]
    BalanceUnavailable { symbol: String },

    #[error("amount exceeds the allowed maximum of {max} {symbol}")]
    ExceedsAllowedBalance { max: BigDecimal, symbol: String },
}

/// Read-only view of a flow for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    pub phase: FlowPhase,
    pub amount: String,
    /// An execution is in flight
    pub loading: bool,
    pub simulation: SimulationPhase,
    /// Summary for the current amount, if one has been simulated
    pub summary: Option<SimulationSummary>,
    pub multi_step: Option<MultiStepResult>,
    pub simulation_error: Option<DepositError>,
    /// Most recent execute outcome, successful or not
    pub last_outcome: Option<DepositOutcome>,
    pub confirm_blocker: Option<ConfirmBlocker>,
}

impl FlowSnapshot {
    pub fn can_confirm(&self) -> bool {
        self.confirm_blocker.is_none()
    }

    pub fn is_simulating(&self) -> bool {
        self.simulation == SimulationPhase::Simulating
    }
}

// ============================================================================
// Flow State
// ============================================================================

struct RequestState {
    phase: FlowPhase,
    amount: String,
    /// An execution is in flight; survives close so a reopened flow cannot
    /// submit a second deposit before the first one lands
    loading: bool,
    simulating: bool,
    /// Amount of the last successful simulation, paired with `summary`
    last_simulated_amount: Option<String>,
    summary: Option<SimulationSummary>,
    simulation_error: Option<DepositError>,
    last_outcome: Option<DepositOutcome>,
    rerun_requested: bool,
    /// Bumped on close; continuations from an older epoch are discarded
    epoch: u64,
    timer: DebounceTimer<String>,
}

impl RequestState {
    fn new(config: &DepositConfig) -> Self {
        Self {
            phase: FlowPhase::Closed,
            amount: String::new(),
            loading: false,
            simulating: false,
            last_simulated_amount: None,
            summary: None,
            simulation_error: None,
            last_outcome: None,
            rerun_requested: false,
            epoch: 0,
            timer: DebounceTimer::new(config.debounce),
        }
    }

    /// Clear everything but the epoch and the in-flight execution,
    /// cancelling the pending timer
    fn reset(&mut self, phase: FlowPhase) {
        self.timer.cancel();
        self.phase = phase;
        self.amount.clear();
        self.simulating = false;
        self.last_simulated_amount = None;
        self.summary = None;
        self.simulation_error = None;
        self.last_outcome = None;
        self.rerun_requested = false;
    }

    fn is_editing(&self) -> bool {
        self.phase == FlowPhase::Editing
    }

    fn already_simulated(&self, amount: &str) -> bool {
        self.last_simulated_amount
            .as_deref()
            .map(|last| amounts_equal(last, amount))
            .unwrap_or(false)
    }

    fn simulation_phase(&self) -> SimulationPhase {
        if self.simulating {
            SimulationPhase::Simulating
        } else if self.timer.is_pending() {
            SimulationPhase::Debouncing
        } else {
            SimulationPhase::Idle
        }
    }
}

struct FlowShared {
    state: Mutex<RequestState>,
    target: DepositTarget,
    simulator: SimulationController,
    executor: ExecutionController,
    wallet: Arc<dyn WalletSession>,
    resolver: TokenResolver,
    config: DepositConfig,
}

impl FlowShared {
    /// Debounce expiry: launch a simulation if the armed amount is still current
    async fn on_debounce(self: Arc<Self>, epoch: u64, amount: String) {
        {
            let mut state = self.state.lock().await;
            state.timer.disarm();

            if state.epoch != epoch || !state.is_editing() {
                debug!(amount = %amount, "Discarding debounce timer for closed flow");
                return;
            }
            if !amounts_equal(&amount, &state.amount) {
                debug!(amount = %amount, current = %state.amount, "Discarding stale debounce timer");
                return;
            }
            if state.already_simulated(&amount) {
                return;
            }
            if state.simulating {
                debug!(amount = %amount, "Simulation in flight, re-run requested");
                state.rerun_requested = true;
                return;
            }

            state.simulating = true;
        }

        self.run_simulations(epoch, amount).await;
    }

    /// Simulate `amount`, then any amount requested while the call was in flight
    async fn run_simulations(&self, epoch: u64, mut amount: String) {
        loop {
            let wallet = self.wallet.address();
            let result = self
                .simulator
                .simulate(&amount, self.target.asset, &self.target.market, wallet)
                .await;

            let mut state = self.state.lock().await;
            if state.epoch != epoch || !state.is_editing() {
                debug!(amount = %amount, "Discarding simulation result for closed flow");
                return;
            }

            state.simulating = false;

            if amounts_equal(&amount, &state.amount) {
                match result {
                    Ok(summary) => {
                        state.summary = Some(summary);
                        state.last_simulated_amount = Some(amount.clone());
                        state.simulation_error = None;
                    }
                    Err(err) => {
                        state.simulation_error = Some(err);
                    }
                }
            } else {
                warn!(
                    simulated = %amount,
                    current = %state.amount,
                    "Discarding stale simulation result"
                );
            }

            if !std::mem::take(&mut state.rerun_requested) {
                return;
            }

            let current = state.amount.clone();
            if current.trim().is_empty() || state.already_simulated(&current) || state.timer.is_pending()
            {
                return;
            }

            debug!(amount = %current, "Re-running simulation for latest amount");
            state.simulating = true;
            amount = current;
        }
    }

    /// First reason confirm is unavailable for the given state
    fn confirm_blocker(&self, state: &RequestState) -> Option<ConfirmBlocker> {
        match &state.phase {
            FlowPhase::Closed => return Some(ConfirmBlocker::FlowClosed),
            FlowPhase::Done(_) => return Some(ConfirmBlocker::AlreadyCompleted),
            FlowPhase::Editing => {}
        }

        if state.loading {
            return Some(ConfirmBlocker::ExecutionInFlight);
        }

        let amount = state.amount.trim();
        if amount.is_empty() {
            return Some(ConfirmBlocker::EmptyAmount);
        }
        let Some(value) = parse_decimal(amount) else {
            return Some(ConfirmBlocker::InvalidAmount);
        };
        if value <= BigDecimal::zero() {
            return Some(ConfirmBlocker::NonPositiveAmount);
        }

        if self.wallet.address().is_none() {
            return Some(ConfirmBlocker::WalletNotConnected);
        }

        let location = match self.resolver.resolve(self.target.asset) {
            Ok(location) => location,
            Err(err) => {
                return Some(ConfirmBlocker::AssetUnresolved {
                    reason: err.to_string(),
                })
            }
        };
        if location.chain.id != self.target.market.chain_id {
            let err = DepositError::MarketChainMismatch {
                market: self.target.market.id.clone(),
                market_chain: self.target.market.chain_id,
                asset_chain: location.chain.id,
            };
            return Some(ConfirmBlocker::AssetUnresolved {
                reason: err.to_string(),
            });
        }

        let token = &location.token;
        let Ok(base_amount) = to_base_units(amount, token.decimals) else {
            // Parses, but truncates to zero base units
            return Some(ConfirmBlocker::NonPositiveAmount);
        };

        let Some(balance) = self.wallet.balance(&token.symbol) else {
            return Some(ConfirmBlocker::BalanceUnavailable {
                symbol: token.symbol.clone(),
            });
        };

        // Compared in base units: precision below the token's smallest unit is
        // truncated on submit and must not count against the cap
        let max = max_depositable(&balance, self.config.max_balance_fraction_bps, token.decimals);
        let max_base = decimal_to_base_units(&max, token.decimals).unwrap_or_default();
        if base_amount > max_base {
            return Some(ConfirmBlocker::ExceedsAllowedBalance {
                max,
                symbol: token.symbol.clone(),
            });
        }

        None
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// One deposit flow for a fixed asset and market
#[derive(Clone)]
pub struct DepositOrchestrator {
    shared: Arc<FlowShared>,
}

impl fmt::Debug for DepositOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepositOrchestrator")
            .field("target", &self.shared.target)
            .field("config", &self.shared.config)
            .finish()
    }
}

impl DepositOrchestrator {
    pub fn new(services: DepositServices, target: DepositTarget, config: DepositConfig) -> Self {
        let resolver = TokenResolver::new(services.catalog);
        let builder = DepositParamsBuilder::new(resolver.clone(), config.referral_code);

        let simulator =
            SimulationController::new(services.engine.clone(), services.fiat, builder.clone());
        let executor = ExecutionController::new(services.engine, builder, config.receipt_timeout);

        Self {
            shared: Arc::new(FlowShared {
                state: Mutex::new(RequestState::new(&config)),
                target,
                simulator,
                executor,
                wallet: services.wallet,
                resolver,
                config,
            }),
        }
    }

    pub fn target(&self) -> &DepositTarget {
        &self.shared.target
    }

    /// Open the flow for editing
    ///
    /// A flow that is closed or done starts over with empty state; an open
    /// flow is left untouched.
    pub async fn open(&self) {
        let mut state = self.shared.state.lock().await;
        if state.is_editing() {
            return;
        }

        state.reset(FlowPhase::Editing);
        info!(
            asset = %self.shared.target.asset,
            market = %self.shared.target.market.id,
            "Deposit flow opened"
        );
    }

    /// Record an amount edit and (re)arm the debounced simulation
    ///
    /// Empty amounts and the last successfully simulated amount do not
    /// trigger a simulation.
    pub async fn set_amount(&self, amount: impl Into<String>) {
        let amount = amount.into();
        let mut state = self.shared.state.lock().await;

        if !state.is_editing() {
            debug!(amount = %amount, "Ignoring amount change outside of editing");
            return;
        }

        if state.amount != amount {
            state.simulation_error = None;
        }
        state.amount = amount.clone();

        if amount.trim().is_empty() || state.already_simulated(&amount) {
            if state.timer.cancel() {
                debug!(amount = %amount, "Pending simulation cancelled");
            }
            return;
        }

        let epoch = state.epoch;
        let weak: Weak<FlowShared> = Arc::downgrade(&self.shared);
        state.timer.arm(amount.clone(), move |armed| async move {
            if let Some(shared) = weak.upgrade() {
                shared.on_debounce(epoch, armed).await;
            }
        });

        debug!(
            amount = %amount,
            delay_ms = self.shared.config.debounce.as_millis() as u64,
            "Simulation debounced"
        );
    }

    /// Set the amount to the largest deposit the balance policy allows
    pub async fn set_max_amount(&self) -> Result<String, DepositError> {
        let location = self.shared.resolver.resolve(self.shared.target.asset)?;
        let token = location.token;

        let balance = self
            .shared
            .wallet
            .balance(&token.symbol)
            .ok_or_else(|| DepositError::BalanceUnavailable {
                symbol: token.symbol.clone(),
            })?;

        let max = max_depositable(
            &balance,
            self.shared.config.max_balance_fraction_bps,
            token.decimals,
        );
        let amount = decimal_to_base_units(&max, token.decimals)
            .map(|raw| format_base_units(raw, token.decimals))
            .unwrap_or_else(|| "0".to_string());

        self.set_amount(amount.clone()).await;
        Ok(amount)
    }

    /// Execute the deposit for the current amount
    ///
    /// Rejected with [`DepositError::ConfirmBlocked`] while any
    /// [`ConfirmBlocker`] applies, including while another execution is in
    /// flight. A successful outcome moves the flow to [`FlowPhase::Done`];
    /// a failed one leaves the flow open for another attempt.
    pub async fn confirm(&self) -> Result<DepositOutcome, DepositError> {
        let (amount, epoch) = {
            let mut state = self.shared.state.lock().await;
            if let Some(blocker) = self.shared.confirm_blocker(&state) {
                debug!(reason = %blocker, "Confirm rejected");
                return Err(DepositError::ConfirmBlocked(blocker));
            }

            state.loading = true;
            (state.amount.clone(), state.epoch)
        };

        let wallet = self.shared.wallet.address();
        let result = self
            .shared
            .executor
            .execute(
                &amount,
                self.shared.target.asset,
                &self.shared.target.market,
                wallet,
            )
            .await;

        let mut state = self.shared.state.lock().await;
        state.loading = false;
        if state.epoch != epoch {
            info!(amount = %amount, "Flow closed during execution, outcome not applied");
            return result;
        }

        match &result {
            Ok(outcome) if outcome.success => {
                state.timer.cancel();
                state.last_outcome = Some(outcome.clone());
                state.phase = FlowPhase::Done(outcome.clone());
            }
            Ok(outcome) => {
                state.last_outcome = Some(outcome.clone());
            }
            Err(err) => {
                warn!(error = %err, "Deposit could not be submitted");
            }
        }

        result
    }

    /// Close the flow: cancel the pending timer and clear all state
    ///
    /// In-flight engine calls are not cancelled; their results are discarded.
    pub async fn close(&self) {
        let mut state = self.shared.state.lock().await;
        state.epoch += 1;
        state.reset(FlowPhase::Closed);
        info!(market = %self.shared.target.market.id, "Deposit flow closed");
    }

    pub async fn confirm_blocker(&self) -> Option<ConfirmBlocker> {
        let state = self.shared.state.lock().await;
        self.shared.confirm_blocker(&state)
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        let state = self.shared.state.lock().await;

        let summary = state
            .summary
            .clone()
            .filter(|_| state.already_simulated(&state.amount));

        FlowSnapshot {
            phase: state.phase.clone(),
            amount: state.amount.clone(),
            loading: state.loading,
            simulation: state.simulation_phase(),
            multi_step: summary.as_ref().map(|s| s.multi_step().clone()),
            summary,
            simulation_error: state.simulation_error.clone(),
            last_outcome: state.last_outcome.clone(),
            confirm_blocker: self.shared.confirm_blocker(&state),
        }
    }
}
