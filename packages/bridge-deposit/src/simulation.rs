//! Simulation Controller
//!
//! Runs the engine's non-mutating simulate call for a deposit and normalizes
//! the payload into a [`SimulationSummary`]: bridging fee and destination gas
//! valued in USD, gas rendered in the destination chain's native currency.
//!
//! Debouncing and stale-result handling belong to the orchestrator; this
//! controller performs exactly one simulate call per invocation.

use alloy::primitives::Address;
use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::builder::{DepositParamsBuilder, DepositPlan};
use crate::classify::classify;
use crate::engine::{BridgeEngine, SimulationResult};
use crate::error::DepositError;
use crate::fiat::FiatValueLookup;
use crate::types::{Market, SimulationSummary};
use crate::units::{format_base_units, format_token_balance, from_base_units};

pub struct SimulationController {
    engine: Arc<dyn BridgeEngine>,
    fiat: Arc<dyn FiatValueLookup>,
    builder: DepositParamsBuilder,
}

impl SimulationController {
    pub fn new(
        engine: Arc<dyn BridgeEngine>,
        fiat: Arc<dyn FiatValueLookup>,
        builder: DepositParamsBuilder,
    ) -> Self {
        Self {
            engine,
            fiat,
            builder,
        }
    }

    /// Simulate depositing `amount` of `asset` into `market`
    ///
    /// The wallet is required because the simulated `supply` call credits it.
    /// Engine failures are classified; on any failure no summary is produced.
    pub async fn simulate(
        &self,
        amount: &str,
        asset: Address,
        market: &Market,
        wallet: Option<Address>,
    ) -> Result<SimulationSummary, DepositError> {
        let plan = self.builder.build(amount, asset, market, wallet)?;
        let params = plan.bridge_params();

        info!(
            amount = %amount,
            token = %params.token,
            to_chain_id = params.to_chain_id,
            "Simulating deposit"
        );

        let result = match self.engine.simulate_bridge_and_execute(&params).await {
            Ok(result) => result,
            Err(failure) => {
                let classified = classify(&failure);
                warn!(
                    amount = %amount,
                    kind = %classified.kind,
                    error = %failure,
                    "Deposit simulation failed"
                );
                return Err(classified.into());
            }
        };

        Ok(self.summarize(&plan, result))
    }

    /// Normalize an engine simulation into display figures
    pub fn summarize(&self, plan: &DepositPlan, result: SimulationResult) -> SimulationSummary {
        let token = &plan.location.token;
        let native = &plan.location.chain.native_currency;
        let bridging_required = result.multi_step.requires_bridging;

        let bridge_fee_usd = match (&result.bridge_simulation, bridging_required) {
            (Some(bridge), true) => {
                let fee = BigDecimal::from_str(bridge.fees.total.trim()).unwrap_or_else(|_| {
                    warn!(total = %bridge.fees.total, "Unparseable bridge fee, valuing at zero");
                    BigDecimal::zero()
                });
                self.fiat.fiat_value(&fee, &token.symbol)
            }
            (None, true) => {
                warn!("Engine reported bridging without a bridge simulation");
                BigDecimal::zero()
            }
            (_, false) => {
                debug!(token = %token.symbol, "No bridging required");
                BigDecimal::zero()
            }
        };

        let gas_wei = result.execute_simulation.fee();
        let gas_native = from_base_units(gas_wei, native.decimals);
        let gas_usd = self.fiat.fiat_value(&gas_native, &native.symbol);
        let execution_gas_display = format_token_balance(gas_wei, native.decimals, &native.symbol);

        let destination_amount = result
            .bridge_simulation
            .as_ref()
            .filter(|_| bridging_required)
            .and_then(|bridge| bridge.destination_amount.clone())
            .unwrap_or_else(|| format_base_units(plan.base_amount, token.decimals));

        let total_cost_usd = &bridge_fee_usd + &gas_usd;

        info!(
            bridging_required,
            bridge_fee_usd = %bridge_fee_usd,
            gas = %execution_gas_display,
            total_cost_usd = %total_cost_usd,
            "Deposit simulated"
        );

        SimulationSummary {
            bridge_fee_usd,
            execution_gas_display,
            gas_usd,
            total_cost_usd,
            destination_amount,
            bridging_required,
            raw_result: result,
        }
    }
}
