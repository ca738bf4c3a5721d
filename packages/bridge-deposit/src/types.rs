//! Common types for deposit orchestration
//!
//! Shared by the builder, the controllers and the orchestrator.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::{ClassifiedError, ErrorKind};
use crate::contracts::IERC20;
use crate::engine::{MultiStepResult, SimulationResult};

// ============================================================================
// Market
// ============================================================================

/// A lending market: the pool contract deposits are supplied to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Stable identifier (e.g., "aave-v3-arbitrum")
    pub id: String,
    /// Display name
    pub name: String,
    /// Native chain ID the pool is deployed on
    pub chain_id: u64,
    /// Pool contract that receives `supply` calls
    pub pool_address: Address,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

// ============================================================================
// Execute Call Spec
// ============================================================================

/// Source-token approval the engine must grant before executing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenApproval {
    /// Token symbol, as the engine identifies bridged tokens
    pub token: String,
    /// Amount in base units
    pub amount: U256,
    /// Contract allowed to pull the tokens
    pub spender: Address,
}

impl TokenApproval {
    /// ERC20 `approve(spender, amount)` calldata for this approval
    pub fn calldata(&self) -> Bytes {
        IERC20::approveCall {
            spender: self.spender,
            amount: self.amount,
        }
        .abi_encode()
        .into()
    }
}

/// Destination-chain contract call executed after bridging
///
/// Immutable once built; one instance per deposit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteCallSpec {
    pub destination_contract: Address,
    pub encoded_call: Bytes,
    pub native_value: U256,
    pub approval: TokenApproval,
}

// ============================================================================
// Simulation Summary
// ============================================================================

/// Normalized cost/outcome of a simulated deposit
///
/// Replaced wholesale by the next successful simulation, never edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    /// Bridging fee in USD (zero when no bridging leg is needed)
    pub bridge_fee_usd: BigDecimal,
    /// Execution gas in the destination chain's native currency, e.g. "0.000015 ETH"
    pub execution_gas_display: String,
    /// Execution gas in USD
    pub gas_usd: BigDecimal,
    /// Bridge fee plus gas, in USD
    pub total_cost_usd: BigDecimal,
    /// Amount that reaches the pool, in token units
    pub destination_amount: String,
    /// Whether funds have to be bridged from another chain
    pub bridging_required: bool,
    /// Raw engine result
    pub raw_result: SimulationResult,
}

impl SimulationSummary {
    pub fn multi_step(&self) -> &MultiStepResult {
        &self.raw_result.multi_step
    }
}

// ============================================================================
// Deposit Outcome
// ============================================================================

/// Terminal result of one execute attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DepositOutcome {
    /// A confirmed deposit, proven by its transaction hash
    pub fn succeeded(tx_hash: impl Into<String>, explorer_url: Option<String>) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash.into()),
            explorer_url,
            error_kind: None,
            error_message: None,
        }
    }

    /// A failed attempt
    pub fn failed(error: ClassifiedError) -> Self {
        Self {
            success: false,
            tx_hash: None,
            explorer_url: None,
            error_kind: Some(error.kind),
            error_message: Some(error.message),
        }
    }
}
