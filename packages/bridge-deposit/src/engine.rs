//! Bridging/Execution Engine contract
//!
//! The engine moves value across chains and then invokes a contract call on
//! the destination chain. Its routing, signing and finality logic are opaque;
//! this module only fixes the request/response shapes the deposit flow relies
//! on. Result payloads are data transfer objects with a documented minimal
//! shape (fees, gas, optional source legs) rather than domain objects.

use alloy::primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::types::ExecuteCallSpec;

// ============================================================================
// Requests
// ============================================================================

/// Parameters shared by simulate and execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeAndExecuteParams {
    /// Symbol of the token to bridge
    pub token: String,
    /// Amount in base units
    pub amount: U256,
    /// Destination native chain ID
    pub to_chain_id: u64,
    /// Call to execute once funds have arrived
    pub execute: ExecuteCallSpec,
}

/// Execution options passed to [`BridgeEngine::bridge_and_execute`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Wait for the destination transaction receipt before returning
    pub wait_for_receipt: bool,
    /// Upper bound on the receipt wait
    pub receipt_timeout: Duration,
}

// ============================================================================
// Simulation Result DTOs
// ============================================================================

/// Fee breakdown of the bridging leg, in token units (decimal strings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeFees {
    pub total: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub solver: Option<String>,
    #[serde(default)]
    pub gas_supplied: Option<String>,
}

/// Simulation of the bridging leg
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeSimulation {
    pub fees: BridgeFees,
    /// Amount delivered on the destination chain, in token units
    #[serde(default)]
    pub destination_amount: Option<String>,
}

/// Simulation of the destination contract call (gas figures in wei)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteSimulation {
    pub gas_used: u64,
    pub gas_price: U256,
    /// Total gas fee, when the engine reports it directly
    #[serde(default)]
    pub gas_fee: Option<U256>,
}

impl ExecuteSimulation {
    /// Gas fee in wei; derived from used gas and price when not reported
    pub fn fee(&self) -> U256 {
        self.gas_fee
            .unwrap_or_else(|| U256::from(self.gas_used).saturating_mul(self.gas_price))
    }
}

/// A source chain funding the bridging leg
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLeg {
    pub chain_id: u64,
    /// Amount taken from this chain, in token units
    pub amount: String,
}

/// Whether a deposit needs bridging and which chains fund it
///
/// Read-only for the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStepResult {
    pub requires_bridging: bool,
    #[serde(default)]
    pub sources: Vec<SourceLeg>,
    pub destination_chain_id: u64,
}

/// Full simulation payload returned by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Absent when no bridging leg is needed
    #[serde(default)]
    pub bridge_simulation: Option<BridgeSimulation>,
    pub execute_simulation: ExecuteSimulation,
    pub multi_step: MultiStepResult,
}

/// Response of a bridge-and-execute submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeAndExecuteResult {
    #[serde(default)]
    pub execute_transaction_hash: Option<String>,
    #[serde(default)]
    pub execute_explorer_url: Option<String>,
}

impl BridgeAndExecuteResult {
    /// The transaction hash, ignoring blank values
    pub fn transaction_hash(&self) -> Option<&str> {
        self.execute_transaction_hash
            .as_deref()
            .map(str::trim)
            .filter(|hash| !hash.is_empty())
    }
}

// ============================================================================
// Failures
// ============================================================================

/// A raw failure reported by the engine, before classification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineFailure {
    /// An error carrying a message
    #[error("{0}")]
    Message(String),
    /// A non-standard failure value without a message
    #[error("non-standard engine failure: {0}")]
    Opaque(serde_json::Value),
}

impl EngineFailure {
    pub fn message(&self) -> Option<&str> {
        match self {
            EngineFailure::Message(message) => Some(message),
            EngineFailure::Opaque(_) => None,
        }
    }
}

impl From<String> for EngineFailure {
    fn from(message: String) -> Self {
        EngineFailure::Message(message)
    }
}

impl From<&str> for EngineFailure {
    fn from(message: &str) -> Self {
        EngineFailure::Message(message.to_string())
    }
}

// ============================================================================
// Engine Trait
// ============================================================================

/// Bridging/execution engine
#[async_trait]
pub trait BridgeEngine: Send + Sync {
    /// Simulate bridging plus execution. Never mutates chain state.
    async fn simulate_bridge_and_execute(
        &self,
        params: &BridgeAndExecuteParams,
    ) -> Result<SimulationResult, EngineFailure>;

    /// Bridge and execute on-chain, optionally waiting for the receipt
    async fn bridge_and_execute(
        &self,
        params: &BridgeAndExecuteParams,
        options: &ExecuteOptions,
    ) -> Result<BridgeAndExecuteResult, EngineFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_fee_fallback() {
        let sim = ExecuteSimulation {
            gas_used: 150_000,
            gas_price: U256::from(100_000_000u64),
            gas_fee: None,
        };
        assert_eq!(sim.fee(), U256::from(15_000_000_000_000u64));

        let reported = ExecuteSimulation {
            gas_fee: Some(U256::from(42u64)),
            ..sim
        };
        assert_eq!(reported.fee(), U256::from(42u64));
    }

    #[test]
    fn test_transaction_hash_ignores_blank() {
        let result = BridgeAndExecuteResult {
            execute_transaction_hash: Some("  ".to_string()),
            execute_explorer_url: None,
        };
        assert_eq!(result.transaction_hash(), None);

        let result = BridgeAndExecuteResult {
            execute_transaction_hash: Some("0xfeed".to_string()),
            execute_explorer_url: None,
        };
        assert_eq!(result.transaction_hash(), Some("0xfeed"));
    }

    #[test]
    fn test_simulation_result_from_json() {
        let json = r#"{
            "bridgeSimulation": {
                "fees": { "total": "0.42", "protocol": "0.02" },
                "destinationAmount": "99.58"
            },
            "executeSimulation": {
                "gasUsed": 150000,
                "gasPrice": "0x5f5e100"
            },
            "multiStep": {
                "requiresBridging": true,
                "sources": [{ "chainId": 8453, "amount": "100" }],
                "destinationChainId": 42161
            }
        }"#;

        let result: SimulationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.execute_simulation.gas_used, 150_000);
        assert_eq!(result.multi_step.sources[0].chain_id, 8453);
        assert_eq!(
            result.bridge_simulation.unwrap().destination_amount.as_deref(),
            Some("99.58")
        );
    }
}
