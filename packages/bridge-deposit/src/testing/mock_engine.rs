//! Mock implementation of the BridgeEngine trait for testing.

use alloy::primitives::U256;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::fixtures;
use crate::engine::{
    BridgeAndExecuteParams, BridgeAndExecuteResult, BridgeEngine, EngineFailure, ExecuteOptions,
    SimulationResult,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Parameters captured from a `bridge_and_execute` call.
#[derive(Debug, Clone)]
pub struct ExecuteCall {
    pub params: BridgeAndExecuteParams,
    pub options: ExecuteOptions,
}

/// Scriptable engine that records every call.
///
/// Responses are returned as configured; an optional latency (driven by
/// `tokio::time`, so paused-clock tests control it) delays every call.
pub struct MockEngine {
    simulate_calls: Mutex<Vec<BridgeAndExecuteParams>>,
    execute_calls: Mutex<Vec<ExecuteCall>>,
    simulation: Mutex<Result<SimulationResult, EngineFailure>>,
    execution: Mutex<Result<BridgeAndExecuteResult, EngineFailure>>,
    latency: Mutex<Duration>,
}

impl MockEngine {
    /// Creates a mock that bridges successfully and returns a transaction hash.
    pub fn new() -> Self {
        Self {
            simulate_calls: Mutex::new(Vec::new()),
            execute_calls: Mutex::new(Vec::new()),
            simulation: Mutex::new(Ok(fixtures::bridged_simulation())),
            execution: Mutex::new(Ok(fixtures::executed())),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    pub fn with_simulation(self, response: Result<SimulationResult, EngineFailure>) -> Self {
        self.set_simulation(response);
        self
    }

    pub fn with_execution(self, response: Result<BridgeAndExecuteResult, EngineFailure>) -> Self {
        self.set_execution(response);
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    pub fn set_simulation(&self, response: Result<SimulationResult, EngineFailure>) {
        *lock(&self.simulation) = response;
    }

    pub fn set_execution(&self, response: Result<BridgeAndExecuteResult, EngineFailure>) {
        *lock(&self.execution) = response;
    }

    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = latency;
    }

    pub fn simulate_calls(&self) -> Vec<BridgeAndExecuteParams> {
        lock(&self.simulate_calls).clone()
    }

    /// Base-unit amounts of every simulate call, in call order.
    pub fn simulated_amounts(&self) -> Vec<U256> {
        lock(&self.simulate_calls).iter().map(|p| p.amount).collect()
    }

    pub fn execute_calls(&self) -> Vec<ExecuteCall> {
        lock(&self.execute_calls).clone()
    }

    async fn delay(&self) {
        let latency = *lock(&self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BridgeEngine for MockEngine {
    async fn simulate_bridge_and_execute(
        &self,
        params: &BridgeAndExecuteParams,
    ) -> Result<SimulationResult, EngineFailure> {
        lock(&self.simulate_calls).push(params.clone());
        self.delay().await;
        lock(&self.simulation).clone()
    }

    async fn bridge_and_execute(
        &self,
        params: &BridgeAndExecuteParams,
        options: &ExecuteOptions,
    ) -> Result<BridgeAndExecuteResult, EngineFailure> {
        lock(&self.execute_calls).push(ExecuteCall {
            params: params.clone(),
            options: *options,
        });
        self.delay().await;
        lock(&self.execution).clone()
    }
}
