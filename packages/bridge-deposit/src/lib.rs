//! Bridge-Deposit: Cross-Chain Deposit Orchestration for Lending Markets
//!
//! This crate drives a "bridge-then-execute" deposit: funds that sit on one chain
//! are bridged to the chain of a lending pool and the pool's `supply` call is
//! executed on the destination chain as one logical operation.
//!
//! - **Catalog** - Supported chains/tokens and the asset resolver
//! - **Units** - Exact human amount <-> base unit conversion
//! - **Builder** - Destination contract call and approval descriptor
//! - **Classify** - Engine failure taxonomy
//! - **Simulation** - Cost/outcome simulation normalized into a summary
//! - **Execution** - Bridge-and-execute with a bounded receipt wait
//! - **Orchestrator** - Per-flow state with debounced re-simulation
//!
//! The bridging engine, fiat lookup and wallet are collaborators injected as
//! trait objects (see [`engine::BridgeEngine`], [`fiat::FiatValueLookup`],
//! [`wallet::WalletSession`]).
//!
//! ## Feature Flags
//!
//! - `testing` - Expose mock collaborators and fixtures for downstream tests

pub mod builder;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod execution;
pub mod fiat;
pub mod orchestrator;
pub mod simulation;
pub mod timer;
pub mod types;
pub mod units;
pub mod wallet;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::{DepositParamsBuilder, DepositPlan};
pub use catalog::{
    parse_address, CatalogHandle, ChainDescriptor, NativeCurrency, SupportedChains,
    TokenDescriptor, TokenLocation, TokenResolver,
};
pub use classify::{classify, ClassifiedError, ErrorKind};
pub use config::DepositConfig;
pub use engine::{
    BridgeAndExecuteParams, BridgeAndExecuteResult, BridgeEngine, EngineFailure, ExecuteOptions,
    MultiStepResult, SimulationResult,
};
pub use error::DepositError;
pub use execution::ExecutionController;
pub use fiat::FiatValueLookup;
pub use orchestrator::{
    ConfirmBlocker, DepositOrchestrator, DepositServices, DepositTarget, FlowPhase, FlowSnapshot,
    SimulationPhase,
};
pub use simulation::SimulationController;
pub use timer::DebounceTimer;
pub use types::{DepositOutcome, ExecuteCallSpec, Market, SimulationSummary, TokenApproval};
pub use units::{format_token_balance, from_base_units, max_depositable, to_base_units};
pub use wallet::WalletSession;
