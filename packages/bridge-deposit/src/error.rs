//! Error types for deposit orchestration
//!
//! Resolver and builder failures are typed so the orchestrator can turn each
//! one into an actionable state. Engine failures arrive already classified.

use alloy::primitives::Address;
use thiserror::Error;

use crate::classify::ClassifiedError;
use crate::orchestrator::ConfirmBlocker;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepositError {
    // ========================================================================
    // Resolver Errors
    // ========================================================================

    #[error("Supported chains catalog is not available yet")]
    CatalogUnavailable,

    #[error("Asset {address} is not supported on any chain")]
    NotFound { address: Address },

    #[error("Asset {address} is listed on several chains: {chains:?}")]
    AmbiguousAsset { address: Address, chains: Vec<u64> },

    #[error("Invalid address: {input}")]
    InvalidAddress { input: String },

    // ========================================================================
    // Builder Errors
    // ========================================================================

    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error("Invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Amount must be greater than zero, got {amount:?}")]
    NonPositiveAmount { amount: String },

    #[error("Market {market} is on chain {market_chain}, but the asset lives on chain {asset_chain}")]
    MarketChainMismatch {
        market: String,
        market_chain: u64,
        asset_chain: u64,
    },

    #[error("No {symbol} balance available for the connected wallet")]
    BalanceUnavailable { symbol: String },

    // ========================================================================
    // Engine / Flow Errors
    // ========================================================================

    #[error("{0}")]
    Engine(ClassifiedError),

    #[error("Deposit cannot be confirmed: {0}")]
    ConfirmBlocked(ConfirmBlocker),
}

impl DepositError {
    /// Shorthand for amount validation failures
    pub(crate) fn invalid_amount(amount: &str, reason: impl Into<String>) -> Self {
        DepositError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.into(),
        }
    }

    /// The classified engine failure, if this error came from the engine
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            DepositError::Engine(classified) => Some(classified),
            _ => None,
        }
    }
}

impl From<ClassifiedError> for DepositError {
    fn from(classified: ClassifiedError) -> Self {
        DepositError::Engine(classified)
    }
}
