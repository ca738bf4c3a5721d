//! Connected wallet session
//!
//! Injected into the orchestrator instead of reading a global wallet state.

use alloy::primitives::Address;
use bigdecimal::BigDecimal;

/// The user's wallet as seen by the deposit flow
pub trait WalletSession: Send + Sync {
    /// Connected account, or `None` when no wallet is connected
    fn address(&self) -> Option<Address>;

    /// Spendable balance of `symbol` across all supported chains, in token units
    fn balance(&self, symbol: &str) -> Option<BigDecimal>;
}
