//! Testing Utilities Module
//!
//! Fakes for the injected collaborators plus fixture catalogs and markets.
//! Compiled for unit tests and behind the `testing` feature for downstream
//! crates.
//!
//! ## Submodules
//!
//! - `fixtures` - Supported chains, tokens, markets and engine payloads
//! - `mock_engine` - Scriptable [`BridgeEngine`](crate::engine::BridgeEngine)
//! - `mock_wallet` - Static wallet and fiat price table

pub mod fixtures;
pub mod mock_engine;
pub mod mock_wallet;

pub use mock_engine::*;
pub use mock_wallet::*;
