//! Supported Chains Catalog and Asset Resolver
//!
//! The catalog of supported chains (each with its token list) is loaded by an
//! external provider. Until it has been published, resolution fails with
//! [`DepositError::CatalogUnavailable`] instead of guessing.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_deposit::catalog::{CatalogHandle, SupportedChains, TokenResolver};
//!
//! let catalog = CatalogHandle::new();
//! let resolver = TokenResolver::new(catalog.clone());
//!
//! // Later, once the provider has fetched the list:
//! catalog.publish(SupportedChains::from_json(&payload)?);
//! let location = resolver.resolve(asset)?;
//! ```

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::DepositError;

// ============================================================================
// Catalog Types
// ============================================================================

/// Native gas currency of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// A token listed on a supported chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDescriptor {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// A supported chain and its ordered token list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    /// Native EVM chain ID (e.g., 1, 8453, 42161)
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    /// Block explorer base URL (e.g., "https://arbiscan.io")
    #[serde(default)]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub tokens: Vec<TokenDescriptor>,
}

impl ChainDescriptor {
    /// Find a token on this chain by address
    pub fn token(&self, address: Address) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| t.address == address)
    }
}

/// Ordered collection of supported chains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedChains(pub Vec<ChainDescriptor>);

impl SupportedChains {
    pub fn new(chains: Vec<ChainDescriptor>) -> Self {
        Self(chains)
    }

    /// Parse a provider payload (a JSON array of chains)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.0
    }

    pub fn chain(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.0.iter().find(|c| c.id == chain_id)
    }
}

/// Where an asset lives: its chain and token metadata
///
/// Derived on every lookup, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLocation {
    pub chain: ChainDescriptor,
    pub token: TokenDescriptor,
}

// ============================================================================
// Catalog Handle
// ============================================================================

/// Shared handle to the latest published catalog
///
/// Cloning is cheap; all clones observe the same catalog.
#[derive(Clone)]
pub struct CatalogHandle {
    tx: Arc<watch::Sender<Option<Arc<SupportedChains>>>>,
}

impl CatalogHandle {
    /// Create a handle with no catalog loaded yet
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Create a handle that is already loaded
    pub fn loaded(chains: SupportedChains) -> Self {
        let handle = Self::new();
        handle.publish(chains);
        handle
    }

    /// Publish a freshly loaded catalog, replacing any previous one
    pub fn publish(&self, chains: SupportedChains) {
        tracing::info!(chains = chains.0.len(), "Supported chains catalog published");
        self.tx.send_replace(Some(Arc::new(chains)));
    }

    /// The current catalog, if one has been published
    pub fn snapshot(&self) -> Option<Arc<SupportedChains>> {
        self.tx.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Wait until a catalog has been published
    pub async fn wait_until_loaded(&self) -> Result<Arc<SupportedChains>, DepositError> {
        let mut rx = self.tx.subscribe();
        let loaded = rx
            .wait_for(|catalog| catalog.is_some())
            .await
            .map_err(|_| DepositError::CatalogUnavailable)?;
        loaded.clone().ok_or(DepositError::CatalogUnavailable)
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Parse a well-formed `0x`-prefixed 20-byte hex address (any letter case)
pub fn parse_address(input: &str) -> Result<Address, DepositError> {
    let trimmed = input.trim();
    let invalid = || DepositError::InvalidAddress {
        input: input.to_string(),
    };

    if trimmed.len() != 42 || !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
        return Err(invalid());
    }

    Address::from_str(&trimmed[2..]).map_err(|_| invalid())
}

/// Maps an asset address to the chain and token it lives on
#[derive(Clone)]
pub struct TokenResolver {
    catalog: CatalogHandle,
}

impl TokenResolver {
    pub fn new(catalog: CatalogHandle) -> Self {
        Self { catalog }
    }

    /// Resolve an asset to its unique chain/token pair
    ///
    /// Address comparison is byte-wise, so letter case in the catalog or the
    /// input does not matter. An address listed on more than one chain is
    /// reported as ambiguous.
    pub fn resolve(&self, asset: Address) -> Result<TokenLocation, DepositError> {
        let catalog = self
            .catalog
            .snapshot()
            .ok_or(DepositError::CatalogUnavailable)?;

        let mut matches = catalog
            .chains()
            .iter()
            .filter_map(|chain| chain.token(asset).map(|token| (chain, token)));

        let (chain, token) = matches
            .next()
            .ok_or(DepositError::NotFound { address: asset })?;

        let others: Vec<u64> = matches.map(|(c, _)| c.id).collect();
        if !others.is_empty() {
            let mut chains = vec![chain.id];
            chains.extend(others);
            return Err(DepositError::AmbiguousAsset {
                address: asset,
                chains,
            });
        }

        Ok(TokenLocation {
            chain: chain.clone(),
            token: token.clone(),
        })
    }

    /// Parse and resolve an address string
    pub fn resolve_str(&self, asset: &str) -> Result<TokenLocation, DepositError> {
        self.resolve(parse_address(asset)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_resolve_unique_token() {
        let resolver = TokenResolver::new(CatalogHandle::loaded(fixtures::catalog()));

        let location = resolver.resolve(fixtures::usdc_arbitrum()).unwrap();
        assert_eq!(location.chain.id, fixtures::ARBITRUM);
        assert_eq!(location.token.symbol, "USDC");
        assert_eq!(location.token.decimals, 6);

        let location = resolver.resolve(fixtures::usdc_base()).unwrap();
        assert_eq!(location.chain.id, fixtures::BASE);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let resolver = TokenResolver::new(CatalogHandle::loaded(fixtures::catalog()));

        let lower = resolver
            .resolve_str("0xaf88d065e77c8cc2239327c5edb3a432268e5831")
            .unwrap();
        let upper = resolver
            .resolve_str("0xAF88D065E77C8CC2239327C5EDB3A432268E5831")
            .unwrap();
        let checksummed = resolver
            .resolve_str("0xaf88d065e77c8cC2239327C5EDb3A432268e5831")
            .unwrap();

        assert_eq!(lower, upper);
        assert_eq!(lower, checksummed);
    }

    #[test]
    fn test_resolve_not_found() {
        let resolver = TokenResolver::new(CatalogHandle::loaded(fixtures::catalog()));
        let missing = Address::repeat_byte(0x42);

        assert_eq!(
            resolver.resolve(missing),
            Err(DepositError::NotFound { address: missing })
        );
    }

    #[test]
    fn test_resolve_before_catalog_loaded() {
        let catalog = CatalogHandle::new();
        let resolver = TokenResolver::new(catalog.clone());

        assert_eq!(
            resolver.resolve(fixtures::usdc_arbitrum()),
            Err(DepositError::CatalogUnavailable)
        );

        catalog.publish(fixtures::catalog());
        assert!(resolver.resolve(fixtures::usdc_arbitrum()).is_ok());
    }

    #[test]
    fn test_resolve_ambiguous_asset() {
        let mut chains = fixtures::catalog();
        let token = chains.0[0].tokens[0].clone();
        chains.0[1].tokens.push(token.clone());
        let resolver = TokenResolver::new(CatalogHandle::loaded(chains));

        match resolver.resolve(token.address) {
            Err(DepositError::AmbiguousAsset { chains, .. }) => assert_eq!(chains.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        assert!(parse_address("0xdead").is_err());
        assert!(parse_address("af88d065e77c8cc2239327c5edb3a432268e5831").is_err());
        assert!(parse_address("0xzz88d065e77c8cc2239327c5edb3a432268e5831").is_err());
        assert!(parse_address(" 0xaf88d065e77c8cc2239327c5edb3a432268e5831 ").is_ok());
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"[
            {
                "id": 10,
                "name": "OP Mainnet",
                "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 },
                "explorerUrl": "https://optimistic.etherscan.io",
                "tokens": [
                    {
                        "address": "0x0b2c639c533813f4aa9d7837caf62653d097ff85",
                        "symbol": "USDC",
                        "name": "USD Coin",
                        "decimals": 6
                    }
                ]
            }
        ]"#;

        let chains = SupportedChains::from_json(json).unwrap();
        assert_eq!(chains.chains().len(), 1);
        assert_eq!(chains.chain(10).unwrap().tokens[0].symbol, "USDC");
        assert!(chains.chain(1).is_none());
    }

    #[tokio::test]
    async fn test_wait_until_loaded() {
        let catalog = CatalogHandle::new();
        let publisher = catalog.clone();

        tokio::spawn(async move {
            publisher.publish(fixtures::catalog());
        });

        let loaded = catalog.wait_until_loaded().await.unwrap();
        assert!(!loaded.chains().is_empty());
        assert!(catalog.is_loaded());
    }
}
