//! Static wallet session and fiat price table

use alloy::primitives::Address;
use bigdecimal::{BigDecimal, Zero};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use crate::fiat::FiatValueLookup;
use crate::wallet::WalletSession;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap_or_else(|_| BigDecimal::zero())
}

/// Wallet with a fixed account and editable balances
#[derive(Default)]
pub struct StaticWallet {
    address: Mutex<Option<Address>>,
    balances: Mutex<HashMap<String, BigDecimal>>,
}

impl StaticWallet {
    /// A wallet that is not connected
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: Address) -> Self {
        let wallet = Self::default();
        wallet.connect(address);
        wallet
    }

    /// Builder-style balance, e.g. `.with_balance("USDC", "100")`
    pub fn with_balance(self, symbol: &str, amount: &str) -> Self {
        self.set_balance(symbol, amount);
        self
    }

    pub fn set_balance(&self, symbol: &str, amount: &str) {
        lock(&self.balances).insert(symbol.to_string(), decimal(amount));
    }

    pub fn connect(&self, address: Address) {
        *lock(&self.address) = Some(address);
    }

    pub fn disconnect(&self) {
        *lock(&self.address) = None;
    }
}

impl WalletSession for StaticWallet {
    fn address(&self) -> Option<Address> {
        *lock(&self.address)
    }

    fn balance(&self, symbol: &str) -> Option<BigDecimal> {
        lock(&self.balances).get(symbol).cloned()
    }
}

/// Fixed USD prices per token symbol; unknown symbols price at zero
#[derive(Default)]
pub struct StaticFiat {
    prices: HashMap<String, BigDecimal>,
}

impl StaticFiat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, usd: &str) -> Self {
        self.prices.insert(symbol.to_string(), decimal(usd));
        self
    }

    /// USDC at 1, ETH and WETH at 3000
    pub fn mainnet() -> Self {
        Self::new()
            .with_price("USDC", "1")
            .with_price("ETH", "3000")
            .with_price("WETH", "3000")
    }
}

impl FiatValueLookup for StaticFiat {
    fn fiat_value(&self, quantity: &BigDecimal, token: &str) -> BigDecimal {
        match self.prices.get(token) {
            Some(price) => quantity * price,
            None => BigDecimal::zero(),
        }
    }
}
