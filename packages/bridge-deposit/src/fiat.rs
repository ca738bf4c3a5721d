//! Fiat value lookup
//!
//! Prices are owned by an external provider; lookups are synchronous and
//! best-effort (an unknown symbol prices at zero).

use bigdecimal::BigDecimal;

/// USD valuation of token quantities
pub trait FiatValueLookup: Send + Sync {
    /// USD value of `quantity` units of the token named or symbolized `token`
    fn fiat_value(&self, quantity: &BigDecimal, token: &str) -> BigDecimal;
}
