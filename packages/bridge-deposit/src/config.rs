//! Deposit flow configuration
//!
//! Loaded from environment variables, optionally seeded from a `.env` file.

use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::units::DEFAULT_MAX_BALANCE_FRACTION_BPS;

/// Tuning for a deposit flow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DepositConfig {
    /// Quiet period after the last amount edit before simulating
    #[serde(default = "default_debounce", with = "millis")]
    pub debounce: Duration,
    /// Upper bound on the destination receipt wait
    #[serde(default = "default_receipt_timeout", with = "secs")]
    pub receipt_timeout: Duration,
    /// Share of the wallet balance a deposit may use, in basis points
    #[serde(default = "default_max_balance_fraction_bps")]
    pub max_balance_fraction_bps: u32,
    /// Referral code passed to the pool's `supply` call
    #[serde(default)]
    pub referral_code: u16,
}

fn default_debounce() -> Duration {
    Duration::from_millis(1000)
}

fn default_receipt_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_max_balance_fraction_bps() -> u32 {
    DEFAULT_MAX_BALANCE_FRACTION_BPS
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            debounce: default_debounce(),
            receipt_timeout: default_receipt_timeout(),
            max_balance_fraction_bps: default_max_balance_fraction_bps(),
            referral_code: 0,
        }
    }
}

impl DepositConfig {
    /// Load configuration from `.env` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    fn load_from_env() -> Result<Self> {
        let config = DepositConfig {
            debounce: env::var("DEPOSIT_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or_else(default_debounce),
            receipt_timeout: env::var("DEPOSIT_RECEIPT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or_else(default_receipt_timeout),
            max_balance_fraction_bps: env::var("DEPOSIT_MAX_BALANCE_BPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_balance_fraction_bps),
            referral_code: env::var("DEPOSIT_REFERRAL_CODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.debounce.is_zero() {
            return Err(eyre!("debounce must be greater than zero"));
        }

        // An unbounded receipt wait is never allowed
        if self.receipt_timeout.is_zero() {
            return Err(eyre!("receipt_timeout must be greater than zero"));
        }

        if self.max_balance_fraction_bps == 0 || self.max_balance_fraction_bps > 10_000 {
            return Err(eyre!(
                "max_balance_fraction_bps must be in 1..=10000, got {}",
                self.max_balance_fraction_bps
            ));
        }

        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DepositConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(1000));
        assert_eq!(config.receipt_timeout, Duration::from_secs(300));
        assert_eq!(config.max_balance_fraction_bps, 9_000);
        assert_eq!(config.referral_code, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = DepositConfig {
            receipt_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DepositConfig {
            debounce: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_balance_fraction_bounds() {
        for (bps, ok) in [(0, false), (1, true), (10_000, true), (10_001, false)] {
            let config = DepositConfig {
                max_balance_fraction_bps: bps,
                ..Default::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "bps = {bps}");
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: DepositConfig =
            serde_json::from_str(r#"{ "debounce": 250, "referral_code": 7 }"#).unwrap();
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.receipt_timeout, Duration::from_secs(300));
        assert_eq!(config.referral_code, 7);
    }
}
