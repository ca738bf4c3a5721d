//! Token Amount Helpers
//!
//! Conversion between user-entered decimal strings and base units. All
//! conversions are exact: amounts never pass through floating point, and
//! fractional digits below a token's smallest unit are truncated.

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};
use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

use crate::error::DepositError;

/// Default share of the wallet balance a deposit may use (basis points)
pub const DEFAULT_MAX_BALANCE_FRACTION_BPS: u32 = 9_000;

/// Split a plain decimal string into integer and fraction digits
///
/// Accepts `"12"`, `"12.5"`, `"12."` and `".5"`. Signs, exponents and
/// separators are rejected.
fn split_decimal(amount: &str) -> Option<(&str, &str)> {
    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    Some((int_part, frac_part))
}

/// Parse a user-entered amount as a non-negative decimal
pub fn parse_decimal(amount: &str) -> Option<BigDecimal> {
    let trimmed = amount.trim();
    split_decimal(trimmed)?;
    BigDecimal::from_str(trimmed).ok()
}

/// Whether two user-entered amounts denote the same value
///
/// Compares numerically when both parse (`"1.0"` equals `"1"`), textually
/// otherwise.
pub fn amounts_equal(a: &str, b: &str) -> bool {
    match (parse_decimal(a), parse_decimal(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a.trim() == b.trim(),
    }
}

/// Convert a human-readable amount to base units, truncating extra precision
///
/// `"1.23456789"` with 6 decimals yields `1234567`.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, DepositError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(DepositError::invalid_amount(amount, "amount is empty"));
    }

    let (int_part, frac_part) = split_decimal(trimmed)
        .ok_or_else(|| DepositError::invalid_amount(amount, "not a plain decimal number"))?;

    let keep = frac_part.len().min(decimals as usize);
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let normalized = if keep == 0 {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, &frac_part[..keep])
    };

    let raw = parse_units(&normalized, decimals)
        .map_err(|e| DepositError::invalid_amount(amount, e.to_string()))?
        .get_absolute();

    if raw.is_zero() {
        return Err(DepositError::NonPositiveAmount {
            amount: amount.to_string(),
        });
    }

    Ok(raw)
}

/// Trimmed decimal rendering of a base-unit amount (`1500000`, 6 -> `"1.5"`)
pub fn format_base_units(raw: U256, decimals: u8) -> String {
    let formatted = match format_units(raw, decimals) {
        Ok(formatted) => formatted,
        Err(_) => return raw.to_string(),
    };

    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

/// Convert base units back to an exact decimal value
pub fn from_base_units(raw: U256, decimals: u8) -> BigDecimal {
    BigDecimal::from_str(&format_base_units(raw, decimals)).unwrap_or_else(|_| BigDecimal::zero())
}

/// Human-readable balance with symbol, e.g. `"1.5 USDC"`
pub fn format_token_balance(raw: U256, decimals: u8, symbol: &str) -> String {
    format!("{} {}", format_base_units(raw, decimals), symbol)
}

/// Convert a decimal value to base units, truncating below the smallest unit
///
/// Returns `None` for negative values or values that do not fit in a `U256`.
pub fn decimal_to_base_units(value: &BigDecimal, decimals: u8) -> Option<U256> {
    if value < &BigDecimal::zero() {
        return None;
    }

    let (digits, _) = value.with_scale(decimals as i64).into_bigint_and_exponent();
    U256::from_str_radix(&digits.to_string(), 10).ok()
}

/// Largest amount a deposit may use under the balance-fraction policy
///
/// `balance * bps / 10_000`, truncated to the token's precision.
pub fn max_depositable(balance: &BigDecimal, bps: u32, decimals: u8) -> BigDecimal {
    let fraction = BigDecimal::new(bps.into(), 4);
    let capped = balance * &fraction;
    match decimal_to_base_units(&capped, decimals) {
        Some(raw) => from_base_units(raw, decimals),
        None => BigDecimal::zero(),
    }
}
