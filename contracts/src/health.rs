//! Solvency parameters and the health factor.
//!
//! health_factor = (collateral_usd * THRESHOLD / LIQUIDATION_PRECISION) * PRECISION / debt
//!
//! A position is safe while its health factor is at least `MIN_HEALTH_FACTOR`.
//! With a 50% threshold this means collateral must be worth at least twice the debt.

use odra::casper_types::{U256, U512};

/// Base fixed-point precision (1e18)
pub const PRECISION: u64 = 1_000_000_000_000_000_000;

/// Share of collateral value counted toward solvency, out of `LIQUIDATION_PRECISION`
pub const LIQUIDATION_THRESHOLD: u64 = 50;

/// Liquidator premium on seized collateral, out of `LIQUIDATION_PRECISION`
pub const LIQUIDATION_BONUS: u64 = 10;

/// Denominator for threshold and bonus
pub const LIQUIDATION_PRECISION: u64 = 100;

/// Minimum health factor (1.0 in 18-decimal fixed point)
pub const MIN_HEALTH_FACTOR: u64 = PRECISION;

/// Scale that lifts an 8-decimal feed price to 18 decimals (1e10).
///
/// Conversions derive the scale from the feed and asset decimals instead; for
/// an 8-decimal feed and an 18-decimal asset both give the same result.
pub const ADDITIONAL_FEED_PRECISION: u64 = 10_000_000_000;

/// Health factor for a debt / collateral value pair.
///
/// Zero debt is infinitely healthy and yields `U256::MAX`. The product
/// `collateral * THRESHOLD * PRECISION` is formed in 512 bits, so only a
/// quotient that itself exceeds `U256::MAX` saturates.
pub fn health_factor(total_debt: U256, collateral_value_in_usd: U256) -> U256 {
    if total_debt.is_zero() {
        return U256::MAX;
    }

    let adjusted = widen(collateral_value_in_usd) * U512::from(LIQUIDATION_THRESHOLD)
        / U512::from(LIQUIDATION_PRECISION);
    let factor = adjusted * U512::from(PRECISION) / widen(total_debt);
    narrow(factor).unwrap_or(U256::MAX)
}

fn widen(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

/// Lower 256 bits of `value`, or `None` if any upper bit is set
fn narrow(value: U512) -> Option<U256> {
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    if bytes[32..].iter().any(|byte| *byte != 0) {
        return None;
    }
    Some(U256::from_little_endian(&bytes[..32]))
}

/// Whether `factor` meets the minimum
pub fn is_healthy(factor: U256) -> bool {
    factor >= U256::from(MIN_HEALTH_FACTOR)
}

/// Liquidation bonus for a base collateral amount
pub fn liquidation_bonus(base_collateral: U256) -> U256 {
    base_collateral * U256::from(LIQUIDATION_BONUS) / U256::from(LIQUIDATION_PRECISION)
}
