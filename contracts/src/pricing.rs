//! USD ⇄ asset conversion over live price quotes.
//!
//! Implements:
//! - Freshness check against `PRICE_TIMEOUT`
//! - `usd = price * amount * 1e18 / 10^(feed_decimals + asset_decimals)`
//! - `amount = usd * 10^(feed_decimals + asset_decimals) / (price * 1e18)`
//!
//! Multiplication always happens before division. Reordering the operations
//! changes truncation and therefore results.

use odra::casper_types::U256;
use crate::errors::DscError;
use crate::health::PRECISION;
use crate::types::PriceQuote;

/// Maximum quote age in block-time milliseconds (3 hours)
pub const PRICE_TIMEOUT: u64 = 3 * 60 * 60 * 1000;

/// Reject quotes older than `PRICE_TIMEOUT` or carrying a zero price
pub fn ensure_fresh(quote: &PriceQuote, now: u64) -> Result<(), DscError> {
    if quote.updated_at == 0 || now.saturating_sub(quote.updated_at) > PRICE_TIMEOUT {
        return Err(DscError::StalePrice);
    }
    if quote.price.is_zero() {
        return Err(DscError::InvalidPrice);
    }
    Ok(())
}

/// USD value (18 decimals) of `amount` raw units of an asset
pub fn usd_value(quote: &PriceQuote, asset_decimals: u8, amount: U256) -> Result<U256, DscError> {
    let scale = decimal_scale(quote.decimals, asset_decimals)?;
    let numerator = quote
        .price
        .checked_mul(amount)
        .and_then(|value| value.checked_mul(U256::from(PRECISION)))
        .ok_or(DscError::ArithmeticOverflow)?;
    Ok(numerator / scale)
}

/// Raw asset units worth `usd_amount` (18 decimals)
pub fn asset_amount_from_usd(
    quote: &PriceQuote,
    asset_decimals: u8,
    usd_amount: U256,
) -> Result<U256, DscError> {
    if quote.price.is_zero() {
        return Err(DscError::InvalidPrice);
    }
    let scale = decimal_scale(quote.decimals, asset_decimals)?;
    let numerator = usd_amount
        .checked_mul(scale)
        .ok_or(DscError::ArithmeticOverflow)?;
    let denominator = quote
        .price
        .checked_mul(U256::from(PRECISION))
        .ok_or(DscError::ArithmeticOverflow)?;
    Ok(numerator / denominator)
}

/// 10^(feed_decimals + asset_decimals)
fn decimal_scale(feed_decimals: u8, asset_decimals: u8) -> Result<U256, DscError> {
    let exponent = u32::from(feed_decimals) + u32::from(asset_decimals);
    U256::from(10u8)
        .checked_pow(U256::from(exponent))
        .ok_or(DscError::ArithmeticOverflow)
}
