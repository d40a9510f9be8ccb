//! Common types used across the engine.

use odra::prelude::*;
use odra::casper_types::U256;

/// Price quote returned by a price feed
#[odra::odra_type]
pub struct PriceQuote {
    /// USD price of one whole asset unit, scaled by 10^decimals
    pub price: U256,
    /// Decimal places for price
    pub decimals: u8,
    /// Block time (milliseconds) at which the price was written
    pub updated_at: u64,
    /// Monotonic update counter
    pub round: u64,
}

/// Collateral asset bound to its price feed at construction
#[odra::odra_type]
#[derive(Copy)]
pub struct CollateralBinding {
    /// Collateral token contract
    pub asset: Address,
    /// Price feed contract for the asset
    pub price_feed: Address,
    /// Native decimals of the collateral token
    pub decimals: u8,
}

/// Debt and collateral value of a single account
#[odra::odra_type]
#[derive(Copy)]
pub struct AccountInformation {
    /// Minted stablecoin (18 decimals)
    pub total_dsc_minted: U256,
    /// Collateral value in USD (18 decimals)
    pub collateral_value_in_usd: U256,
}

/// Result of a successful liquidation
#[odra::odra_type]
#[derive(Copy)]
pub struct LiquidationOutcome {
    /// Collateral moved to the liquidator, bonus included
    pub collateral_seized: U256,
    /// Bonus portion computed before capping
    pub bonus_collateral: U256,
    /// Whether the payout was capped at the target's deposit
    pub capped: bool,
    /// Debt repaid on behalf of the target
    pub debt_covered: U256,
    /// Target health factor before liquidation
    pub starting_health_factor: U256,
    /// Target health factor after liquidation
    pub ending_health_factor: U256,
}
