//! Price Feed Contract
//!
//! Push-style USD price feed for one collateral asset. An authorized feeder
//! writes prices; the engine reads `latest_price` and applies its own
//! staleness rule, so this contract never filters or caches on its behalf.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::DscError;
use crate::types::PriceQuote;

/// Price Feed Contract
#[odra::module]
pub struct PriceFeed {
    /// Feeder allowed to publish prices
    owner: Var<Address>,
    /// Human readable pair, e.g. "WETH / USD"
    description: Var<String>,
    /// Decimal places of published prices
    decimals: Var<u8>,
    /// Latest published price
    price: Var<U256>,
    /// Block time of the latest update
    updated_at: Var<u64>,
    /// Number of updates so far
    round: Var<u64>,
}

#[odra::module]
impl PriceFeed {
    /// Initialize the feed and publish `initial_price`
    pub fn init(&mut self, description: String, decimals: u8, initial_price: U256) {
        self.owner.set(self.env().caller());
        self.description.set(description);
        self.decimals.set(decimals);
        self.round.set(0);
        self.publish(initial_price);
    }

    // ========== Price Query Functions ==========

    /// Latest quote; freshness is the consumer's concern
    pub fn latest_price(&self) -> PriceQuote {
        PriceQuote {
            price: self.price.get().unwrap_or(U256::zero()),
            decimals: self.decimals(),
            updated_at: self.updated_at.get().unwrap_or(0),
            round: self.round.get().unwrap_or(0),
        }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(0)
    }

    pub fn description(&self) -> String {
        self.description.get().unwrap_or_default()
    }

    // ========== Price Update Functions ==========

    /// Publish a new price (owner only)
    pub fn update_price(&mut self, price: U256) {
        self.require_owner();
        self.publish(price);
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.owner.set(new_owner);
    }

    pub fn get_owner(&self) -> Option<Address> {
        self.owner.get()
    }

    // ========== Internal Functions ==========

    fn publish(&mut self, price: U256) {
        if price.is_zero() {
            self.env().revert(DscError::InvalidPrice);
        }
        let round = self.round.get().unwrap_or(0);
        self.price.set(price);
        self.updated_at.set(self.env().get_block_time());
        self.round.set(round + 1);
    }

    fn require_owner(&self) {
        let caller = self.env().caller();
        if self.owner.get() != Some(caller) {
            self.env().revert(DscError::Unauthorized);
        }
    }
}
