//! Capabilities the engine core needs from its environment.
//!
//! `DscEngine` implements these over Odra storage and cross-contract calls.
//! Any other implementation (an in-memory host for simulation, for instance)
//! gets the exact same operation semantics from [`crate::operations`].

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::DscError;
use crate::events::{CollateralDeposited, CollateralRedeemed};
use crate::registry::CollateralRegistry;
use crate::types::PriceQuote;

/// Per-user collateral and debt ledger
pub trait PositionStore {
    fn registry(&self) -> CollateralRegistry;
    fn collateral_balance(&self, user: Address, asset: Address) -> U256;
    fn set_collateral_balance(&mut self, user: Address, asset: Address, amount: U256);
    fn debt_of(&self, user: Address) -> U256;
    fn set_debt(&mut self, user: Address, amount: U256);
}

/// Live price data and clock
pub trait PriceSource {
    /// Latest quote published by `price_feed`, unchecked for staleness
    fn price_quote(&self, price_feed: Address) -> Result<PriceQuote, DscError>;
    /// Current block time in milliseconds
    fn block_time(&self) -> u64;
}

/// Collateral token movements in and out of custody
pub trait CollateralCustody {
    /// Move `amount` of `asset` from `from` into custody
    fn pull_collateral(&mut self, asset: Address, from: Address, amount: U256) -> bool;
    /// Move `amount` of `asset` from custody to `to`
    fn push_collateral(&mut self, asset: Address, to: Address, amount: U256) -> bool;
}

/// Synthetic-dollar ledger
pub trait DebtToken {
    fn mint_stablecoin(&mut self, to: Address, amount: U256) -> bool;
    /// Move `amount` stablecoin from `from` into custody
    fn pull_stablecoin(&mut self, from: Address, amount: U256) -> bool;
    /// Destroy `amount` stablecoin held in custody
    fn burn_stablecoin(&mut self, amount: U256);
}

pub trait EngineEvents {
    fn collateral_deposited(&mut self, event: CollateralDeposited);
    fn collateral_redeemed(&mut self, event: CollateralRedeemed);
}

/// Storage for the "operation in progress" flag
pub trait ReentrancyFlag {
    fn is_entered(&self) -> bool;
    fn set_entered(&mut self, entered: bool);
}

/// All-or-nothing execution of one top-level call.
///
/// On `Err` every effect of `op` must be discarded: ledger writes, token
/// movements and events alike.
pub trait Atomic {
    fn atomically<T, F>(&mut self, op: F) -> Result<T, DscError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, DscError>;
}

/// Everything the operation gate touches
pub trait EngineHost:
    PositionStore + PriceSource + CollateralCustody + DebtToken + EngineEvents + ReentrancyFlag + Atomic
{
}

impl<T> EngineHost for T where
    T: PositionStore + PriceSource + CollateralCustody + DebtToken + EngineEvents + ReentrancyFlag + Atomic
{
}
