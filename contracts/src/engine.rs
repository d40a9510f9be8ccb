//! DSC Engine Contract
//!
//! Custodies collateral and tracks debt for the DSC stablecoin.
//! Implements:
//! - Deposit / redeem of registered collateral tokens (CEP-18)
//! - Mint / burn of DSC against a 200% overcollateralization floor
//! - Liquidation of positions whose health factor fell below 1.0
//! - Health factor and conversion views for off-chain simulation
//!
//! Operation semantics live in [`crate::operations`]; this module supplies
//! storage, oracle reads and token calls through the [`crate::host`] traits.

use odra::prelude::*;
use odra::casper_types::{U256, RuntimeArgs, runtime_args};
use odra::CallDef;
use crate::errors::DscError;
use crate::events::{CollateralDeposited, CollateralRedeemed};
use crate::health::{
    self, ADDITIONAL_FEED_PRECISION, LIQUIDATION_BONUS, LIQUIDATION_PRECISION,
    LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR, PRECISION,
};
use crate::host::{
    Atomic, CollateralCustody, DebtToken, EngineEvents, PositionStore, PriceSource, ReentrancyFlag,
};
use crate::operations;
use crate::pricing::PRICE_TIMEOUT;
use crate::registry::CollateralRegistry;
use crate::types::{AccountInformation, LiquidationOutcome, PriceQuote};

/// DSC Engine Contract
#[odra::module(events = [CollateralDeposited, CollateralRedeemed])]
pub struct DscEngine {
    /// Supported collateral, fixed at init
    registry: Var<CollateralRegistry>,
    /// DSC stablecoin contract address
    stablecoin: Var<Address>,
    /// (user, asset) -> deposited amount
    collateral_deposited: Mapping<(Address, Address), U256>,
    /// user -> minted DSC
    dsc_minted: Mapping<Address, U256>,
    /// Set while an operation is in progress
    entered: Var<bool>,
}

#[odra::module]
impl DscEngine {
    /// Initialize the engine.
    ///
    /// `collateral_assets[i]` is priced by `price_feeds[i]`. Each asset's
    /// decimals are read once here and cached.
    pub fn init(&mut self, collateral_assets: Vec<Address>, price_feeds: Vec<Address>, stablecoin: Address) {
        let registry = CollateralRegistry::new(collateral_assets, price_feeds, |asset| {
            self.token_decimals(asset)
        });
        let registry = self.settle(registry);

        self.registry.set(registry);
        self.stablecoin.set(stablecoin);
        self.entered.set(false);
    }

    // ========== Position Operations ==========

    /// Deposit collateral into custody
    pub fn deposit_collateral(&mut self, asset: Address, amount: U256) {
        let caller = self.env().caller();
        let result = operations::deposit_collateral(self, caller, asset, amount);
        self.settle(result)
    }

    /// Deposit collateral and mint DSC in one call
    pub fn deposit_collateral_and_mint_dsc(&mut self, asset: Address, collateral_amount: U256, mint_amount: U256) {
        let caller = self.env().caller();
        let result = operations::deposit_collateral_and_mint_dsc(
            self,
            caller,
            asset,
            collateral_amount,
            mint_amount,
        );
        self.settle(result)
    }

    /// Mint DSC against deposited collateral
    pub fn mint_dsc(&mut self, amount: U256) {
        let caller = self.env().caller();
        let result = operations::mint_dsc(self, caller, amount);
        self.settle(result)
    }

    /// Burn DSC to reduce debt (requires DSC allowance for the engine)
    pub fn burn_dsc(&mut self, amount: U256) {
        let caller = self.env().caller();
        let result = operations::burn_dsc(self, caller, amount);
        self.settle(result)
    }

    /// Withdraw collateral
    pub fn redeem_collateral(&mut self, asset: Address, amount: U256) {
        let caller = self.env().caller();
        let result = operations::redeem_collateral(self, caller, asset, amount);
        self.settle(result)
    }

    /// Burn DSC and withdraw collateral in one call
    pub fn redeem_collateral_for_dsc(&mut self, asset: Address, collateral_amount: U256, dsc_amount: U256) {
        let caller = self.env().caller();
        let result = operations::redeem_collateral_for_dsc(
            self,
            caller,
            asset,
            collateral_amount,
            dsc_amount,
        );
        self.settle(result)
    }

    /// Repay `debt_to_cover` of `user`'s debt and seize `asset` plus a 10% bonus
    pub fn liquidate(&mut self, asset: Address, user: Address, debt_to_cover: U256) -> LiquidationOutcome {
        let liquidator = self.env().caller();
        let result = operations::liquidate(self, liquidator, asset, user, debt_to_cover);
        self.settle(result)
    }

    // ========== Query Functions ==========

    pub fn health_factor_of(&self, user: Address) -> U256 {
        let result = operations::health_factor_of(self, user);
        self.settle(result)
    }

    pub fn account_value_of(&self, user: Address) -> U256 {
        let result = operations::account_value_of(self, user);
        self.settle(result)
    }

    /// (debt, collateral value in USD) for `user`
    pub fn account_information(&self, user: Address) -> AccountInformation {
        let result = operations::account_information(self, user);
        self.settle(result)
    }

    pub fn collateral_balance_of(&self, user: Address, asset: Address) -> U256 {
        self.collateral_balance(user, asset)
    }

    pub fn dsc_minted_of(&self, user: Address) -> U256 {
        self.debt_of(user)
    }

    pub fn usd_value_of(&self, asset: Address, amount: U256) -> U256 {
        let result = operations::usd_value_of(self, asset, amount);
        self.settle(result)
    }

    pub fn asset_amount_from_usd(&self, asset: Address, usd_amount: U256) -> U256 {
        let result = operations::asset_amount_from_usd(self, asset, usd_amount);
        self.settle(result)
    }

    /// Health factor a position with these totals would have
    pub fn simulate_health_factor(&self, total_dsc_minted: U256, collateral_value_in_usd: U256) -> U256 {
        health::health_factor(total_dsc_minted, collateral_value_in_usd)
    }

    /// Registered collateral assets in registration order
    pub fn collateral_assets(&self) -> Vec<Address> {
        self.registry().assets()
    }

    pub fn price_feed_of(&self, asset: Address) -> Option<Address> {
        self.registry().price_feed_of(asset)
    }

    pub fn collateral_decimals(&self, asset: Address) -> Option<u8> {
        self.registry().decimals_of(asset)
    }

    pub fn stablecoin(&self) -> Option<Address> {
        self.stablecoin.get()
    }

    // ========== Parameters ==========

    pub fn liquidation_threshold(&self) -> U256 {
        U256::from(LIQUIDATION_THRESHOLD)
    }

    pub fn liquidation_bonus(&self) -> U256 {
        U256::from(LIQUIDATION_BONUS)
    }

    pub fn liquidation_precision(&self) -> U256 {
        U256::from(LIQUIDATION_PRECISION)
    }

    pub fn min_health_factor(&self) -> U256 {
        U256::from(MIN_HEALTH_FACTOR)
    }

    pub fn precision(&self) -> U256 {
        U256::from(PRECISION)
    }

    pub fn additional_feed_precision(&self) -> U256 {
        U256::from(ADDITIONAL_FEED_PRECISION)
    }

    /// Maximum accepted price age in milliseconds
    pub fn price_timeout(&self) -> u64 {
        PRICE_TIMEOUT
    }
}

impl DscEngine {
    /// Unwrap an engine result, reverting the whole call on error
    fn settle<T>(&self, result: Result<T, DscError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }

    fn token_decimals(&self, asset: Address) -> u8 {
        let call_def = CallDef::new("decimals", false, RuntimeArgs::new());
        self.env().call_contract(asset, call_def)
    }

    fn stablecoin_address(&self) -> Address {
        match self.stablecoin.get() {
            Some(address) => address,
            None => self.env().revert(DscError::UnsupportedAsset),
        }
    }
}

impl PositionStore for DscEngine {
    fn registry(&self) -> CollateralRegistry {
        match self.registry.get() {
            Some(registry) => registry,
            None => self.env().revert(DscError::UnsupportedAsset),
        }
    }

    fn collateral_balance(&self, user: Address, asset: Address) -> U256 {
        self.collateral_deposited.get(&(user, asset)).unwrap_or(U256::zero())
    }

    fn set_collateral_balance(&mut self, user: Address, asset: Address, amount: U256) {
        self.collateral_deposited.set(&(user, asset), amount);
    }

    fn debt_of(&self, user: Address) -> U256 {
        self.dsc_minted.get(&user).unwrap_or(U256::zero())
    }

    fn set_debt(&mut self, user: Address, amount: U256) {
        self.dsc_minted.set(&user, amount);
    }
}

impl PriceSource for DscEngine {
    fn price_quote(&self, price_feed: Address) -> Result<PriceQuote, DscError> {
        let call_def = CallDef::new("latest_price", false, RuntimeArgs::new());
        Ok(self.env().call_contract::<PriceQuote>(price_feed, call_def))
    }

    fn block_time(&self) -> u64 {
        self.env().get_block_time()
    }
}

impl CollateralCustody for DscEngine {
    fn pull_collateral(&mut self, asset: Address, from: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "owner" => from,
            "recipient" => self.env().self_address(),
            "amount" => amount
        };
        let call_def = CallDef::new("transfer_from", true, args);
        self.env().call_contract(asset, call_def)
    }

    fn push_collateral(&mut self, asset: Address, to: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "recipient" => to,
            "amount" => amount
        };
        let call_def = CallDef::new("transfer", true, args);
        self.env().call_contract(asset, call_def)
    }
}

impl DebtToken for DscEngine {
    fn mint_stablecoin(&mut self, to: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "to" => to,
            "amount" => amount
        };
        let call_def = CallDef::new("mint", true, args);
        self.env().call_contract(self.stablecoin_address(), call_def)
    }

    fn pull_stablecoin(&mut self, from: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "owner" => from,
            "recipient" => self.env().self_address(),
            "amount" => amount
        };
        let call_def = CallDef::new("transfer_from", true, args);
        self.env().call_contract(self.stablecoin_address(), call_def)
    }

    fn burn_stablecoin(&mut self, amount: U256) {
        let args = runtime_args! {
            "amount" => amount
        };
        let call_def = CallDef::new("burn", true, args);
        self.env().call_contract::<()>(self.stablecoin_address(), call_def);
    }
}

impl EngineEvents for DscEngine {
    fn collateral_deposited(&mut self, event: CollateralDeposited) {
        self.env().emit_event(event);
    }

    fn collateral_redeemed(&mut self, event: CollateralRedeemed) {
        self.env().emit_event(event);
    }
}

impl ReentrancyFlag for DscEngine {
    fn is_entered(&self) -> bool {
        self.entered.get().unwrap_or(false)
    }

    fn set_entered(&mut self, entered: bool) {
        self.entered.set(entered);
    }
}

impl Atomic for DscEngine {
    /// A failed engine call reverts the deploy, which discards storage
    /// writes, events and nested contract effects together.
    fn atomically<T, F>(&mut self, op: F) -> Result<T, DscError>
    where
        F: FnOnce(&mut Self) -> Result<T, DscError>,
    {
        let result = op(self);
        Ok(self.settle(result))
    }
}
