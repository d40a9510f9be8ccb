//! Operation gate: the only legal transitions of a position.
//!
//! Every public operation:
//! 1. runs inside [`Atomic::atomically`], so a failure leaves no trace
//! 2. holds the reentrancy flag for its whole duration
//! 3. writes the ledger before calling any token contract
//! 4. ends with a health check unless it cannot worsen solvency
//!
//! Liquidation is the one exception to (4): it must strictly improve the
//! target's health factor and leave the liquidator healthy.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::DscError;
use crate::events::{CollateralDeposited, CollateralRedeemed};
use crate::health::{self, MIN_HEALTH_FACTOR};
use crate::host::{EngineHost, PositionStore, PriceSource};
use crate::pricing;
use crate::types::{AccountInformation, LiquidationOutcome, PriceQuote};

// ========== Public Operations ==========

/// Deposit `amount` of `asset` as collateral for `caller`
pub fn deposit_collateral<H: EngineHost>(
    host: &mut H,
    caller: Address,
    asset: Address,
    amount: U256,
) -> Result<(), DscError> {
    guarded(host, |host| deposit_unguarded(host, caller, asset, amount))
}

/// Mint `amount` stablecoin against `caller`'s collateral
pub fn mint_dsc<H: EngineHost>(host: &mut H, caller: Address, amount: U256) -> Result<(), DscError> {
    guarded(host, |host| mint_unguarded(host, caller, amount))
}

/// Deposit collateral and mint in one step
pub fn deposit_collateral_and_mint_dsc<H: EngineHost>(
    host: &mut H,
    caller: Address,
    asset: Address,
    collateral_amount: U256,
    mint_amount: U256,
) -> Result<(), DscError> {
    guarded(host, |host| {
        deposit_unguarded(host, caller, asset, collateral_amount)?;
        mint_unguarded(host, caller, mint_amount)
    })
}

/// Withdraw `amount` of `asset` back to `caller`
pub fn redeem_collateral<H: EngineHost>(
    host: &mut H,
    caller: Address,
    asset: Address,
    amount: U256,
) -> Result<(), DscError> {
    guarded(host, |host| {
        more_than_zero(amount)?;
        host.registry().require(asset)?;
        move_collateral(host, asset, amount, caller, caller)?;
        revert_if_health_factor_is_broken(host, caller)
    })
}

/// Repay `amount` of `caller`'s debt with their own stablecoin
pub fn burn_dsc<H: EngineHost>(host: &mut H, caller: Address, amount: U256) -> Result<(), DscError> {
    guarded(host, |host| {
        more_than_zero(amount)?;
        repay_debt(host, amount, caller, caller)?;
        // Repaying can only raise the factor; kept so a misbehaving
        // stablecoin cannot leave a broken position behind
        revert_if_health_factor_is_broken(host, caller)
    })
}

/// Burn `dsc_amount` then withdraw `collateral_amount` of `asset`
pub fn redeem_collateral_for_dsc<H: EngineHost>(
    host: &mut H,
    caller: Address,
    asset: Address,
    collateral_amount: U256,
    dsc_amount: U256,
) -> Result<(), DscError> {
    guarded(host, |host| {
        more_than_zero(collateral_amount)?;
        more_than_zero(dsc_amount)?;
        host.registry().require(asset)?;
        repay_debt(host, dsc_amount, caller, caller)?;
        move_collateral(host, asset, collateral_amount, caller, caller)?;
        revert_if_health_factor_is_broken(host, caller)
    })
}

/// Cover `debt_to_cover` of `user`'s debt and seize `asset` plus a bonus
pub fn liquidate<H: EngineHost>(
    host: &mut H,
    liquidator: Address,
    asset: Address,
    user: Address,
    debt_to_cover: U256,
) -> Result<LiquidationOutcome, DscError> {
    guarded(host, |host| {
        more_than_zero(debt_to_cover)?;
        let binding = *host.registry().require(asset)?;

        let starting_health_factor = health_factor_of(host, user)?;
        if health::is_healthy(starting_health_factor) {
            return Err(DscError::HealthFactorOk);
        }

        let quote = fresh_quote(host, binding.price_feed)?;
        let base_collateral = pricing::asset_amount_from_usd(&quote, binding.decimals, debt_to_cover)?;
        let bonus_collateral = health::liquidation_bonus(base_collateral);
        let total_collateral = base_collateral
            .checked_add(bonus_collateral)
            .ok_or(DscError::ArithmeticOverflow)?;

        // A crashed price can leave less collateral than debt plus bonus;
        // the liquidator then takes everything there is
        let deposited = host.collateral_balance(user, asset);
        let capped = total_collateral > deposited;
        let collateral_seized = if capped { deposited } else { total_collateral };

        move_collateral(host, asset, collateral_seized, user, liquidator)?;
        repay_debt(host, debt_to_cover, user, liquidator)?;

        let ending_health_factor = health_factor_of(host, user)?;
        if ending_health_factor <= starting_health_factor {
            return Err(DscError::HealthFactorNotImproved);
        }
        revert_if_health_factor_is_broken(host, liquidator)?;

        Ok(LiquidationOutcome {
            collateral_seized,
            bonus_collateral,
            capped,
            debt_covered: debt_to_cover,
            starting_health_factor,
            ending_health_factor,
        })
    })
}

// ========== Queries ==========

/// Latest quote for `price_feed`, rejected if stale
pub fn fresh_quote<H: PriceSource>(
    host: &H,
    price_feed: Address,
) -> Result<PriceQuote, DscError> {
    let quote = host.price_quote(price_feed)?;
    pricing::ensure_fresh(&quote, host.block_time())?;
    Ok(quote)
}

/// USD value (18 decimals) of `amount` of `asset`
pub fn usd_value_of<H: PositionStore + PriceSource>(
    host: &H,
    asset: Address,
    amount: U256,
) -> Result<U256, DscError> {
    let registry = host.registry();
    let binding = registry.require(asset)?;
    let quote = fresh_quote(host, binding.price_feed)?;
    pricing::usd_value(&quote, binding.decimals, amount)
}

/// Amount of `asset` worth `usd_amount` (18 decimals)
pub fn asset_amount_from_usd<H: PositionStore + PriceSource>(
    host: &H,
    asset: Address,
    usd_amount: U256,
) -> Result<U256, DscError> {
    let registry = host.registry();
    let binding = registry.require(asset)?;
    let quote = fresh_quote(host, binding.price_feed)?;
    pricing::asset_amount_from_usd(&quote, binding.decimals, usd_amount)
}

/// USD value of every registered asset `user` has deposited
pub fn account_value_of<H: PositionStore + PriceSource>(host: &H, user: Address) -> Result<U256, DscError> {
    let registry = host.registry();
    let mut total = U256::zero();
    for binding in registry.bindings() {
        let amount = host.collateral_balance(user, binding.asset);
        let quote = fresh_quote(host, binding.price_feed)?;
        let value = pricing::usd_value(&quote, binding.decimals, amount)?;
        total = total.checked_add(value).ok_or(DscError::ArithmeticOverflow)?;
    }
    Ok(total)
}

pub fn account_information<H: PositionStore + PriceSource>(
    host: &H,
    user: Address,
) -> Result<AccountInformation, DscError> {
    Ok(AccountInformation {
        total_dsc_minted: host.debt_of(user),
        collateral_value_in_usd: account_value_of(host, user)?,
    })
}

/// Current health factor of `user`, recomputed from live prices
pub fn health_factor_of<H: PositionStore + PriceSource>(host: &H, user: Address) -> Result<U256, DscError> {
    let info = account_information(host, user)?;
    Ok(health::health_factor(info.total_dsc_minted, info.collateral_value_in_usd))
}

// ========== Internal Steps ==========

/// Run `op` atomically with the reentrancy flag held.
///
/// The flag is cleared on both exit paths before the result is handed back.
fn guarded<H, T, F>(host: &mut H, op: F) -> Result<T, DscError>
where
    H: EngineHost,
    F: FnOnce(&mut H) -> Result<T, DscError>,
{
    host.atomically(|host| {
        if host.is_entered() {
            return Err(DscError::Reentrancy);
        }
        host.set_entered(true);
        let result = op(host);
        host.set_entered(false);
        result
    })
}

fn deposit_unguarded<H: EngineHost>(
    host: &mut H,
    caller: Address,
    asset: Address,
    amount: U256,
) -> Result<(), DscError> {
    more_than_zero(amount)?;
    host.registry().require(asset)?;

    let balance = host.collateral_balance(caller, asset);
    let new_balance = balance.checked_add(amount).ok_or(DscError::ArithmeticOverflow)?;
    host.set_collateral_balance(caller, asset, new_balance);
    host.collateral_deposited(CollateralDeposited {
        user: caller,
        asset,
        amount,
    });

    if !host.pull_collateral(asset, caller, amount) {
        return Err(DscError::TransferFailed);
    }
    Ok(())
}

fn mint_unguarded<H: EngineHost>(host: &mut H, caller: Address, amount: U256) -> Result<(), DscError> {
    more_than_zero(amount)?;

    let debt = host.debt_of(caller);
    let new_debt = debt.checked_add(amount).ok_or(DscError::ArithmeticOverflow)?;
    host.set_debt(caller, new_debt);
    revert_if_health_factor_is_broken(host, caller)?;

    if !host.mint_stablecoin(caller, amount) {
        return Err(DscError::MintFailed);
    }
    Ok(())
}

/// Debit `from`'s deposit and release the collateral to `to`
fn move_collateral<H: EngineHost>(
    host: &mut H,
    asset: Address,
    amount: U256,
    from: Address,
    to: Address,
) -> Result<(), DscError> {
    let balance = host.collateral_balance(from, asset);
    let new_balance = balance
        .checked_sub(amount)
        .ok_or(DscError::InsufficientCollateral)?;
    host.set_collateral_balance(from, asset, new_balance);
    host.collateral_redeemed(CollateralRedeemed {
        from,
        to,
        asset,
        amount,
    });

    if !host.push_collateral(asset, to, amount) {
        return Err(DscError::TransferFailed);
    }
    Ok(())
}

/// Reduce `on_behalf_of`'s debt, paid with stablecoin pulled from `payer`
fn repay_debt<H: EngineHost>(
    host: &mut H,
    amount: U256,
    on_behalf_of: Address,
    payer: Address,
) -> Result<(), DscError> {
    let debt = host.debt_of(on_behalf_of);
    let new_debt = debt.checked_sub(amount).ok_or(DscError::InsufficientDebt)?;
    host.set_debt(on_behalf_of, new_debt);

    if !host.pull_stablecoin(payer, amount) {
        return Err(DscError::TransferFailed);
    }
    host.burn_stablecoin(amount);
    Ok(())
}

fn revert_if_health_factor_is_broken<H: PositionStore + PriceSource>(
    host: &H,
    user: Address,
) -> Result<(), DscError> {
    let factor = health_factor_of(host, user)?;
    if factor < U256::from(MIN_HEALTH_FACTOR) {
        return Err(DscError::HealthFactorBroken(factor));
    }
    Ok(())
}

fn more_than_zero(amount: U256) -> Result<(), DscError> {
    if amount.is_zero() {
        return Err(DscError::AmountMustBeMoreThanZero);
    }
    Ok(())
}
