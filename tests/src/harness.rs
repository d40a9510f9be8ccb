//! In-memory engine host.
//!
//! Implements every capability trait from `dsc_cdp_contracts::host` over
//! plain maps so the operation gate can be driven without a VM. Token
//! contracts are modelled as balance tables, price feeds as settable
//! quotes, and atomicity as snapshot/restore of the whole host.

use std::collections::BTreeMap;

use dsc_cdp_contracts::errors::DscError;
use dsc_cdp_contracts::events::{CollateralDeposited, CollateralRedeemed};
use dsc_cdp_contracts::host::{
    Atomic, CollateralCustody, DebtToken, EngineEvents, PositionStore, PriceSource, ReentrancyFlag,
};
use dsc_cdp_contracts::operations;
use dsc_cdp_contracts::registry::CollateralRegistry;
use dsc_cdp_contracts::types::PriceQuote;
use odra::casper_types::account::AccountHash;
use odra::casper_types::U256;
use odra::prelude::*;

/// Block time the host starts at (ms)
pub const GENESIS_TIME: u64 = 1_700_000_000_000;

pub fn account(seed: u8) -> Address {
    Address::Account(AccountHash::new([seed; 32]))
}

/// `whole` units of a token with `decimals` decimals
pub fn units(whole: u64, decimals: u8) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(decimals))
}

pub fn dsc(whole: u64) -> U256 {
    units(whole, 18)
}

/// Event as observed by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    Deposited {
        user: Address,
        asset: Address,
        amount: U256,
    },
    Redeemed {
        from: Address,
        to: Address,
        asset: Address,
        amount: U256,
    },
}

/// Token call that can be made to fail
#[derive(Clone, Copy, Debug, Default)]
pub struct Faults {
    pub collateral_pull: bool,
    pub collateral_push: bool,
    pub stablecoin_mint: bool,
    pub stablecoin_pull: bool,
}

/// Token callback on which a re-entrant call is attempted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    CollateralPull,
    CollateralPush,
}

/// Engine call attempted from inside a token callback
#[derive(Clone, Copy, Debug)]
pub enum Reentry {
    Deposit { caller: Address, asset: Address, amount: U256 },
    Redeem { caller: Address, asset: Address, amount: U256 },
    Mint { caller: Address, amount: U256 },
}

/// What a re-entrant call saw and got back
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReentryObservation {
    pub result: Result<(), DscError>,
    /// Ledger collateral of the attacker at callback time
    pub collateral_balance: U256,
    /// Ledger debt of the attacker at callback time
    pub debt: U256,
}

#[derive(Clone)]
pub struct MemoryHost {
    custody: Address,
    registry: CollateralRegistry,
    collateral: BTreeMap<(Address, Address), U256>,
    debt: BTreeMap<Address, U256>,
    quotes: BTreeMap<Address, PriceQuote>,
    now: u64,
    /// (token, holder) -> balance for collateral tokens
    token_balances: BTreeMap<(Address, Address), U256>,
    dsc_balances: BTreeMap<Address, U256>,
    dsc_supply: U256,
    entered: bool,
    events: Vec<RecordedEvent>,
    faults: Faults,
    reentry: Option<(Hook, Reentry)>,
    reentry_log: Vec<ReentryObservation>,
}

impl MemoryHost {
    /// Host with `(asset, price_feed, decimals)` registered in order
    pub fn new(custody: Address, collateral: &[(Address, Address, u8)]) -> Result<Self, DscError> {
        let assets = collateral.iter().map(|(asset, _, _)| *asset).collect();
        let feeds = collateral.iter().map(|(_, feed, _)| *feed).collect();
        let registry = CollateralRegistry::new(assets, feeds, |asset| {
            collateral
                .iter()
                .find(|(candidate, _, _)| *candidate == asset)
                .map(|(_, _, decimals)| *decimals)
                .unwrap_or(18)
        })?;

        Ok(Self {
            custody,
            registry,
            collateral: BTreeMap::new(),
            debt: BTreeMap::new(),
            quotes: BTreeMap::new(),
            now: GENESIS_TIME,
            token_balances: BTreeMap::new(),
            dsc_balances: BTreeMap::new(),
            dsc_supply: U256::zero(),
            entered: false,
            events: Vec::new(),
            faults: Faults::default(),
            reentry: None,
            reentry_log: Vec::new(),
        })
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    // ========== Price Feeds ==========

    /// Publish `price` (scaled by 10^decimals) on `feed` at the current time
    pub fn set_price(&mut self, feed: Address, price: U256, decimals: u8) {
        let round = self.quotes.get(&feed).map(|quote| quote.round).unwrap_or(0) + 1;
        self.quotes.insert(
            feed,
            PriceQuote {
                price,
                decimals,
                updated_at: self.now,
                round,
            },
        );
    }

    /// Publish a whole-dollar price with 8 feed decimals
    pub fn set_usd_price(&mut self, feed: Address, dollars: u64) {
        self.set_price(feed, units(dollars, 8), 8);
    }

    pub fn advance_time(&mut self, ms: u64) {
        self.now += ms;
    }

    // ========== Ledger ==========

    pub fn collateral_balance_of(&self, user: Address, asset: Address) -> U256 {
        self.collateral_balance(user, asset)
    }

    /// Stablecoin debt recorded for `user`
    pub fn minted(&self, user: Address) -> U256 {
        self.debt_of(user)
    }

    // ========== Token Balances ==========

    /// Credit `amount` of collateral token `asset` to `holder` out of thin air
    pub fn faucet(&mut self, asset: Address, holder: Address, amount: U256) {
        let balance = self.token_balance(asset, holder);
        self.token_balances.insert((asset, holder), balance + amount);
    }

    pub fn token_balance(&self, asset: Address, holder: Address) -> U256 {
        self.token_balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or_default()
    }

    pub fn dsc_balance(&self, holder: Address) -> U256 {
        self.dsc_balances.get(&holder).copied().unwrap_or_default()
    }

    pub fn dsc_supply(&self) -> U256 {
        self.dsc_supply
    }

    /// Plain stablecoin transfer between holders, outside the engine
    pub fn transfer_dsc(&mut self, from: Address, to: Address, amount: U256) -> bool {
        move_balance(&mut self.dsc_balances, from, to, amount)
    }

    // ========== Test Controls ==========

    pub fn faults_mut(&mut self) -> &mut Faults {
        &mut self.faults
    }

    /// Attempt `call` the next time `hook` fires
    pub fn arm_reentry(&mut self, hook: Hook, call: Reentry) {
        self.reentry = Some((hook, call));
    }

    pub fn reentry_log(&self) -> &[ReentryObservation] {
        &self.reentry_log
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn is_locked(&self) -> bool {
        self.entered
    }

    /// Sum of every user's ledger balance for `asset`
    pub fn total_deposited(&self, asset: Address) -> U256 {
        self.collateral
            .iter()
            .filter(|((_, deposited_asset), _)| *deposited_asset == asset)
            .fold(U256::zero(), |total, (_, amount)| total + *amount)
    }

    pub fn total_debt(&self) -> U256 {
        self.debt.values().fold(U256::zero(), |total, amount| total + *amount)
    }

    fn fire(&mut self, hook: Hook) {
        let armed = match self.reentry {
            Some((armed_hook, call)) if armed_hook == hook => call,
            _ => return,
        };
        self.reentry = None;

        let (attacker, asset, result) = match armed {
            Reentry::Deposit { caller, asset, amount } => (
                caller,
                Some(asset),
                operations::deposit_collateral(self, caller, asset, amount),
            ),
            Reentry::Redeem { caller, asset, amount } => (
                caller,
                Some(asset),
                operations::redeem_collateral(self, caller, asset, amount),
            ),
            Reentry::Mint { caller, amount } => {
                (caller, None, operations::mint_dsc(self, caller, amount))
            }
        };

        let collateral_balance = asset
            .map(|asset| self.collateral_balance(attacker, asset))
            .unwrap_or_default();
        let observation = ReentryObservation {
            result,
            collateral_balance,
            debt: self.debt_of(attacker),
        };
        self.reentry_log.push(observation);
    }
}

fn move_balance<K: Ord + Copy>(
    balances: &mut BTreeMap<K, U256>,
    from: K,
    to: K,
    amount: U256,
) -> bool {
    let from_balance = balances.get(&from).copied().unwrap_or_default();
    if from_balance < amount {
        return false;
    }
    balances.insert(from, from_balance - amount);
    let to_balance = balances.get(&to).copied().unwrap_or_default();
    balances.insert(to, to_balance + amount);
    true
}

impl PositionStore for MemoryHost {
    fn registry(&self) -> CollateralRegistry {
        self.registry.clone()
    }

    fn collateral_balance(&self, user: Address, asset: Address) -> U256 {
        self.collateral.get(&(user, asset)).copied().unwrap_or_default()
    }

    fn set_collateral_balance(&mut self, user: Address, asset: Address, amount: U256) {
        self.collateral.insert((user, asset), amount);
    }

    fn debt_of(&self, user: Address) -> U256 {
        self.debt.get(&user).copied().unwrap_or_default()
    }

    fn set_debt(&mut self, user: Address, amount: U256) {
        self.debt.insert(user, amount);
    }
}

impl PriceSource for MemoryHost {
    fn price_quote(&self, price_feed: Address) -> Result<PriceQuote, DscError> {
        // An unpublished feed reads as never updated
        Ok(self.quotes.get(&price_feed).cloned().unwrap_or(PriceQuote {
            price: U256::zero(),
            decimals: 8,
            updated_at: 0,
            round: 0,
        }))
    }

    fn block_time(&self) -> u64 {
        self.now
    }
}

impl CollateralCustody for MemoryHost {
    fn pull_collateral(&mut self, asset: Address, from: Address, amount: U256) -> bool {
        self.fire(Hook::CollateralPull);
        if self.faults.collateral_pull {
            return false;
        }
        let custody = self.custody;
        move_token(&mut self.token_balances, asset, from, custody, amount)
    }

    fn push_collateral(&mut self, asset: Address, to: Address, amount: U256) -> bool {
        self.fire(Hook::CollateralPush);
        if self.faults.collateral_push {
            return false;
        }
        let custody = self.custody;
        move_token(&mut self.token_balances, asset, custody, to, amount)
    }
}

fn move_token(
    balances: &mut BTreeMap<(Address, Address), U256>,
    asset: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> bool {
    move_balance(balances, (asset, from), (asset, to), amount)
}

impl DebtToken for MemoryHost {
    fn mint_stablecoin(&mut self, to: Address, amount: U256) -> bool {
        if self.faults.stablecoin_mint {
            return false;
        }
        let balance = self.dsc_balance(to);
        self.dsc_balances.insert(to, balance + amount);
        self.dsc_supply = self.dsc_supply + amount;
        true
    }

    fn pull_stablecoin(&mut self, from: Address, amount: U256) -> bool {
        if self.faults.stablecoin_pull {
            return false;
        }
        let custody = self.custody;
        move_balance(&mut self.dsc_balances, from, custody, amount)
    }

    fn burn_stablecoin(&mut self, amount: U256) {
        let custody = self.custody;
        let balance = self.dsc_balance(custody);
        self.dsc_balances.insert(custody, balance.saturating_sub(amount));
        self.dsc_supply = self.dsc_supply.saturating_sub(amount);
    }
}

impl EngineEvents for MemoryHost {
    fn collateral_deposited(&mut self, event: CollateralDeposited) {
        self.events.push(RecordedEvent::Deposited {
            user: event.user,
            asset: event.asset,
            amount: event.amount,
        });
    }

    fn collateral_redeemed(&mut self, event: CollateralRedeemed) {
        self.events.push(RecordedEvent::Redeemed {
            from: event.from,
            to: event.to,
            asset: event.asset,
            amount: event.amount,
        });
    }
}

impl ReentrancyFlag for MemoryHost {
    fn is_entered(&self) -> bool {
        self.entered
    }

    fn set_entered(&mut self, entered: bool) {
        self.entered = entered;
    }
}

impl Atomic for MemoryHost {
    fn atomically<T, F>(&mut self, op: F) -> Result<T, DscError>
    where
        F: FnOnce(&mut Self) -> Result<T, DscError>,
    {
        let snapshot = self.clone();
        let result = op(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}
