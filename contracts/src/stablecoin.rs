//! DSC Stablecoin Contract
//!
//! CEP-18 compatible synthetic dollar. Only the owner (the engine, once
//! deployment hands ownership over) can mint and burn.

use odra::prelude::*;
use odra::casper_types::{U256, Key};
use odra::casper_types::bytesrepr::ToBytes;
use crate::errors::DscError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

const TOKEN_NAME: &str = "Decentralized Stable Coin";
const TOKEN_SYMBOL: &str = "DSC";
const TOKEN_DECIMALS: u8 = 18;
const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";

/// DSC Stablecoin Contract
#[odra::module]
pub struct StableCoin {
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Sole minter and burner
    owner: Var<Address>,
}

#[odra::module]
impl StableCoin {
    /// Initialize the stablecoin; the deployer becomes owner
    pub fn init(&mut self) {
        self.total_supply.set(U256::zero());
        self.owner.set(self.env().caller());
        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, String::from(TOKEN_NAME));
        self.env().set_named_value(CEP18_SYMBOL_KEY, String::from(TOKEN_SYMBOL));
        self.env().set_named_value(CEP18_DECIMALS_KEY, TOKEN_DECIMALS);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
    }

    // ========== CEP-18 Standard Functions ==========

    pub fn name(&self) -> String {
        String::from(TOKEN_NAME)
    }

    pub fn symbol(&self) -> String {
        String::from(TOKEN_SYMBOL)
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(DscError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    // ========== Owner Functions ==========

    /// Mint `amount` to `to` (owner only)
    pub fn mint(&mut self, to: Address, amount: U256) -> bool {
        self.require_owner();
        if amount.is_zero() {
            self.env().revert(DscError::AmountMustBeMoreThanZero);
        }

        let new_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_balance);
        self.set_balance_cep18(to, new_balance);

        let new_supply = self.total_supply() + amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
        true
    }

    /// Burn `amount` from the owner's own balance (owner only)
    pub fn burn(&mut self, amount: U256) {
        self.require_owner();
        if amount.is_zero() {
            self.env().revert(DscError::AmountMustBeMoreThanZero);
        }
        let caller = self.env().caller();
        self.burn_from_internal(caller, amount);
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        self.owner.set(new_owner);
    }

    pub fn get_owner(&self) -> Option<Address> {
        self.owner.get()
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(DscError::InsufficientTokenBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let new_to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.set_allowance_cep18(owner, spender, amount);
    }

    fn burn_from_internal(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(DscError::InsufficientTokenBalance);
        }

        let new_balance = current_balance - amount;
        self.balances.set(&from, new_balance);
        self.set_balance_cep18(from, new_balance);

        let new_supply = self.total_supply() - amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = cep18_balance_key(owner);
        self.env().set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn set_allowance_cep18(&self, owner: Address, spender: Address, amount: U256) {
        let key = cep18_allowance_key(owner, spender);
        self.env().set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }

    fn set_total_supply_cep18(&self, amount: U256) {
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, amount);
    }

    fn require_owner(&self) {
        let caller = self.env().caller();
        if self.owner.get() != Some(caller) {
            self.env().revert(DscError::Unauthorized);
        }
    }
}

/// Dictionary item key used by CEP-18 tooling for a balance
pub fn cep18_balance_key(owner: Address) -> String {
    let key = Key::from(owner);
    let bytes = key.to_bytes().unwrap_or_default();
    BASE64_STANDARD.encode(bytes)
}

/// Dictionary item key used by CEP-18 tooling for an allowance
pub fn cep18_allowance_key(owner: Address, spender: Address) -> String {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&Key::from(owner).to_bytes().unwrap_or_default());
    bytes.extend_from_slice(&Key::from(spender).to_bytes().unwrap_or_default());
    BASE64_STANDARD.encode(bytes)
}
