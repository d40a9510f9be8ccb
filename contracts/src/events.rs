//! Engine events.

use odra::prelude::*;
use odra::casper_types::U256;

/// Collateral moved into custody for `user`
#[odra::event]
pub struct CollateralDeposited {
    pub user: Address,
    pub asset: Address,
    pub amount: U256,
}

/// Collateral released from `from`'s position to `to`.
///
/// `from` and `to` differ only for liquidations.
#[odra::event]
pub struct CollateralRedeemed {
    pub from: Address,
    pub to: Address,
    pub asset: Address,
    pub amount: U256,
}
