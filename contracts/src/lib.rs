//! DSC-CDP Contracts
//!
//! Overcollateralized synthetic-dollar engine on Casper.
//!
//! ## Architecture
//!
//! - **DscEngine**: Collateral custody, debt accounting, liquidation
//! - **StableCoin (DSC)**: CEP-18 synthetic dollar, mint/burn owned by the engine
//! - **PriceFeed**: Per-asset USD price feed read by the engine
//!
//! ## Core (environment independent)
//!
//! - **registry**: Immutable asset ↔ feed ↔ decimals bindings
//! - **pricing**: Staleness check and USD ⇄ asset conversion
//! - **health**: Solvency parameters and the health factor
//! - **operations**: Deposit / mint / redeem / burn / liquidate over [`host`] traits
//!
//! ## Solvency
//!
//! Every position must keep `health_factor >= 1e18`, i.e. collateral worth at
//! least twice its debt. Positions below that can be liquidated for a 10% bonus.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod events;
pub mod registry;
pub mod pricing;
pub mod health;
pub mod host;
pub mod operations;

// Contract modules
pub mod engine;
pub mod stablecoin;
pub mod price_feed;
