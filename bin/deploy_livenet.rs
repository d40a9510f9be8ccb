//! Deploy the DSC engine to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Optional:
//!   DSC_COLLATERAL_MANIFEST=deploy/collateral.json
//!   DSC_PRICE_FEEDER=account-hash-... (takes over feeds deployed here)

use std::str::FromStr;

use odra::casper_types::U256;
use odra::host::{Deployer, NoArgs};
use odra::prelude::*;
use serde::Deserialize;

use dsc_cdp_contracts::engine::{DscEngine, DscEngineInitArgs};
use dsc_cdp_contracts::price_feed::{PriceFeed, PriceFeedInitArgs};
use dsc_cdp_contracts::stablecoin::StableCoin;

const DEFAULT_MANIFEST: &str = "deploy/collateral.json";

/// Collateral to register, in registration order
#[derive(Debug, Deserialize)]
struct Manifest {
    collateral: Vec<CollateralEntry>,
}

#[derive(Debug, Deserialize)]
struct CollateralEntry {
    symbol: String,
    /// CEP-18 token contract, e.g. "hash-..."
    token: String,
    /// Existing feed; when absent a new `PriceFeed` is deployed
    price_feed: Option<String>,
    feed_decimals: Option<u8>,
    /// Decimal string scaled by 10^feed_decimals
    initial_price: Option<String>,
}

/// Feed to deploy for an entry without `price_feed`
struct NewFeed {
    description: String,
    decimals: u8,
    initial_price: U256,
}

enum FeedSource {
    Existing(Address),
    Deploy(NewFeed),
}

struct Collateral {
    symbol: String,
    token: Address,
    feed: FeedSource,
}

fn parse_address(value: &str) -> Result<Address, String> {
    Address::from_str(value).map_err(|e| format!("invalid address {value}: {e:?}"))
}

fn load_manifest(path: &str) -> Result<Vec<Collateral>, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let manifest: Manifest = serde_json::from_str(&raw).map_err(|e| format!("invalid manifest {path}: {e}"))?;
    if manifest.collateral.is_empty() {
        return Err(format!("{path} lists no collateral"));
    }

    manifest
        .collateral
        .into_iter()
        .map(|entry| {
            let token = parse_address(&entry.token)?;
            let feed = match (entry.price_feed, entry.feed_decimals, entry.initial_price) {
                (Some(feed), _, _) => FeedSource::Existing(parse_address(&feed)?),
                (None, Some(decimals), Some(price)) => {
                    let initial_price = U256::from_dec_str(&price)
                        .map_err(|e| format!("{}: invalid initial_price: {e:?}", entry.symbol))?;
                    FeedSource::Deploy(NewFeed {
                        description: format!("{} / USD", entry.symbol),
                        decimals,
                        initial_price,
                    })
                }
                _ => {
                    return Err(format!(
                        "{}: needs price_feed or feed_decimals + initial_price",
                        entry.symbol
                    ))
                }
            };
            Ok(Collateral {
                symbol: entry.symbol,
                token,
                feed,
            })
        })
        .collect()
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== DSC Livenet Deployment ===");
    println!();

    let manifest_path =
        std::env::var("DSC_COLLATERAL_MANIFEST").unwrap_or_else(|_| DEFAULT_MANIFEST.to_string());
    let collateral = match load_manifest(&manifest_path) {
        Ok(collateral) => collateral,
        Err(message) => {
            eprintln!("Manifest error: {message}");
            std::process::exit(1);
        }
    };
    let feeder = match std::env::var("DSC_PRICE_FEEDER").ok().map(|v| parse_address(&v)) {
        Some(Ok(feeder)) => Some(feeder),
        Some(Err(message)) => {
            eprintln!("DSC_PRICE_FEEDER: {message}");
            std::process::exit(1);
        }
        None => None,
    };
    println!("Collateral manifest: {} ({} assets)", manifest_path, collateral.len());

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    // Get deployer address
    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // ==================== Phase 1: Price Feeds ====================
    println!("=== Phase 1: Price Feeds ===");
    println!();

    let mut collateral_assets = Vec::new();
    let mut price_feeds = Vec::new();
    for entry in collateral {
        let feed_addr = match entry.feed {
            FeedSource::Existing(address) => {
                println!("{}: using existing feed {:?}", entry.symbol, address);
                address
            }
            FeedSource::Deploy(feed) => {
                println!("Deploying PriceFeed for {}...", entry.symbol);
                let mut price_feed = PriceFeed::deploy(
                    &env,
                    PriceFeedInitArgs {
                        description: feed.description,
                        decimals: feed.decimals,
                        initial_price: feed.initial_price,
                    },
                );
                let address = price_feed.address().clone();
                println!("PriceFeed deployed at: {:?}", address);
                if let Some(feeder) = feeder {
                    price_feed.transfer_ownership(feeder);
                    println!("Feed ownership moved to {:?}", feeder);
                }
                address
            }
        };
        collateral_assets.push(entry.token);
        price_feeds.push(feed_addr);
    }

    println!();

    // ==================== Phase 2: Stablecoin and Engine ====================
    println!("=== Phase 2: Stablecoin and Engine ===");
    println!();

    println!("Deploying StableCoin (DSC)...");
    let mut stablecoin = StableCoin::deploy(&env, NoArgs);
    let stablecoin_addr = stablecoin.address().clone();
    println!("StableCoin deployed at: {:?}", stablecoin_addr);

    println!("Deploying DscEngine...");
    let engine = DscEngine::deploy(
        &env,
        DscEngineInitArgs {
            collateral_assets: collateral_assets.clone(),
            price_feeds: price_feeds.clone(),
            stablecoin: stablecoin_addr,
        },
    );
    let engine_addr = engine.address().clone();
    println!("DscEngine deployed at: {:?}", engine_addr);

    println!();

    // ==================== Phase 3: Hand Over Minting ====================
    println!("=== Phase 3: Hand Over Minting ===");
    println!();

    println!("Transferring StableCoin ownership to DscEngine...");
    stablecoin.transfer_ownership(engine_addr);
    println!("Done.");

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  StableCoin:  {:?}", stablecoin_addr);
    println!("  DscEngine:   {:?}", engine_addr);
    for (asset, feed) in collateral_assets.iter().zip(price_feeds.iter()) {
        println!("  Collateral:  {:?} priced by {:?}", asset, feed);
    }
}
