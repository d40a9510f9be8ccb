//! Collateral registry: asset ↔ price feed ↔ decimals bindings.
//!
//! Built once when the engine is initialized and never mutated afterwards.

use odra::prelude::*;
use crate::errors::DscError;
use crate::types::CollateralBinding;

/// Ordered, immutable set of supported collateral assets
#[odra::odra_type]
pub struct CollateralRegistry {
    bindings: Vec<CollateralBinding>,
}

impl CollateralRegistry {
    /// Bind `assets[i]` to `price_feeds[i]`.
    ///
    /// Lengths are validated before `decimals_of` is consulted, so a malformed
    /// configuration never triggers external reads.
    pub fn new<F>(
        assets: Vec<Address>,
        price_feeds: Vec<Address>,
        mut decimals_of: F,
    ) -> Result<Self, DscError>
    where
        F: FnMut(Address) -> u8,
    {
        if assets.len() != price_feeds.len() {
            return Err(DscError::LengthMismatch);
        }

        for (index, asset) in assets.iter().enumerate() {
            if assets[..index].contains(asset) {
                return Err(DscError::DuplicateAsset);
            }
        }

        let bindings = assets
            .into_iter()
            .zip(price_feeds)
            .map(|(asset, price_feed)| CollateralBinding {
                asset,
                price_feed,
                decimals: decimals_of(asset),
            })
            .collect();

        Ok(Self { bindings })
    }

    /// Binding for `asset`, if registered
    pub fn binding(&self, asset: Address) -> Option<&CollateralBinding> {
        self.bindings.iter().find(|binding| binding.asset == asset)
    }

    /// Binding for `asset` or `UnsupportedAsset`
    pub fn require(&self, asset: Address) -> Result<&CollateralBinding, DscError> {
        self.binding(asset).ok_or(DscError::UnsupportedAsset)
    }

    pub fn price_feed_of(&self, asset: Address) -> Option<Address> {
        self.binding(asset).map(|binding| binding.price_feed)
    }

    pub fn decimals_of(&self, asset: Address) -> Option<u8> {
        self.binding(asset).map(|binding| binding.decimals)
    }

    pub fn is_supported(&self, asset: Address) -> bool {
        self.binding(asset).is_some()
    }

    /// Registered assets in registration order
    pub fn assets(&self) -> Vec<Address> {
        self.bindings.iter().map(|binding| binding.asset).collect()
    }

    pub fn bindings(&self) -> &[CollateralBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
