//! Protocol error definitions.

use odra::prelude::*;
use odra::casper_types::U256;

/// Engine, token and oracle errors.
///
/// Every variant maps to a stable numeric code (see [`DscError::code`]) so that
/// reverts stay identifiable on chain.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DscError {
    // Invalid argument errors (1xx)
    AmountMustBeMoreThanZero,
    LengthMismatch,
    DuplicateAsset,

    // Registry errors (2xx)
    UnsupportedAsset,

    // Oracle errors (3xx)
    StalePrice,
    InvalidPrice,

    // Token errors (4xx)
    TransferFailed,
    MintFailed,
    InsufficientTokenBalance,
    InsufficientAllowance,

    // Solvency errors (5xx)
    /// Carries the health factor the rejected state would have had.
    HealthFactorBroken(U256),
    HealthFactorOk,
    HealthFactorNotImproved,
    InsufficientCollateral,
    InsufficientDebt,

    // Execution errors (6xx)
    Reentrancy,
    ArithmeticOverflow,

    // Access control errors (7xx)
    Unauthorized,
}

impl DscError {
    pub const fn code(&self) -> u16 {
        match self {
            DscError::AmountMustBeMoreThanZero => 100,
            DscError::LengthMismatch => 101,
            DscError::DuplicateAsset => 102,

            DscError::UnsupportedAsset => 200,

            DscError::StalePrice => 300,
            DscError::InvalidPrice => 301,

            DscError::TransferFailed => 400,
            DscError::MintFailed => 401,
            DscError::InsufficientTokenBalance => 402,
            DscError::InsufficientAllowance => 403,

            DscError::HealthFactorBroken(_) => 500,
            DscError::HealthFactorOk => 501,
            DscError::HealthFactorNotImproved => 502,
            DscError::InsufficientCollateral => 503,
            DscError::InsufficientDebt => 504,

            DscError::Reentrancy => 600,
            DscError::ArithmeticOverflow => 601,

            DscError::Unauthorized => 700,
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // Invalid argument
            DscError::AmountMustBeMoreThanZero => "Amount must be more than zero",
            DscError::LengthMismatch => "Collateral assets and price feeds must have the same length",
            DscError::DuplicateAsset => "Collateral asset registered twice",

            // Registry
            DscError::UnsupportedAsset => "Collateral asset not supported",

            // Oracle
            DscError::StalePrice => "Oracle price stale",
            DscError::InvalidPrice => "Oracle price invalid",

            // Token
            DscError::TransferFailed => "Token transfer failed",
            DscError::MintFailed => "Stablecoin mint failed",
            DscError::InsufficientTokenBalance => "Insufficient token balance",
            DscError::InsufficientAllowance => "Insufficient token allowance",

            // Solvency
            DscError::HealthFactorBroken(_) => "Health factor below minimum",
            DscError::HealthFactorOk => "Health factor is not below minimum",
            DscError::HealthFactorNotImproved => "Liquidation did not improve health factor",
            DscError::InsufficientCollateral => "Redeem amount exceeds deposited collateral",
            DscError::InsufficientDebt => "Burn amount exceeds minted debt",

            // Execution
            DscError::Reentrancy => "Reentrant call",
            DscError::ArithmeticOverflow => "Arithmetic overflow",

            // Access control
            DscError::Unauthorized => "Unauthorized: caller is not owner",
        }
    }
}

impl core::fmt::Display for DscError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DscError::HealthFactorBroken(factor) => {
                write!(f, "{} (health factor {})", self.message(), factor)
            }
            _ => f.write_str(self.message()),
        }
    }
}

impl From<DscError> for OdraError {
    fn from(error: DscError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error.code())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error.code(), error.message())
        }
    }
}
