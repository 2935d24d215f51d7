//! Error types for AMM math
//!
//! Every failure mode callers are expected to branch on gets its own
//! variant; display strings are written to be shown to end users verbatim.

use ethereum_types::U256;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmmError {
    /// Pool has empty reserves (or does not exist yet).
    #[error("No liquidity available for this pair")]
    NoLiquidity,

    /// Slippage tolerance outside the permitted `[0, 100)` percent range.
    #[error("Invalid slippage tolerance {pct}%: must be at least 0 and below 100")]
    InvalidTolerance { pct: f64 },

    /// LP amount outside `(0, total_supply]`.
    #[error("Invalid LP amount {requested}: pool total supply is {total_supply}")]
    InvalidLpAmount { requested: U256, total_supply: U256 },

    /// Fee must stay below the 10000 basis-point denominator.
    #[error("Invalid fee of {bps} basis points")]
    InvalidFee { bps: u32 },

    /// Intermediate product exceeded 256 bits.
    #[error("Amount overflow while computing {operation}")]
    AmountOverflow { operation: &'static str },

    /// Malformed decimal amount string.
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
}
