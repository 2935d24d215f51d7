//! Slippage tolerance bounds for state-changing calls
//!
//! Every swap, deposit and withdrawal submits a minimum acceptable amount
//! derived here. The scaling keeps the deployed front-end's exact operation
//! order (`quoted * floor((100 - pct) * 1000) / 100000`) so minimums stay
//! reproducible against transactions already settled with those bounds.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::AmmError;

/// Denominator of the scaled tolerance multiplier (percent * 1000).
pub const TOLERANCE_SCALE: u64 = 100_000;

/// Minimum-amount constraint attached to a pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageBound {
    /// Floor the counterparty call must clear, raw smallest units.
    pub minimum_acceptable: U256,
    /// Tolerance this bound was derived from, in basis points.
    pub tolerance_bps: u32,
}

/// Derives minimum-amount bounds from quotes and a percent tolerance.
pub struct SlippageGuard;

impl SlippageGuard {
    /// Lowest acceptable amount for a quoted value at a given tolerance.
    ///
    /// `tolerance_pct` is a percentage (0.5 means 0.5%). Valid range is
    /// `0 <= pct < 100`; anything else is `InvalidTolerance`. A zero
    /// tolerance returns the quote unchanged.
    pub fn minimum_amount(quoted: U256, tolerance_pct: f64) -> Result<U256, AmmError> {
        let multiplier = Self::scaled_multiplier(tolerance_pct)?;
        let minimum = quoted
            .checked_mul(multiplier)
            .ok_or(AmmError::AmountOverflow { operation: "slippage minimum" })?
            / U256::from(TOLERANCE_SCALE);
        Ok(minimum)
    }

    /// Bound carrying both the minimum and the tolerance it encodes.
    pub fn bound(quoted: U256, tolerance_pct: f64) -> Result<SlippageBound, AmmError> {
        let minimum_acceptable = Self::minimum_amount(quoted, tolerance_pct)?;
        Ok(SlippageBound {
            minimum_acceptable,
            tolerance_bps: (tolerance_pct * 100.0).round() as u32,
        })
    }

    /// Integer multiplier `floor((100 - pct) * 1000)`.
    ///
    /// The float product happens before the floor, exactly as the deployed
    /// client computes it; for tolerances expressible in whole basis points
    /// the product is exact and no drift enters.
    fn scaled_multiplier(tolerance_pct: f64) -> Result<U256, AmmError> {
        if !tolerance_pct.is_finite() || tolerance_pct < 0.0 || tolerance_pct >= 100.0 {
            return Err(AmmError::InvalidTolerance { pct: tolerance_pct });
        }
        Ok(U256::from(((100.0 - tolerance_pct) * 1000.0).floor() as u64))
    }
}
