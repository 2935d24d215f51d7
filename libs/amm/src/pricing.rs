//! Constant-product swap quoting with exact on-chain arithmetic
//!
//! All amount math runs in `U256` with floor division so that locally
//! computed quotes match what the pair contract settles, bit for bit.
//! Percentages produced for display use `Decimal` and never feed back
//! into submitted amounts.

use ethereum_types::U256;
use rust_decimal::Decimal;

use crate::error::AmmError;

/// Fee denominator in basis points (30 = 0.3%).
pub const FEE_DENOMINATOR_BPS: u32 = 10_000;

/// Fixed-point scale used for intermediate price ratios.
const PRICE_SCALE: u64 = 1_000_000_000_000_000_000;

/// Swap preview computed from a fresh reserve snapshot.
///
/// Recomputed on every input or reserve change; holding one across a
/// reserve update produces stale minimums downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub amount_in: U256,
    pub amount_out: U256,
    /// Display-only pool price shift, clamped to >= 0.
    pub price_impact_pct: Decimal,
}

/// Constant-product (x*y=k) quoting functions
pub struct PricingEngine;

impl PricingEngine {
    /// Compute the exact output amount for a swap against V2 reserves.
    ///
    /// Uses the single-final-division form of the fee-adjusted formula:
    ///
    /// ```text
    /// out = (in * (10000 - fee_bps) * reserve_out)
    ///       / (reserve_in * 10000 + in * (10000 - fee_bps))
    /// ```
    ///
    /// which is value-identical to the canonical 997/1000 router
    /// computation at 30 bps and truncates exactly once, like the pair
    /// contract does.
    ///
    /// # Arguments
    /// * `reserve_in` - reserve of the token being sold, raw smallest units
    /// * `reserve_out` - reserve of the token being bought, raw smallest units
    /// * `amount_in` - input amount, raw smallest units
    /// * `fee_bps` - pool fee in basis points (30 = 0.3%)
    pub fn quote_output(
        reserve_in: U256,
        reserve_out: U256,
        amount_in: U256,
        fee_bps: u32,
    ) -> Result<U256, AmmError> {
        if fee_bps >= FEE_DENOMINATOR_BPS {
            return Err(AmmError::InvalidFee { bps: fee_bps });
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::NoLiquidity);
        }
        if amount_in.is_zero() {
            return Ok(U256::zero());
        }

        let fee_factor = U256::from(FEE_DENOMINATOR_BPS - fee_bps);
        let amount_in_with_fee = amount_in
            .checked_mul(fee_factor)
            .ok_or(AmmError::AmountOverflow { operation: "fee adjustment" })?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out)
            .ok_or(AmmError::AmountOverflow { operation: "quote numerator" })?;
        let denominator = reserve_in
            .checked_mul(U256::from(FEE_DENOMINATOR_BPS))
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(AmmError::AmountOverflow { operation: "quote denominator" })?;

        // denominator > 0 because reserve_in > 0
        Ok(numerator / denominator)
    }

    /// Full swap preview: output amount plus display price impact.
    pub fn quote(
        reserve_in: U256,
        reserve_out: U256,
        amount_in: U256,
        fee_bps: u32,
    ) -> Result<Quote, AmmError> {
        let amount_out = Self::quote_output(reserve_in, reserve_out, amount_in, fee_bps)?;
        let price_impact_pct =
            Self::price_impact_pct(reserve_in, reserve_out, amount_in, amount_out)?;
        Ok(Quote { amount_in, amount_out, price_impact_pct })
    }

    /// Pool price shift caused by a trade, as a percentage.
    ///
    /// Compares the marginal price before the trade with the marginal
    /// price after reserves absorb it:
    ///
    /// ```text
    /// impact = (p_before - p_after) / p_before * 100
    /// p_before = reserve_out / reserve_in
    /// p_after  = (reserve_out - out) / (reserve_in + in)
    /// ```
    ///
    /// Ratios are carried in 1e18 fixed point to stay inside integer
    /// arithmetic; the result is clamped at zero (rounding can nudge a
    /// dust trade's impact fractionally negative).
    pub fn price_impact_pct(
        reserve_in: U256,
        reserve_out: U256,
        amount_in: U256,
        amount_out: U256,
    ) -> Result<Decimal, AmmError> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::NoLiquidity);
        }
        if amount_in.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let scale = U256::from(PRICE_SCALE);
        let price_before = reserve_out
            .checked_mul(scale)
            .ok_or(AmmError::AmountOverflow { operation: "price before" })?
            / reserve_in;
        if price_before.is_zero() {
            // Pool so lopsided the scaled ratio floors to zero; impact is
            // meaningless for display, report none.
            return Ok(Decimal::ZERO);
        }

        let reserve_out_after = reserve_out.saturating_sub(amount_out);
        let reserve_in_after = reserve_in
            .checked_add(amount_in)
            .ok_or(AmmError::AmountOverflow { operation: "price after" })?;
        let price_after = reserve_out_after
            .checked_mul(scale)
            .ok_or(AmmError::AmountOverflow { operation: "price after" })?
            / reserve_in_after;

        if price_after >= price_before {
            return Ok(Decimal::ZERO);
        }

        // percent scaled by 1e4, i.e. four decimal places of display precision
        let impact_scaled = (price_before - price_after)
            .checked_mul(U256::from(1_000_000u64))
            .ok_or(AmmError::AmountOverflow { operation: "price impact" })?
            / price_before;
        Ok(Decimal::new(impact_scaled.as_u64() as i64, 4))
    }

    /// Average execution rate of a fill (`amount_out / amount_in`) in
    /// display units. Returns `None` for empty fills or unrepresentable
    /// magnitudes; display-only.
    pub fn execution_rate(
        amount_in: U256,
        amount_out: U256,
        decimals_in: u8,
        decimals_out: u8,
    ) -> Option<f64> {
        if amount_in.is_zero() {
            return None;
        }
        let rate = crate::units::to_display(amount_out, decimals_out)
            / crate::units::to_display(amount_in, decimals_in);
        rate.is_finite().then_some(rate)
    }
}
