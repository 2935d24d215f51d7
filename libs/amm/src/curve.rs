//! Constant-product curve sampling and pool projections
//!
//! Produces the `y = k/x` sample series the pool chart draws and the
//! before/after reserve projections shown when previewing a deposit or
//! withdrawal. Everything here is display math in f64; submitted amounts
//! never come from this module.

use ethereum_types::U256;

use crate::units::to_display;

/// Default number of samples along the curve.
pub const DEFAULT_SAMPLES: usize = 200;

/// Default plot range as a multiple of the current reserve.
pub const DEFAULT_RANGE_SCALE: f64 = 1.5;

/// One point of the x*y=k plot, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Reserve state before and after a previewed liquidity change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolProjection {
    pub reserve_a: f64,
    pub reserve_b: f64,
    pub k_before: f64,
    pub k_after: f64,
    /// Percent growth (or shrink) of the invariant.
    pub k_change_pct: f64,
}

/// Sample the constant-product curve through the current reserve point.
///
/// Samples run from one step above zero to `range_scale` times the A-side
/// reserve; the live reserve point itself sits on the returned curve.
/// Empty pools produce an empty series.
pub fn sample_curve(
    reserve_a: U256,
    reserve_b: U256,
    decimals_a: u8,
    decimals_b: u8,
    samples: usize,
    range_scale: f64,
) -> Vec<CurvePoint> {
    let ra = to_display(reserve_a, decimals_a);
    let rb = to_display(reserve_b, decimals_b);
    if ra <= 0.0 || rb <= 0.0 || !ra.is_finite() || !rb.is_finite() || samples == 0 {
        return Vec::new();
    }

    let k = ra * rb;
    let max_x = ra * range_scale;
    let step = max_x / samples as f64;
    (1..=samples)
        .map(|i| {
            let x = step * i as f64;
            CurvePoint { x, y: k / x }
        })
        .collect()
}

/// Projected reserves after depositing both tokens at once.
pub fn project_deposit(
    reserve_a: U256,
    reserve_b: U256,
    deposit_a: U256,
    deposit_b: U256,
    decimals_a: u8,
    decimals_b: u8,
) -> PoolProjection {
    let ra = to_display(reserve_a, decimals_a);
    let rb = to_display(reserve_b, decimals_b);
    let new_a = ra + to_display(deposit_a, decimals_a);
    let new_b = rb + to_display(deposit_b, decimals_b);
    projection(ra, rb, new_a, new_b)
}

/// Projected reserves after burning `lp_amount` out of `total_supply`.
///
/// A zero total supply projects no change; the empty-pool case is guarded
/// by the caller's withdrawal math.
pub fn project_withdrawal(
    reserve_a: U256,
    reserve_b: U256,
    lp_amount: U256,
    total_supply: U256,
    decimals_a: u8,
    decimals_b: u8,
) -> PoolProjection {
    let ra = to_display(reserve_a, decimals_a);
    let rb = to_display(reserve_b, decimals_b);
    if total_supply.is_zero() {
        return projection(ra, rb, ra, rb);
    }
    let fraction = to_display(lp_amount, 0) / to_display(total_supply, 0);
    let fraction = fraction.clamp(0.0, 1.0);
    projection(ra, rb, ra * (1.0 - fraction), rb * (1.0 - fraction))
}

fn projection(ra: f64, rb: f64, new_a: f64, new_b: f64) -> PoolProjection {
    let k_before = ra * rb;
    let k_after = new_a * new_b;
    let k_change_pct = if k_before > 0.0 {
        (k_after - k_before) / k_before * 100.0
    } else {
        0.0
    };
    PoolProjection {
        reserve_a: new_a,
        reserve_b: new_b,
        k_before,
        k_after,
        k_change_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    #[test]
    fn curve_passes_through_live_reserves() {
        let points = sample_curve(units(1000), units(500), 18, 18, DEFAULT_SAMPLES, DEFAULT_RANGE_SCALE);
        assert_eq!(points.len(), DEFAULT_SAMPLES);

        // k = 500000; at x = 1000 the curve must read y = 500.
        let k = 1000.0 * 500.0;
        let nearest = points
            .iter()
            .min_by(|a, b| {
                (a.x - 1000.0).abs().partial_cmp(&(b.x - 1000.0).abs()).unwrap()
            })
            .unwrap();
        assert!((nearest.x * nearest.y - k).abs() / k < 1e-9);

        // Range extends 1.5x past the live point.
        assert!((points.last().unwrap().x - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn curve_is_monotone_decreasing() {
        let points = sample_curve(units(1000), units(500), 18, 18, 50, 1.5);
        for pair in points.windows(2) {
            assert!(pair[1].y < pair[0].y);
        }
    }

    #[test]
    fn empty_pool_yields_no_curve() {
        assert!(sample_curve(U256::zero(), units(500), 18, 18, 200, 1.5).is_empty());
        assert!(sample_curve(units(1000), units(500), 18, 18, 0, 1.5).is_empty());
    }

    #[test]
    fn deposit_projection_grows_k() {
        let p = project_deposit(units(1000), units(500), units(100), units(50), 18, 18);
        assert!((p.reserve_a - 1100.0).abs() < 1e-9);
        assert!((p.reserve_b - 550.0).abs() < 1e-9);
        assert!(p.k_after > p.k_before);
        // (1100*550 - 500000)/500000 = 21%
        assert!((p.k_change_pct - 21.0).abs() < 1e-9);
    }

    #[test]
    fn withdrawal_projection_shrinks_proportionally() {
        let p = project_withdrawal(units(1000), units(500), units(25), units(100), 18, 18);
        assert!((p.reserve_a - 750.0).abs() < 1e-9);
        assert!((p.reserve_b - 375.0).abs() < 1e-9);
        assert!(p.k_change_pct < 0.0);
    }
}
