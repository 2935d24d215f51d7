//! Deposit ratio and withdrawal share math
//!
//! Covers the two liquidity-side calculations the pool contract expects
//! callers to pre-compute: the counterpart amount that keeps a deposit on
//! the current reserve ratio, and the proportional amounts a burn of LP
//! tokens redeems. Floor division throughout, matching contract settlement.

use ethereum_types::U256;
use rust_decimal::Decimal;

use crate::error::AmmError;

/// Pool-ratio math for adding and removing liquidity
pub struct LiquidityMath;

impl LiquidityMath {
    /// Counterpart amount that matches `amount_a` at the pool's current
    /// ratio: `amount_a * reserve_b / reserve_a`.
    ///
    /// An empty `reserve_a` means the pool has no ratio yet; the first
    /// deposit picks its own and callers must branch before asking.
    pub fn optimal_paired_amount(
        reserve_a: U256,
        reserve_b: U256,
        amount_a: U256,
    ) -> Result<U256, AmmError> {
        if reserve_a.is_zero() {
            return Err(AmmError::NoLiquidity);
        }
        if amount_a.is_zero() {
            return Ok(U256::zero());
        }
        let paired = amount_a
            .checked_mul(reserve_b)
            .ok_or(AmmError::AmountOverflow { operation: "paired amount" })?
            / reserve_a;
        Ok(paired)
    }

    /// Amounts redeemed by burning `lp_amount` of `total_supply`:
    /// `reserve_x * lp_amount / total_supply` for each side.
    ///
    /// `lp_amount` must sit in `(0, total_supply]`; burning the full supply
    /// returns the reserves exactly.
    pub fn withdrawal_amounts(
        reserve_a: U256,
        reserve_b: U256,
        total_supply: U256,
        lp_amount: U256,
    ) -> Result<(U256, U256), AmmError> {
        if total_supply.is_zero() {
            return Err(AmmError::NoLiquidity);
        }
        if lp_amount.is_zero() || lp_amount > total_supply {
            return Err(AmmError::InvalidLpAmount {
                requested: lp_amount,
                total_supply,
            });
        }

        let amount_a = reserve_a
            .checked_mul(lp_amount)
            .ok_or(AmmError::AmountOverflow { operation: "withdrawal amount" })?
            / total_supply;
        let amount_b = reserve_b
            .checked_mul(lp_amount)
            .ok_or(AmmError::AmountOverflow { operation: "withdrawal amount" })?
            / total_supply;
        Ok((amount_a, amount_b))
    }

    /// Holder's share of the pool as a display percentage with four
    /// decimal places.
    pub fn pool_share_pct(lp_balance: U256, total_supply: U256) -> Decimal {
        if total_supply.is_zero() {
            return Decimal::ZERO;
        }
        let scaled = match lp_balance.checked_mul(U256::from(1_000_000u64)) {
            Some(v) => v / total_supply,
            None => return Decimal::ZERO,
        };
        Decimal::new(scaled.as_u64() as i64, 4)
    }
}
