//! Quoting and slippage property tests
//!
//! These tests validate mathematical properties that must always hold for
//! constant-product quoting, slippage bounds and liquidity shares,
//! regardless of specific reserve configurations.

use ethereum_types::U256;
use proptest::prelude::*;
use swapdesk_amm::{units, LiquidityMath, PricingEngine, SlippageGuard};

const STANDARD_FEE_BPS: u32 = 30;

// Property test strategies
prop_compose! {
    /// Raw reserves between one token unit and a billion 18-decimal tokens.
    fn live_reserve()
        (units in 1u128..1_000_000_000u128,
         dust in 0u128..1_000_000_000_000_000_000u128) -> U256 {
        U256::from(units) * U256::exp10(18) + U256::from(dust)
    }
}

prop_compose! {
    fn trade_amount()
        (raw in 0u128..u128::MAX / 2) -> U256 {
        U256::from(raw)
    }
}

prop_compose! {
    /// Whole-basis-point tolerances across the valid [0, 100) percent range.
    fn tolerance_bps()
        (bps in 0u32..10_000u32) -> u32 {
        bps
    }
}

proptest! {
    /// Property: output grows (weakly) with input at fixed reserves
    #[test]
    fn quote_output_is_monotone_in_input(
        reserve_in in live_reserve(),
        reserve_out in live_reserve(),
        amount in 1u128..1_000_000_000_000_000_000_000_000u128,
    ) {
        let smaller = U256::from(amount / 2);
        let larger = U256::from(amount);

        let out_small = PricingEngine::quote_output(reserve_in, reserve_out, smaller, STANDARD_FEE_BPS).unwrap();
        let out_large = PricingEngine::quote_output(reserve_in, reserve_out, larger, STANDARD_FEE_BPS).unwrap();

        prop_assert!(out_small <= out_large,
                    "smaller input {} out-quoted larger input {}", out_small, out_large);
    }

    /// Property: a swap can never drain the output reserve
    #[test]
    fn quote_output_stays_below_reserve_out(
        reserve_in in live_reserve(),
        reserve_out in live_reserve(),
        amount in 1u128..u128::MAX / 2,
    ) {
        let out = PricingEngine::quote_output(reserve_in, reserve_out, U256::from(amount), STANDARD_FEE_BPS).unwrap();
        prop_assert!(out < reserve_out,
                    "quoted {} against reserve {}", out, reserve_out);
    }

    /// Property: the basis-point form equals the canonical 997/1000 router form
    #[test]
    fn quote_output_matches_router_arithmetic(
        reserve_in in live_reserve(),
        reserve_out in live_reserve(),
        amount in 1u128..1_000_000_000_000_000_000_000_000u128,
    ) {
        let amount = U256::from(amount);
        let ours = PricingEngine::quote_output(reserve_in, reserve_out, amount, STANDARD_FEE_BPS).unwrap();

        let in_with_fee = amount * U256::from(997u64);
        let router = (in_with_fee * reserve_out)
            / (reserve_in * U256::from(1000u64) + in_with_fee);

        prop_assert_eq!(ours, router);
    }

    /// Property: slippage minimum never exceeds the quote and zero tolerance is identity
    #[test]
    fn slippage_minimum_bounded_by_quote(
        quoted in trade_amount(),
        bps in tolerance_bps(),
    ) {
        let pct = bps as f64 / 100.0;
        let min = SlippageGuard::minimum_amount(quoted, pct).unwrap();
        prop_assert!(min <= quoted);
        if bps == 0 {
            prop_assert_eq!(min, quoted);
        }
    }

    /// Property: widening the tolerance never raises the minimum
    #[test]
    fn slippage_minimum_monotone_in_tolerance(
        quoted in trade_amount(),
        bps_low in 0u32..5_000u32,
        spread in 0u32..5_000u32,
    ) {
        let bps_high = bps_low + spread;
        let min_low = SlippageGuard::minimum_amount(quoted, bps_low as f64 / 100.0).unwrap();
        let min_high = SlippageGuard::minimum_amount(quoted, bps_high as f64 / 100.0).unwrap();
        prop_assert!(min_high <= min_low,
                    "tolerance {}bps gave {}, {}bps gave {}", bps_low, min_low, bps_high, min_high);
    }

    /// Property: paired-amount round trip loses at most the reserve ratio floor
    #[test]
    fn paired_amount_round_trip_is_tight(
        reserve_a in live_reserve(),
        reserve_b in live_reserve(),
        amount in 1u128..1_000_000_000_000_000_000_000_000u128,
    ) {
        let amount_a = U256::from(amount);
        let amount_b = LiquidityMath::optimal_paired_amount(reserve_a, reserve_b, amount_a).unwrap();
        let recovered = LiquidityMath::optimal_paired_amount(reserve_b, reserve_a, amount_b).unwrap();

        prop_assert!(recovered <= amount_a);
        prop_assert!(amount_a - recovered <= reserve_a / reserve_b + U256::from(1u64),
                    "lost {} units on a {}:{} pool", amount_a - recovered, reserve_a, reserve_b);
    }

    /// Property: withdrawals are proportional and the full burn drains the pool
    #[test]
    fn withdrawal_shares_are_proportional(
        reserve_a in live_reserve(),
        reserve_b in live_reserve(),
        total in 1u128..1_000_000_000_000_000_000_000_000u128,
    ) {
        let total_supply = U256::from(total);
        let lp = U256::from(total / 2 + 1);

        let (part_a, part_b) =
            LiquidityMath::withdrawal_amounts(reserve_a, reserve_b, total_supply, lp).unwrap();
        prop_assert!(part_a <= reserve_a);
        prop_assert!(part_b <= reserve_b);

        let (all_a, all_b) =
            LiquidityMath::withdrawal_amounts(reserve_a, reserve_b, total_supply, total_supply).unwrap();
        prop_assert_eq!(all_a, reserve_a);
        prop_assert_eq!(all_b, reserve_b);
    }

    /// Property: formatting a raw amount and parsing it back is the identity
    #[test]
    fn units_format_parse_round_trip(
        raw in 0u128..u128::MAX,
        decimals in 0u8..30u8,
    ) {
        let value = U256::from(raw);
        let rendered = units::format_units(value, decimals);
        let parsed = units::parse_units(&rendered, decimals).unwrap();
        prop_assert_eq!(parsed, value, "rendered as {}", rendered);
    }
}
