//! # Swapdesk AMM Library - Constant-Product Quoting Engine
//!
//! ## Purpose
//!
//! Pure mathematical core for quoting swaps and liquidity changes against
//! Uniswap-V2-style pools. Implements the fee-adjusted constant product
//! formula, slippage minimums, deposit-ratio and withdrawal-share math with
//! exact integer arithmetic, so that every amount computed here settles
//! identically on-chain.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Fresh reserve snapshots from the chain reader,
//!   amounts and tolerances from the command layer
//! - **Output Destinations**: Transaction orchestrator (minimum bounds,
//!   counterpart amounts), chat/status layer (impact and rate readouts)
//! - **Precision**: Raw smallest-unit `U256` with floor division for every
//!   submitted amount; `Decimal`/f64 confined to display percentages
//! - **Validation**: Range checks on tolerances, fees and LP amounts with
//!   typed errors callers can branch on
//!
//! ## Architecture Role
//!
//! Sits between the reserve reader and the orchestrator: reserves flow in,
//! quotes and slippage bounds flow out. Nothing here performs IO or holds
//! state, which is what keeps the whole pricing path unit-testable.
//!
//! ## Performance Profile
//!
//! - **Quote Cost**: a handful of 256-bit mul/div ops, no allocation
//! - **Curve Sampling**: O(samples), allocation-free per point
//! - **Unit Conversion**: digit-string domain, no power-of-ten overflow

pub mod curve;
pub mod error;
pub mod liquidity;
pub mod pricing;
pub mod slippage;
pub mod units;

pub use error::AmmError;
pub use liquidity::LiquidityMath;
pub use pricing::{PricingEngine, Quote, FEE_DENOMINATOR_BPS};
pub use slippage::{SlippageBound, SlippageGuard, TOLERANCE_SCALE};

/// Re-exported numeric types used across the quoting API
pub use ethereum_types::U256;
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
