//! Pool reserve reads in caller token order
//!
//! Pair contracts store reserves keyed by their own canonical token
//! ordering (`token0`/`token1`). Callers think in terms of the tokens they
//! named, so every snapshot taken here is permuted into caller order
//! before it leaves this module. Nothing downstream needs to know which
//! side of the pair a token landed on.

use std::sync::Arc;

use tracing::debug;
use web3::types::{Address, U256};

use crate::error::ChainError;
use crate::provider::ChainReader;

/// Reserve snapshot aligned to the token order the caller asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
    pub pair: Address,
    /// Reserve of the first token the caller named.
    pub reserve_a: U256,
    /// Reserve of the second token the caller named.
    pub reserve_b: U256,
    pub block_timestamp_last: u32,
}

impl PoolReserves {
    /// True when either side is empty; a freshly created pair reports
    /// zero reserves until its first deposit.
    pub fn is_empty(&self) -> bool {
        self.reserve_a.is_zero() || self.reserve_b.is_zero()
    }
}

/// Outcome of a pair lookup. The factory returns the zero address for
/// token pairs that have never been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Missing,
    Live(PoolReserves),
}

impl PairState {
    pub fn live(&self) -> Option<&PoolReserves> {
        match self {
            PairState::Live(reserves) => Some(reserves),
            PairState::Missing => None,
        }
    }
}

/// Reads pools for one factory deployment.
#[derive(Clone)]
pub struct ReserveReader {
    reader: Arc<dyn ChainReader>,
    factory: Address,
}

impl ReserveReader {
    pub fn new(reader: Arc<dyn ChainReader>, factory: Address) -> Self {
        Self { reader, factory }
    }

    /// Resolve the pair for `(token_a, token_b)` and snapshot its
    /// reserves in that order.
    pub async fn pair_state(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<PairState, ChainError> {
        if token_a == token_b {
            return Err(ChainError::IdenticalTokens);
        }

        let pair = self.reader.get_pair(self.factory, token_a, token_b).await?;
        if pair.is_zero() {
            debug!(?token_a, ?token_b, "no pair deployed");
            return Ok(PairState::Missing);
        }

        let token0 = self.reader.token0(pair).await?;
        let (reserve0, reserve1, block_timestamp_last) = self.reader.get_reserves(pair).await?;

        let (reserve_a, reserve_b) = if token0 == token_a {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };

        Ok(PairState::Live(PoolReserves {
            pair,
            reserve_a,
            reserve_b,
            block_timestamp_last,
        }))
    }

    /// Pair address only, without the reserve snapshot.
    pub async fn pair_address(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Address>, ChainError> {
        if token_a == token_b {
            return Err(ChainError::IdenticalTokens);
        }
        let pair = self.reader.get_pair(self.factory, token_a, token_b).await?;
        Ok(if pair.is_zero() { None } else { Some(pair) })
    }
}

/// Pool snapshot enriched with best-effort LP figures for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOverview {
    pub state: PairState,
    /// LP token supply of the pair, when the read succeeded.
    pub lp_total_supply: Option<U256>,
    /// Caller's LP balance, when an account was supplied and the read
    /// succeeded.
    pub lp_balance: Option<U256>,
}

impl ReserveReader {
    /// Reserve snapshot plus LP supply and holder balance. The LP reads
    /// are display supplements and degrade to `None` instead of failing
    /// the whole overview.
    pub async fn overview(
        &self,
        token_a: Address,
        token_b: Address,
        account: Option<Address>,
    ) -> Result<PoolOverview, ChainError> {
        let state = self.pair_state(token_a, token_b).await?;
        let pair = match state.live() {
            Some(reserves) => reserves.pair,
            None => {
                return Ok(PoolOverview { state, lp_total_supply: None, lp_balance: None });
            }
        };

        let lp_total_supply = match self.reader.total_supply(pair).await {
            Ok(supply) => Some(supply),
            Err(e) => {
                debug!(?pair, error = %e, "lp supply read skipped");
                None
            }
        };
        let lp_balance = match account {
            Some(owner) => match self.reader.balance_of(pair, owner).await {
                Ok(balance) => Some(balance),
                Err(e) => {
                    debug!(?pair, ?owner, error = %e, "lp balance read skipped");
                    None
                }
            },
            None => None,
        };

        Ok(PoolOverview { state, lp_total_supply, lp_balance })
    }
}
