//! # Chain Access Library - Typed Exchange Contract Plumbing
//!
//! ## Purpose
//!
//! Read and write access to a deployed constant-product exchange: factory
//! pair lookups, reserve snapshots permuted into caller token order, ERC20
//! metadata and balances, swap-event history, and node-signed transaction
//! submission with receipt confirmation.
//!
//! ## Integration Points
//!
//! - **Input Sources**: JSON-RPC endpoint (HTTP), deployment addresses from
//!   `config`
//! - **Output Destinations**: Quoting engine (reserve snapshots), transaction
//!   orchestrator (submission and confirmation), chat/status layer (history
//!   and metadata readouts)
//! - **Capabilities**: `ChainReader`/`ChainWriter` async traits keep every
//!   consumer mockable; `Web3Provider` is the production implementation
//! - **Decoding**: ethabi event definitions, never manual byte slicing
//!
//! ## Architecture Role
//!
//! The only crate that talks to the node. Everything above it consumes typed
//! values in caller token order; `token0` permutation never leaks upward.
//!
//! ## Performance Profile
//!
//! - **Reads**: one RPC round trip per call, no client-side caching
//! - **Confirmation**: receipt polling at a configurable interval
//! - **History**: single `eth_getLogs` per window, linear decode

pub mod abi;
pub mod context;
pub mod error;
pub mod history;
pub mod provider;
pub mod reserves;
pub mod tokens;

pub use context::ChainContext;
pub use error::ChainError;
pub use history::{PairHistory, PriceStats, SwapHistory, SwapRecord, TradeDirection};
pub use provider::{
    AddLiquidityCall, ChainReader, ChainWriter, RemoveLiquidityCall, TxOutcome, Web3Provider,
};
pub use reserves::{PairState, PoolOverview, PoolReserves, ReserveReader};
pub use tokens::{TokenMetadata, DEFAULT_DECIMALS};
