//! Gateway error taxonomy
//!
//! Display strings double as chat output. The command layer wraps them
//! with the per-flow prefix the user sees, so the variants themselves
//! stay prefix-free.

use chain::ChainError;
use swapdesk_amm::AmmError;
use thiserror::Error;
use web3::types::H256;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Unknown function: {0}")]
    UnknownCommand(String),

    #[error("No liquidity pool exists for {token_a}-{token_b}")]
    NoPool { token_a: String, token_b: String },

    #[error("insufficient {token} balance: need {needed}, have {available}")]
    InsufficientBalance {
        token: String,
        needed: String,
        available: String,
    },

    #[error("token approval failed: {0}")]
    ApprovalRejected(String),

    #[error("transaction reverted on-chain (tx {tx:?})")]
    ExecutionReverted { tx: H256 },

    #[error("Wallet not connected.")]
    WalletNotConnected,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("interpreter request failed: {0}")]
    Interpreter(String),

    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}
