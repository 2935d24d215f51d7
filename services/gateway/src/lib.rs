//! Swap Gateway
//!
//! Chat-driven trading front door for one constant-product exchange
//! deployment. Free-form user messages go to an external interpreter
//! service; the structured function calls it returns are decoded into
//! typed commands and routed to the transaction orchestrator or the
//! read-only pool queries. Every outcome is reported back through a
//! single ordered status stream.
//!
//! Features:
//! - Natural-language command dispatch via the interpreter service
//! - Approve→execute→confirm sequencing with per-receipt waits
//! - Slippage-bounded swap, add-liquidity and remove-liquidity flows
//! - Pool reserve snapshots and swap-event activity queries

pub mod commands;
pub mod error;
pub mod interpreter;
pub mod orchestrator;
pub mod status;

pub use commands::{Command, CommandRouter, Period};
pub use error::GatewayError;
pub use interpreter::{FunctionCall, InterpreterClient, InterpreterReply};
pub use orchestrator::{
    AddLiquidityRequest, ExecutionStep, OperationKind, OperationState, PendingOperation,
    RemoveLiquidityRequest, SwapRequest, TransactionOrchestrator,
};
pub use status::{StatusSink, StatusUpdate};
