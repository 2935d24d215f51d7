//! Error types for chain access

use ethereum_types::H256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// A view call or log query failed (endpoint down, bad response, ...).
    #[error("Failed to read {what}: {detail}")]
    ReadFailure { what: &'static str, detail: String },

    /// The node rejected a transaction submission outright.
    #[error("Failed to submit {what}: {detail}")]
    SubmitFailure { what: &'static str, detail: String },

    /// No receipt appeared within the configured wait window.
    #[error("Timed out waiting for confirmation of {tx:?}")]
    ConfirmationTimeout { tx: H256 },

    /// A fetched log did not decode against the expected event ABI.
    #[error("Log decoding failed: {0}")]
    Decode(String),

    /// Pair lookups need two distinct tokens.
    #[error("Cannot use the same token on both sides of a pair")]
    IdenticalTokens,

    /// RPC endpoint URL could not be turned into a transport.
    #[error("Invalid RPC endpoint {url}: {detail}")]
    InvalidEndpoint { url: String, detail: String },

    /// Built-in ABI failed to load; indicates a packaging bug.
    #[error("ABI definition error: {0}")]
    Abi(String),
}

impl ChainError {
    pub(crate) fn read(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::ReadFailure { what, detail: err.to_string() }
    }

    pub(crate) fn submit(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::SubmitFailure { what, detail: err.to_string() }
    }
}
