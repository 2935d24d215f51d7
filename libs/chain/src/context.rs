//! Shared handle bundling chain capabilities with deployment addresses

use std::sync::Arc;

use web3::types::Address;

use crate::error::ChainError;
use crate::provider::{ChainReader, ChainWriter, Web3Provider};

/// Everything a service needs to talk to one exchange deployment.
///
/// Cloning is cheap; the capabilities are shared behind `Arc` so the
/// orchestrator, history reader and command layer can hold the same
/// connection.
#[derive(Clone)]
pub struct ChainContext {
    pub reader: Arc<dyn ChainReader>,
    pub writer: Arc<dyn ChainWriter>,
    pub factory: Address,
    pub router: Address,
    /// Active account, when one is configured. Read-only flows work
    /// without it; submissions require it.
    pub account: Option<Address>,
}

impl ChainContext {
    /// Connect to a JSON-RPC endpoint and use it for both reads and writes.
    pub fn connect(
        rpc_url: &str,
        factory: Address,
        router: Address,
        account: Option<Address>,
    ) -> Result<Self, ChainError> {
        let provider = Web3Provider::connect(rpc_url)?;
        Ok(Self {
            reader: Arc::new(provider.clone()),
            writer: Arc::new(provider),
            factory,
            router,
            account,
        })
    }

    /// Assemble a context from explicit capabilities. Tests use this to
    /// substitute scripted readers and writers.
    pub fn with_capabilities(
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
        factory: Address,
        router: Address,
        account: Option<Address>,
    ) -> Self {
        Self { reader, writer, factory, router, account }
    }
}

impl std::fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext")
            .field("factory", &self.factory)
            .field("router", &self.router)
            .field("account", &self.account)
            .finish()
    }
}
