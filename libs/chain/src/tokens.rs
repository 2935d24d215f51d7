//! On-chain ERC20 metadata reads
//!
//! The static registry in `config` covers the tokens the interpreter can
//! name. Anything else the engine touches, LP tokens included, is
//! described by the contract itself through the reads here. Decimals are
//! the one field the math depends on, so a failed decimals read falls
//! back to 18 with a warning instead of blocking the flow.

use tracing::warn;
use web3::types::Address;

use crate::error::ChainError;
use crate::provider::ChainReader;

/// Assumed when a token contract does not answer `decimals()`.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Token description as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// Contract decimals, or [`DEFAULT_DECIMALS`] when the read fails.
pub async fn decimals_or_default(reader: &dyn ChainReader, token: Address) -> u8 {
    match reader.token_decimals(token).await {
        Ok(decimals) => decimals,
        Err(e) => {
            warn!(?token, error = %e, "decimals read failed, assuming 18");
            DEFAULT_DECIMALS
        }
    }
}

/// Full metadata fetch. Symbol and name failures propagate; decimals
/// degrade per [`decimals_or_default`].
pub async fn fetch_metadata(
    reader: &dyn ChainReader,
    token: Address,
) -> Result<TokenMetadata, ChainError> {
    let symbol = reader.token_symbol(token).await?;
    let name = reader.token_name(token).await?;
    let decimals = decimals_or_default(reader, token).await;
    Ok(TokenMetadata { address: token, symbol, name, decimals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use web3::types::{Log, U256};

    fn addr(byte: u8) -> Address {
        Address::from_low_u64_be(byte as u64)
    }

    #[derive(Default)]
    struct MetadataBook {
        symbols: HashMap<Address, String>,
        names: HashMap<Address, String>,
        decimals: HashMap<Address, u8>,
    }

    fn missing(what: &'static str) -> ChainError {
        ChainError::ReadFailure { what, detail: "no such entry".into() }
    }

    #[async_trait]
    impl ChainReader for MetadataBook {
        async fn get_pair(
            &self,
            _factory: Address,
            _token_a: Address,
            _token_b: Address,
        ) -> Result<Address, ChainError> {
            unimplemented!("not scripted")
        }

        async fn token0(&self, _pair: Address) -> Result<Address, ChainError> {
            unimplemented!("not scripted")
        }

        async fn get_reserves(&self, _pair: Address) -> Result<(U256, U256, u32), ChainError> {
            unimplemented!("not scripted")
        }

        async fn total_supply(&self, _token: Address) -> Result<U256, ChainError> {
            unimplemented!("not scripted")
        }

        async fn balance_of(&self, _token: Address, _owner: Address) -> Result<U256, ChainError> {
            unimplemented!("not scripted")
        }

        async fn allowance(
            &self,
            _token: Address,
            _owner: Address,
            _spender: Address,
        ) -> Result<U256, ChainError> {
            unimplemented!("not scripted")
        }

        async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
            self.decimals.get(&token).copied().ok_or_else(|| missing("decimals"))
        }

        async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
            self.symbols.get(&token).cloned().ok_or_else(|| missing("symbol"))
        }

        async fn token_name(&self, token: Address) -> Result<String, ChainError> {
            self.names.get(&token).cloned().ok_or_else(|| missing("name"))
        }

        async fn block_number(&self) -> Result<u64, ChainError> {
            Ok(0)
        }

        async fn swap_logs(
            &self,
            _pair: Address,
            _from_block: u64,
            _to_block: u64,
        ) -> Result<Vec<Log>, ChainError> {
            Ok(Vec::new())
        }
    }

    fn book_with(token: Address, symbol: &str, name: &str, decimals: Option<u8>) -> MetadataBook {
        let mut book = MetadataBook::default();
        book.symbols.insert(token, symbol.to_string());
        book.names.insert(token, name.to_string());
        if let Some(d) = decimals {
            book.decimals.insert(token, d);
        }
        book
    }

    #[tokio::test]
    async fn metadata_assembles_all_fields() {
        let token = addr(0x11);
        let book = book_with(token, "USDC", "USD Coin", Some(6));

        let meta = fetch_metadata(&book, token).await.unwrap();
        assert_eq!(meta.address, token);
        assert_eq!(meta.symbol, "USDC");
        assert_eq!(meta.name, "USD Coin");
        assert_eq!(meta.decimals, 6);
    }

    #[tokio::test]
    async fn missing_decimals_fall_back_to_eighteen() {
        let token = addr(0x12);
        let book = book_with(token, "ODD", "Oddball", None);

        let meta = fetch_metadata(&book, token).await.unwrap();
        assert_eq!(meta.decimals, DEFAULT_DECIMALS);
    }

    #[test]
    fn decimals_or_default_prefers_the_contract_value() {
        let token = addr(0x13);
        let book = book_with(token, "WBTC", "Wrapped BTC", Some(8));

        assert_eq!(tokio_test::block_on(decimals_or_default(&book, token)), 8);
    }

    #[tokio::test]
    async fn symbol_failure_propagates() {
        let token = addr(0x14);
        let book = MetadataBook::default();

        let err = fetch_metadata(&book, token).await.unwrap_err();
        assert!(matches!(err, ChainError::ReadFailure { what: "symbol", .. }));
    }
}
