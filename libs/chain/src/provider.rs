//! Typed chain capabilities and their web3 implementation
//!
//! Read and write access to the exchange contracts goes through the
//! `ChainReader`/`ChainWriter` traits so the orchestrator can run against
//! mock capabilities in tests. The production implementation speaks JSON-RPC
//! over HTTP; signing is delegated to the node, which holds the active
//! account (fork deployments run with unlocked accounts).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ethabi::Token;
use tracing::{debug, warn};
use web3::contract::{Contract, Options};
use web3::transports::Http;
use web3::types::{
    Address, BlockNumber, Bytes, FilterBuilder, Log, TransactionRequest, H256, U256, U64,
};
use web3::Web3;

use crate::abi;
use crate::error::ChainError;

/// Parameters of a router `addLiquidity` call.
#[derive(Debug, Clone)]
pub struct AddLiquidityCall {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

/// Parameters of a router `removeLiquidity` call.
#[derive(Debug, Clone)]
pub struct RemoveLiquidityCall {
    pub token_a: Address,
    pub token_b: Address,
    pub liquidity: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

/// Settled transaction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: H256,
    /// False when the receipt carries a zero (reverted) status.
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

/// View calls against the exchange contracts.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Factory pair lookup; the zero address means no pool exists.
    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, ChainError>;

    /// Contract-side ordering anchor for reserve permutation.
    async fn token0(&self, pair: Address) -> Result<Address, ChainError>;

    /// Raw reserve snapshot `(reserve0, reserve1, block_timestamp_last)`.
    async fn get_reserves(&self, pair: Address) -> Result<(U256, U256, u32), ChainError>;

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError>;
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError>;
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError>;

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError>;
    async fn token_symbol(&self, token: Address) -> Result<String, ChainError>;
    async fn token_name(&self, token: Address) -> Result<String, ChainError>;

    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Raw pair Swap logs over an inclusive block range.
    async fn swap_logs(
        &self,
        pair: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, ChainError>;
}

/// State-changing calls. Every submission returns the transaction hash;
/// settlement is observed separately through `wait_confirmed`.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        from: Address,
    ) -> Result<H256, ChainError>;

    #[allow(clippy::too_many_arguments)]
    async fn swap_exact_tokens_for_tokens(
        &self,
        router: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
        from: Address,
    ) -> Result<H256, ChainError>;

    async fn add_liquidity(
        &self,
        router: Address,
        call: AddLiquidityCall,
        from: Address,
    ) -> Result<H256, ChainError>;

    async fn remove_liquidity(
        &self,
        router: Address,
        call: RemoveLiquidityCall,
        from: Address,
    ) -> Result<H256, ChainError>;

    /// Poll for the receipt of `tx` until it lands or `timeout` passes.
    async fn wait_confirmed(
        &self,
        tx: H256,
        poll: Duration,
        timeout: Duration,
    ) -> Result<TxOutcome, ChainError>;
}

/// JSON-RPC implementation of both capabilities.
#[derive(Clone)]
pub struct Web3Provider {
    web3: Web3<Http>,
}

impl Web3Provider {
    /// Connect to an HTTP JSON-RPC endpoint.
    pub fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let transport = Http::new(rpc_url).map_err(|e| ChainError::InvalidEndpoint {
            url: rpc_url.to_string(),
            detail: e.to_string(),
        })?;
        Ok(Self { web3: Web3::new(transport) })
    }

    fn contract(&self, address: Address, abi_json: &str) -> Result<Contract<Http>, ChainError> {
        Contract::from_json(self.web3.eth(), address, abi_json.as_bytes())
            .map_err(|e| ChainError::Abi(e.to_string()))
    }

    /// Encode a router call and submit it as a node-signed transaction.
    async fn submit_router_call(
        &self,
        router: Address,
        from: Address,
        function: &'static str,
        params: &[Token],
    ) -> Result<H256, ChainError> {
        let abi = ethabi::Contract::load(abi::ROUTER_ABI.as_bytes())
            .map_err(|e| ChainError::Abi(e.to_string()))?;
        let data = abi
            .function(function)
            .and_then(|f| f.encode_input(params))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        let request = TransactionRequest {
            from,
            to: Some(router),
            data: Some(Bytes(data)),
            ..Default::default()
        };
        let tx_hash = self
            .web3
            .eth()
            .send_transaction(request)
            .await
            .map_err(|e| ChainError::submit(function, e))?;
        debug!(function, ?tx_hash, "submitted router call");
        Ok(tx_hash)
    }
}

#[async_trait]
impl ChainReader for Web3Provider {
    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, ChainError> {
        let contract = self.contract(factory, abi::FACTORY_ABI)?;
        contract
            .query("getPair", (token_a, token_b), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("pair address", e))
    }

    async fn token0(&self, pair: Address) -> Result<Address, ChainError> {
        let contract = self.contract(pair, abi::PAIR_ABI)?;
        contract
            .query("token0", (), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("token0", e))
    }

    async fn get_reserves(&self, pair: Address) -> Result<(U256, U256, u32), ChainError> {
        let contract = self.contract(pair, abi::PAIR_ABI)?;
        let (reserve0, reserve1, timestamp): (U256, U256, U256) = contract
            .query("getReserves", (), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("reserves", e))?;
        Ok((reserve0, reserve1, timestamp.low_u32()))
    }

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError> {
        let contract = self.contract(token, abi::ERC20_ABI)?;
        contract
            .query("totalSupply", (), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("total supply", e))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        let contract = self.contract(token, abi::ERC20_ABI)?;
        contract
            .query("balanceOf", (owner,), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("balance", e))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        let contract = self.contract(token, abi::ERC20_ABI)?;
        contract
            .query("allowance", (owner, spender), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("allowance", e))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        let contract = self.contract(token, abi::ERC20_ABI)?;
        contract
            .query("decimals", (), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("decimals", e))
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        let contract = self.contract(token, abi::ERC20_ABI)?;
        contract
            .query("symbol", (), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("symbol", e))
    }

    async fn token_name(&self, token: Address) -> Result<String, ChainError> {
        let contract = self.contract(token, abi::ERC20_ABI)?;
        contract
            .query("name", (), None, Options::default(), None)
            .await
            .map_err(|e| ChainError::read("name", e))
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.web3
            .eth()
            .block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| ChainError::read("block number", e))
    }

    async fn swap_logs(
        &self,
        pair: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, ChainError> {
        let filter = FilterBuilder::default()
            .address(vec![pair])
            .topics(Some(vec![abi::swap_topic()]), None, None, None)
            .from_block(BlockNumber::Number(U64::from(from_block)))
            .to_block(BlockNumber::Number(U64::from(to_block)))
            .build();
        self.web3
            .eth()
            .logs(filter)
            .await
            .map_err(|e| ChainError::read("swap logs", e))
    }
}

#[async_trait]
impl ChainWriter for Web3Provider {
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        from: Address,
    ) -> Result<H256, ChainError> {
        let abi = ethabi::Contract::load(abi::ERC20_ABI.as_bytes())
            .map_err(|e| ChainError::Abi(e.to_string()))?;
        let data = abi
            .function("approve")
            .and_then(|f| f.encode_input(&[Token::Address(spender), Token::Uint(amount)]))
            .map_err(|e| ChainError::Abi(e.to_string()))?;

        let request = TransactionRequest {
            from,
            to: Some(token),
            data: Some(Bytes(data)),
            ..Default::default()
        };
        let tx_hash = self
            .web3
            .eth()
            .send_transaction(request)
            .await
            .map_err(|e| ChainError::submit("approve", e))?;
        debug!(?token, ?spender, ?tx_hash, "submitted approval");
        Ok(tx_hash)
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        router: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
        from: Address,
    ) -> Result<H256, ChainError> {
        let path_tokens = path.into_iter().map(Token::Address).collect();
        self.submit_router_call(
            router,
            from,
            "swapExactTokensForTokens",
            &[
                Token::Uint(amount_in),
                Token::Uint(amount_out_min),
                Token::Array(path_tokens),
                Token::Address(to),
                Token::Uint(deadline),
            ],
        )
        .await
    }

    async fn add_liquidity(
        &self,
        router: Address,
        call: AddLiquidityCall,
        from: Address,
    ) -> Result<H256, ChainError> {
        self.submit_router_call(
            router,
            from,
            "addLiquidity",
            &[
                Token::Address(call.token_a),
                Token::Address(call.token_b),
                Token::Uint(call.amount_a_desired),
                Token::Uint(call.amount_b_desired),
                Token::Uint(call.amount_a_min),
                Token::Uint(call.amount_b_min),
                Token::Address(call.to),
                Token::Uint(call.deadline),
            ],
        )
        .await
    }

    async fn remove_liquidity(
        &self,
        router: Address,
        call: RemoveLiquidityCall,
        from: Address,
    ) -> Result<H256, ChainError> {
        self.submit_router_call(
            router,
            from,
            "removeLiquidity",
            &[
                Token::Address(call.token_a),
                Token::Address(call.token_b),
                Token::Uint(call.liquidity),
                Token::Uint(call.amount_a_min),
                Token::Uint(call.amount_b_min),
                Token::Address(call.to),
                Token::Uint(call.deadline),
            ],
        )
        .await
    }

    async fn wait_confirmed(
        &self,
        tx: H256,
        poll: Duration,
        timeout: Duration,
    ) -> Result<TxOutcome, ChainError> {
        let started = Instant::now();
        loop {
            match self.web3.eth().transaction_receipt(tx).await {
                Ok(Some(receipt)) => {
                    let success = receipt.status.map_or(true, |s| !s.is_zero());
                    return Ok(TxOutcome {
                        tx_hash: tx,
                        success,
                        block_number: receipt.block_number.map(|n| n.as_u64()),
                        gas_used: receipt.gas_used,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    // Transient RPC failures should not abandon a pending
                    // transaction; keep polling until the timeout.
                    warn!(?tx, error = %e, "receipt poll failed, retrying");
                }
            }

            if started.elapsed() > timeout {
                return Err(ChainError::ConfirmationTimeout { tx });
            }
            tokio::time::sleep(poll).await;
        }
    }
}
