//! Swap event history for a pair
//!
//! Fetches `Swap` logs over a block lookback window and decodes them with
//! the ethabi event definition, so amounts come out as typed `U256` values
//! instead of manually sliced bytes. Decoded trades are permuted into the
//! caller's token order and priced for display. A log that fails to decode
//! is skipped with a warning; one malformed event must not blank the whole
//! history.

use std::sync::Arc;

use ethabi::RawLog;
use swapdesk_amm::units;
use tracing::{debug, warn};
use web3::types::{Address, Log, H256, U256};

use crate::abi;
use crate::error::ChainError;
use crate::provider::ChainReader;
use crate::tokens;

/// Trade direction relative to the caller's token order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    /// Token A was sold for token B.
    AToB,
    /// Token B was sold for token A.
    BToA,
}

/// One decoded swap, amounts in native smallest units.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRecord {
    pub tx_hash: Option<H256>,
    pub block_number: u64,
    pub sender: Address,
    pub recipient: Address,
    pub direction: TradeDirection,
    pub amount_in: U256,
    pub amount_out: U256,
    /// Execution price of token A denominated in token B, display units.
    /// `None` when one side of the trade is zero.
    pub price_a_in_b: Option<f64>,
}

/// Summary over the priced records of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub priced_swaps: usize,
    pub min_price: f64,
    pub max_price: f64,
    pub mean_price: f64,
}

/// History window for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairHistory {
    pub pair: Address,
    pub from_block: u64,
    pub to_block: u64,
    /// Newest first.
    pub records: Vec<SwapRecord>,
    pub stats: Option<PriceStats>,
}

/// Reads and decodes swap history for one factory deployment.
#[derive(Clone)]
pub struct SwapHistory {
    reader: Arc<dyn ChainReader>,
    factory: Address,
}

impl SwapHistory {
    pub fn new(reader: Arc<dyn ChainReader>, factory: Address) -> Self {
        Self { reader, factory }
    }

    /// Decode the last `lookback_blocks` of swaps for `(token_a, token_b)`.
    /// Returns `None` when no pair exists for the tokens.
    pub async fn fetch(
        &self,
        token_a: Address,
        token_b: Address,
        lookback_blocks: u64,
    ) -> Result<Option<PairHistory>, ChainError> {
        let Some((pair, a_is_token0)) = self.resolve_pair(token_a, token_b).await? else {
            return Ok(None);
        };

        let to_block = self.reader.block_number().await?;
        let from_block = to_block.saturating_sub(lookback_blocks);
        let logs = self.reader.swap_logs(pair, from_block, to_block).await?;
        debug!(?pair, from_block, to_block, raw = logs.len(), "fetched swap logs");

        let decimals_a = tokens::decimals_or_default(self.reader.as_ref(), token_a).await;
        let decimals_b = tokens::decimals_or_default(self.reader.as_ref(), token_b).await;

        let mut records: Vec<SwapRecord> = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_swap_log(log) {
                Ok(decoded) => {
                    records.push(decoded.into_record(a_is_token0, decimals_a, decimals_b));
                }
                Err(e) => {
                    warn!(?pair, block = ?log.block_number, error = %e, "skipping undecodable swap log");
                }
            }
        }
        records.sort_by(|a, b| b.block_number.cmp(&a.block_number));

        let stats = price_stats(&records);
        Ok(Some(PairHistory { pair, from_block, to_block, records, stats }))
    }

    /// Number of swaps in the window, without decoding any of them.
    /// Returns `None` when no pair exists for the tokens.
    pub async fn swap_count(
        &self,
        token_a: Address,
        token_b: Address,
        lookback_blocks: u64,
    ) -> Result<Option<u64>, ChainError> {
        let Some((pair, _)) = self.resolve_pair(token_a, token_b).await? else {
            return Ok(None);
        };
        let to_block = self.reader.block_number().await?;
        let from_block = to_block.saturating_sub(lookback_blocks);
        let logs = self.reader.swap_logs(pair, from_block, to_block).await?;
        Ok(Some(logs.len() as u64))
    }

    async fn resolve_pair(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<(Address, bool)>, ChainError> {
        if token_a == token_b {
            return Err(ChainError::IdenticalTokens);
        }
        let pair = self.reader.get_pair(self.factory, token_a, token_b).await?;
        if pair.is_zero() {
            return Ok(None);
        }
        let token0 = self.reader.token0(pair).await?;
        Ok(Some((pair, token0 == token_a)))
    }
}

/// Raw pair-ordered swap amounts straight out of the event.
struct DecodedSwap {
    sender: Address,
    recipient: Address,
    amount_in: U256,
    amount_out: U256,
    token_in_is_token0: bool,
    block_number: u64,
    tx_hash: Option<H256>,
}

impl DecodedSwap {
    fn into_record(self, a_is_token0: bool, decimals_a: u8, decimals_b: u8) -> SwapRecord {
        let direction = if self.token_in_is_token0 == a_is_token0 {
            TradeDirection::AToB
        } else {
            TradeDirection::BToA
        };

        let price_a_in_b = match direction {
            // A in, B out: price of A is B-out per A-in.
            TradeDirection::AToB => {
                ratio(self.amount_out, decimals_b, self.amount_in, decimals_a)
            }
            // B in, A out: price of A is B-in per A-out.
            TradeDirection::BToA => {
                ratio(self.amount_in, decimals_b, self.amount_out, decimals_a)
            }
        };

        SwapRecord {
            tx_hash: self.tx_hash,
            block_number: self.block_number,
            sender: self.sender,
            recipient: self.recipient,
            direction,
            amount_in: self.amount_in,
            amount_out: self.amount_out,
            price_a_in_b,
        }
    }
}

fn ratio(numer: U256, numer_decimals: u8, denom: U256, denom_decimals: u8) -> Option<f64> {
    if numer.is_zero() || denom.is_zero() {
        return None;
    }
    Some(units::to_display(numer, numer_decimals) / units::to_display(denom, denom_decimals))
}

fn decode_swap_log(log: &Log) -> Result<DecodedSwap, ChainError> {
    let event = abi::swap_event();
    let decoded = event
        .parse_log(RawLog { topics: log.topics.clone(), data: log.data.0.clone() })
        .map_err(|e| ChainError::Decode(e.to_string()))?;

    let sender = decoded
        .params
        .first()
        .and_then(|p| p.value.clone().into_address())
        .ok_or_else(|| ChainError::Decode("missing sender".into()))?;
    let amount0_in = decoded
        .params
        .get(1)
        .and_then(|p| p.value.clone().into_uint())
        .ok_or_else(|| ChainError::Decode("missing amount0In".into()))?;
    let amount1_in = decoded
        .params
        .get(2)
        .and_then(|p| p.value.clone().into_uint())
        .ok_or_else(|| ChainError::Decode("missing amount1In".into()))?;
    let amount0_out = decoded
        .params
        .get(3)
        .and_then(|p| p.value.clone().into_uint())
        .ok_or_else(|| ChainError::Decode("missing amount0Out".into()))?;
    let amount1_out = decoded
        .params
        .get(4)
        .and_then(|p| p.value.clone().into_uint())
        .ok_or_else(|| ChainError::Decode("missing amount1Out".into()))?;
    let recipient = decoded
        .params
        .get(5)
        .and_then(|p| p.value.clone().into_address())
        .ok_or_else(|| ChainError::Decode("missing to".into()))?;

    let (amount_in, amount_out, token_in_is_token0) = if amount0_in > U256::zero() {
        (amount0_in, amount1_out, true)
    } else if amount1_in > U256::zero() {
        (amount1_in, amount0_out, false)
    } else {
        return Err(ChainError::Decode("swap with no input amount".into()));
    };

    Ok(DecodedSwap {
        sender,
        recipient,
        amount_in,
        amount_out,
        token_in_is_token0,
        block_number: log.block_number.map(|n| n.as_u64()).unwrap_or_default(),
        tx_hash: log.transaction_hash,
    })
}

fn price_stats(records: &[SwapRecord]) -> Option<PriceStats> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price_a_in_b).collect();
    if prices.is_empty() {
        return None;
    }
    let mut min_price = f64::MAX;
    let mut max_price = f64::MIN;
    let mut sum = 0.0;
    for price in &prices {
        min_price = min_price.min(*price);
        max_price = max_price.max(*price);
        sum += price;
    }
    Some(PriceStats {
        priced_swaps: prices.len(),
        min_price,
        max_price,
        mean_price: sum / prices.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use web3::types::{Bytes, U64};

    fn addr(byte: u8) -> Address {
        Address::from_low_u64_be(byte as u64)
    }

    fn address_topic(address: Address) -> H256 {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_bytes());
        H256::from(bytes)
    }

    fn amounts_data(values: [U256; 4]) -> Vec<u8> {
        let mut data = Vec::with_capacity(128);
        for value in values {
            let mut word = [0u8; 32];
            value.to_big_endian(&mut word);
            data.extend_from_slice(&word);
        }
        data
    }

    fn swap_log(
        pair: Address,
        block: u64,
        sender: Address,
        recipient: Address,
        amounts: [U256; 4],
    ) -> Log {
        Log {
            address: pair,
            topics: vec![abi::swap_topic(), address_topic(sender), address_topic(recipient)],
            data: Bytes(amounts_data(amounts)),
            block_hash: None,
            block_number: Some(U64::from(block)),
            transaction_hash: Some(H256::from_low_u64_be(block)),
            transaction_index: None,
            log_index: None,
            transaction_log_index: None,
            log_type: None,
            removed: None,
        }
    }

    /// Scripted reader serving one pair and a fixed log set.
    struct LogBook {
        pair: Address,
        token0: Address,
        token1: Address,
        head_block: u64,
        decimals: HashMap<Address, u8>,
        logs: Vec<Log>,
    }

    #[async_trait]
    impl ChainReader for LogBook {
        async fn get_pair(
            &self,
            _factory: Address,
            token_a: Address,
            token_b: Address,
        ) -> Result<Address, ChainError> {
            let known = (token_a == self.token0 && token_b == self.token1)
                || (token_a == self.token1 && token_b == self.token0);
            Ok(if known { self.pair } else { Address::zero() })
        }

        async fn token0(&self, _pair: Address) -> Result<Address, ChainError> {
            Ok(self.token0)
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
            self.decimals.get(&token).copied().ok_or(ChainError::ReadFailure {
                what: "decimals",
                detail: "no such entry".into(),
            })
        }

        async fn token_symbol(&self, _token: Address) -> Result<String, ChainError> {
            unimplemented!("not scripted")
        }

        async fn token_name(&self, _token: Address) -> Result<String, ChainError> {
            unimplemented!("not scripted")
        }

        async fn block_number(&self) -> Result<u64, ChainError> {
            Ok(self.head_block)
        }

        async fn swap_logs(
            &self,
            pair: Address,
            from_block: u64,
            to_block: u64,
        ) -> Result<Vec<Log>, ChainError> {
            assert_eq!(pair, self.pair);
            Ok(self
                .logs
                .iter()
                .filter(|log| {
                    let block = log.block_number.unwrap().as_u64();
                    block >= from_block && block <= to_block
                })
                .cloned()
                .collect())
        }
    }

    const WETH_UNIT: u64 = 1_000_000_000_000_000_000;
    const USDC_UNIT: u64 = 1_000_000;

    fn weth() -> Address {
        addr(0x01)
    }

    fn usdc() -> Address {
        addr(0x02)
    }

    fn book(logs: Vec<Log>) -> LogBook {
        let mut decimals = HashMap::new();
        decimals.insert(weth(), 18u8);
        decimals.insert(usdc(), 6u8);
        LogBook {
            pair: addr(0xAB),
            token0: weth(),
            token1: usdc(),
            head_block: 10_000,
            decimals,
            logs,
        }
    }

    /// 1 WETH in, 1800 USDC out.
    fn sell_one_weth(block: u64) -> Log {
        swap_log(
            addr(0xAB),
            block,
            addr(0xEE),
            addr(0xEF),
            [
                U256::from(WETH_UNIT),
                U256::zero(),
                U256::zero(),
                U256::from(1_800 * USDC_UNIT),
            ],
        )
    }

    #[tokio::test]
    async fn decodes_direction_and_price_in_caller_order() {
        let history = SwapHistory::new(Arc::new(book(vec![sell_one_weth(9_990)])), addr(0xFA));

        let window = history.fetch(weth(), usdc(), 1_000).await.unwrap().unwrap();
        assert_eq!(window.records.len(), 1);
        let record = &window.records[0];
        assert_eq!(record.direction, TradeDirection::AToB);
        assert_eq!(record.amount_in, U256::from(WETH_UNIT));
        assert_eq!(record.amount_out, U256::from(1_800 * USDC_UNIT));
        assert_eq!(record.sender, addr(0xEE));
        assert_eq!(record.recipient, addr(0xEF));
        let price = record.price_a_in_b.unwrap();
        assert!((price - 1_800.0).abs() < 1e-6, "price {price}");
    }

    #[tokio::test]
    async fn decodes_captured_data_payload() {
        // Data words of a pair Swap event as an RPC returns them:
        // amount0In = 0, amount1In = 3600e6, amount0Out = 2e18, amount1Out = 0.
        let payload = "0x0000000000000000000000000000000000000000000000000000000000000000\
                       00000000000000000000000000000000000000000000000000000000d693a400\
                       0000000000000000000000000000000000000000000000001bc16d674ec80000\
                       0000000000000000000000000000000000000000000000000000000000000000";
        let mut log = sell_one_weth(9_990);
        log.data = Bytes(hex::decode(&payload[2..]).unwrap());
        let history = SwapHistory::new(Arc::new(book(vec![log])), addr(0xFA));

        // 3600 USDC bought 2 WETH, so in (WETH, USDC) order the trade is
        // B-to-A at 1800 USDC per WETH.
        let window = history.fetch(weth(), usdc(), 1_000).await.unwrap().unwrap();
        let record = &window.records[0];
        assert_eq!(record.direction, TradeDirection::BToA);
        assert_eq!(record.amount_in, U256::from(3_600 * USDC_UNIT));
        assert_eq!(record.amount_out, U256::from(2 * WETH_UNIT));
        let price = record.price_a_in_b.unwrap();
        assert!((price - 1_800.0).abs() < 1e-6, "price {price}");
    }

    #[tokio::test]
    async fn reversed_caller_order_flips_direction_and_inverts_price() {
        let history = SwapHistory::new(Arc::new(book(vec![sell_one_weth(9_990)])), addr(0xFA));

        // Same trade viewed as (USDC, WETH): WETH was sold, so token B
        // went in and the price of USDC is quoted in WETH.
        let window = history.fetch(usdc(), weth(), 1_000).await.unwrap().unwrap();
        let record = &window.records[0];
        assert_eq!(record.direction, TradeDirection::BToA);
        let price = record.price_a_in_b.unwrap();
        assert!((price - 1.0 / 1_800.0).abs() < 1e-9, "price {price}");
    }

    #[tokio::test]
    async fn undecodable_logs_are_skipped_not_fatal() {
        let mut truncated = sell_one_weth(9_991);
        truncated.data = Bytes(vec![0u8; 16]);
        let logs = vec![sell_one_weth(9_990), truncated];
        let history = SwapHistory::new(Arc::new(book(logs)), addr(0xFA));

        let window = history.fetch(weth(), usdc(), 1_000).await.unwrap().unwrap();
        assert_eq!(window.records.len(), 1);
        assert_eq!(window.records[0].block_number, 9_990);
    }

    #[tokio::test]
    async fn records_come_back_newest_first_with_stats() {
        let cheap = swap_log(
            addr(0xAB),
            9_900,
            addr(0xEE),
            addr(0xEE),
            [
                U256::from(WETH_UNIT),
                U256::zero(),
                U256::zero(),
                U256::from(1_500 * USDC_UNIT),
            ],
        );
        let dear = swap_log(
            addr(0xAB),
            9_950,
            addr(0xEE),
            addr(0xEE),
            [
                U256::from(WETH_UNIT),
                U256::zero(),
                U256::zero(),
                U256::from(2_100 * USDC_UNIT),
            ],
        );
        let history = SwapHistory::new(Arc::new(book(vec![cheap, dear])), addr(0xFA));

        let window = history.fetch(weth(), usdc(), 1_000).await.unwrap().unwrap();
        assert_eq!(window.records[0].block_number, 9_950);
        assert_eq!(window.records[1].block_number, 9_900);

        let stats = window.stats.unwrap();
        assert_eq!(stats.priced_swaps, 2);
        assert!((stats.min_price - 1_500.0).abs() < 1e-6);
        assert!((stats.max_price - 2_100.0).abs() < 1e-6);
        assert!((stats.mean_price - 1_800.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn lookback_window_excludes_older_blocks() {
        let old = sell_one_weth(8_000);
        let recent = sell_one_weth(9_990);
        let history = SwapHistory::new(Arc::new(book(vec![old, recent])), addr(0xFA));

        let window = history.fetch(weth(), usdc(), 100).await.unwrap().unwrap();
        assert_eq!(window.from_block, 9_900);
        assert_eq!(window.records.len(), 1);
        assert_eq!(window.records[0].block_number, 9_990);
    }

    #[tokio::test]
    async fn swap_count_counts_raw_logs() {
        let mut truncated = sell_one_weth(9_991);
        truncated.data = Bytes(vec![0u8; 16]);
        let logs = vec![sell_one_weth(9_990), truncated];
        let history = SwapHistory::new(Arc::new(book(logs)), addr(0xFA));

        let count = history.swap_count(weth(), usdc(), 1_000).await.unwrap();
        assert_eq!(count, Some(2));
    }

    #[tokio::test]
    async fn missing_pair_yields_none() {
        let history = SwapHistory::new(Arc::new(book(Vec::new())), addr(0xFA));

        assert!(history.fetch(weth(), addr(0x33), 1_000).await.unwrap().is_none());
        assert!(history.swap_count(weth(), addr(0x33), 1_000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn identical_tokens_are_rejected() {
        let history = SwapHistory::new(Arc::new(book(Vec::new())), addr(0xFA));

        let err = history.fetch(weth(), weth(), 1_000).await.unwrap_err();
        assert!(matches!(err, ChainError::IdenticalTokens));
    }
}
