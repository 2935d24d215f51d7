//! Contract ABI definitions
//!
//! Minimal ABI fragments for the exchange contracts, covering exactly the
//! entry points the services call, plus the pair Swap event used by the
//! history reader.

use ethabi::{Event, EventParam, ParamType};
use ethereum_types::H256;

/// ERC20 surface: metadata, balances, allowances and approvals.
/// Pair contracts expose the same surface for their LP token.
pub const ERC20_ABI: &str = r#"[
    {"constant":true,"inputs":[],"name":"name","outputs":[{"name":"","type":"string"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"symbol","outputs":[{"name":"","type":"string"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"decimals","outputs":[{"name":"","type":"uint8"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"totalSupply","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"owner","type":"address"}],"name":"balanceOf","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"owner","type":"address"},{"name":"spender","type":"address"}],"name":"allowance","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":false,"inputs":[{"name":"spender","type":"address"},{"name":"value","type":"uint256"}],"name":"approve","outputs":[{"name":"","type":"bool"}],"type":"function"}
]"#;

/// Factory surface: pair discovery.
pub const FACTORY_ABI: &str = r#"[
    {"constant":true,"inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"}],"name":"getPair","outputs":[{"name":"pair","type":"address"}],"type":"function"}
]"#;

/// Pair surface: token ordering and the reserve snapshot.
pub const PAIR_ABI: &str = r#"[
    {"constant":true,"inputs":[],"name":"token0","outputs":[{"name":"","type":"address"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"token1","outputs":[{"name":"","type":"address"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"getReserves","outputs":[{"name":"reserve0","type":"uint112"},{"name":"reserve1","type":"uint112"},{"name":"blockTimestampLast","type":"uint32"}],"type":"function"}
]"#;

/// Router surface: the three state-changing entry points.
pub const ROUTER_ABI: &str = r#"[
    {"constant":false,"inputs":[{"name":"amountIn","type":"uint256"},{"name":"amountOutMin","type":"uint256"},{"name":"path","type":"address[]"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"name":"swapExactTokensForTokens","outputs":[{"name":"amounts","type":"uint256[]"}],"type":"function"},
    {"constant":false,"inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"},{"name":"amountADesired","type":"uint256"},{"name":"amountBDesired","type":"uint256"},{"name":"amountAMin","type":"uint256"},{"name":"amountBMin","type":"uint256"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"name":"addLiquidity","outputs":[{"name":"amountA","type":"uint256"},{"name":"amountB","type":"uint256"},{"name":"liquidity","type":"uint256"}],"type":"function"},
    {"constant":false,"inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"},{"name":"liquidity","type":"uint256"},{"name":"amountAMin","type":"uint256"},{"name":"amountBMin","type":"uint256"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"name":"removeLiquidity","outputs":[{"name":"amountA","type":"uint256"},{"name":"amountB","type":"uint256"}],"type":"function"}
]"#;

/// Pair Swap event ABI definition
/// event Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to)
pub fn swap_event() -> Event {
    Event {
        name: "Swap".to_string(),
        inputs: vec![
            EventParam {
                name: "sender".to_string(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "amount0In".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
            EventParam {
                name: "amount1In".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
            EventParam {
                name: "amount0Out".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
            EventParam {
                name: "amount1Out".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
            EventParam {
                name: "to".to_string(),
                kind: ParamType::Address,
                indexed: true,
            },
        ],
        anonymous: false,
    }
}

/// Topic0 of the pair Swap event.
pub fn swap_topic() -> H256 {
    swap_event().signature()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abis_load() {
        for (name, json) in [
            ("erc20", ERC20_ABI),
            ("factory", FACTORY_ABI),
            ("pair", PAIR_ABI),
            ("router", ROUTER_ABI),
        ] {
            ethabi::Contract::load(json.as_bytes()).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn swap_topic_is_canonical() {
        // keccak256("Swap(address,uint256,uint256,uint256,uint256,address)")
        let expected: H256 = "d78ad95fa46c994b6551d0da85fc275fe613ce37657fb8d5e3d130840159d822"
            .parse()
            .unwrap();
        assert_eq!(swap_topic(), expected);
    }

    #[test]
    fn router_functions_present() {
        let router = ethabi::Contract::load(ROUTER_ABI.as_bytes()).unwrap();
        for name in ["swapExactTokensForTokens", "addLiquidity", "removeLiquidity"] {
            assert!(router.function(name).is_ok(), "missing {name}");
        }
    }
}
