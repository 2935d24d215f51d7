//! Deployment constants and the static token registry
//!
//! Addresses target the mainnet-fork deployment the exchange contracts live
//! on. Everything here is compile-time data; fetching metadata for tokens
//! outside the registry is the chain crate's job.

use ethereum_types::H160;
use once_cell::sync::Lazy;

/// Deployed exchange contract addresses
pub mod contracts {
    /// Pair factory (fork deployment).
    pub const FACTORY: &str = "0x3803FC3f2A9c546129E76Ae34c51CEaAc70b0266";
    /// Swap/liquidity router (fork deployment).
    pub const ROUTER: &str = "0xc2798c4b96F1dAd1413d59290c5dEBC38bFaE427";
}

/// Protocol-level defaults shared by all services
pub mod defaults {
    /// Pool fee in basis points (30 = 0.3%).
    pub const FEE_BPS: u32 = 30;
    /// Slippage tolerance applied when a command omits one, in percent.
    pub const SLIPPAGE_PCT: f64 = 0.5;
    /// Transaction deadline window, seconds from submission.
    pub const DEADLINE_SECS: u64 = 20 * 60;
    /// Receipt polling cadence while waiting for confirmations.
    pub const CONFIRMATION_POLL_MS: u64 = 500;
    /// Give up waiting for a receipt after this long.
    pub const CONFIRMATION_TIMEOUT_SECS: u64 = 60;
    /// How far back swap-history queries look by default.
    pub const HISTORY_LOOKBACK_BLOCKS: u64 = 10_000;
    /// Approximate mainnet cadence, used to map periods onto blocks.
    pub const SECONDS_PER_BLOCK: u64 = 12;
}

/// Known token with its fork-deployment address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownToken {
    pub address: H160,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
}

fn addr(hex: &str) -> H160 {
    hex.trim_start_matches("0x")
        .parse()
        .unwrap_or_else(|_| panic!("bad built-in address {hex}"))
}

/// UI-facing token registry, mainnet addresses.
pub static TOKEN_REGISTRY: Lazy<Vec<KnownToken>> = Lazy::new(|| {
    vec![
        KnownToken {
            address: addr("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            symbol: "WETH",
            name: "Wrapped Ether",
            decimals: 18,
        },
        KnownToken {
            address: addr("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            symbol: "USDC",
            name: "USD Coin",
            decimals: 6,
        },
        KnownToken {
            address: addr("0xdAC17F958D2ee523a2206206994597C13D831ec7"),
            symbol: "USDT",
            name: "Tether USD",
            decimals: 6,
        },
        KnownToken {
            address: addr("0x6B175474E89094C44Da98b954EedeAC495271d0F"),
            symbol: "DAI",
            name: "Dai Stablecoin",
            decimals: 18,
        },
        KnownToken {
            address: addr("0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE"),
            symbol: "SHIB",
            name: "SHIBA INU",
            decimals: 18,
        },
        KnownToken {
            address: addr("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"),
            symbol: "UNI",
            name: "Uniswap",
            decimals: 18,
        },
        KnownToken {
            address: addr("0x514910771AF9Ca656af840dff83E8264EcF986CA"),
            symbol: "LINK",
            name: "ChainLink Token",
            decimals: 18,
        },
        KnownToken {
            address: addr("0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"),
            symbol: "WBTC",
            name: "Wrapped BTC",
            decimals: 8,
        },
    ]
});

/// Resolve a user-supplied symbol to a registry entry.
///
/// Matching is case-insensitive. `ETH` resolves to WETH (swaps route
/// through the wrapped token) and `TETHER` is accepted for USDT.
pub fn find_token(symbol: &str) -> Option<&'static KnownToken> {
    let normalized = symbol.trim().to_uppercase();
    let canonical = match normalized.as_str() {
        "ETH" => "WETH",
        "TETHER" => "USDT",
        other => other,
    };
    TOKEN_REGISTRY.iter().find(|t| t.symbol == canonical)
}

/// Look a token up by its on-chain address.
pub fn find_token_by_address(address: H160) -> Option<&'static KnownToken> {
    TOKEN_REGISTRY.iter().find(|t| t.address == address)
}
