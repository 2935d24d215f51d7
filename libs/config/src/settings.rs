//! Gateway runtime settings
//!
//! Runtime parameter management for the gateway service: JSON file loading,
//! environment variable overrides and validation, with production-ready
//! defaults for the fork deployment. No value used by the trading path is
//! hardcoded at call sites.

use ethereum_types::H160;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::blockchain::{contracts, defaults};

/// Complete configuration for the gateway service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Chain endpoint and contract addresses
    pub chain: ChainSettings,
    /// Natural-language interpreter endpoint
    pub interpreter: InterpreterSettings,
    /// Quoting and transaction parameters
    pub trading: TradingSettings,
}

/// RPC endpoint and deployed contract addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    /// HTTP JSON-RPC endpoint of the fork node
    pub rpc_url: String,
    /// Pair factory address
    pub factory: String,
    /// Swap/liquidity router address
    pub router: String,
    /// Active account; transactions are signed node-side for this address
    pub account: Option<String>,
}

/// Interpreter service connectivity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterSettings {
    /// Full URL of the message-processing endpoint
    pub endpoint: String,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
}

/// Parameters of the quoting and transaction path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSettings {
    /// Pool fee in basis points (30 = 0.3%)
    pub fee_bps: u32,
    /// Slippage tolerance when a command omits one (percent)
    pub default_slippage_pct: f64,
    /// Transaction deadline window (seconds from submission)
    pub deadline_secs: u64,
    /// Receipt polling interval (milliseconds)
    pub confirmation_poll_ms: u64,
    /// Receipt wait timeout (seconds)
    pub confirmation_timeout_secs: u64,
    /// Swap-history lookback (blocks)
    pub history_lookback_blocks: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            chain: ChainSettings::default(),
            interpreter: InterpreterSettings::default(),
            trading: TradingSettings::default(),
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            factory: contracts::FACTORY.to_string(),
            router: contracts::ROUTER.to_string(),
            account: None,
        }
    }
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3001/api/process-nl".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            fee_bps: defaults::FEE_BPS,
            default_slippage_pct: defaults::SLIPPAGE_PCT,
            deadline_secs: defaults::DEADLINE_SECS,
            confirmation_poll_ms: defaults::CONFIRMATION_POLL_MS,
            confirmation_timeout_secs: defaults::CONFIRMATION_TIMEOUT_SECS,
            history_lookback_blocks: defaults::HISTORY_LOOKBACK_BLOCKS,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        info!("Loading gateway config: {}", path);
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rpc_url) = std::env::var("SWAPDESK_RPC_URL") {
            config.chain.rpc_url = rpc_url;
        }
        if let Ok(factory) = std::env::var("SWAPDESK_FACTORY") {
            config.chain.factory = factory;
        }
        if let Ok(router) = std::env::var("SWAPDESK_ROUTER") {
            config.chain.router = router;
        }
        if let Ok(account) = std::env::var("SWAPDESK_ACCOUNT") {
            config.chain.account = Some(account);
        }
        if let Ok(endpoint) = std::env::var("SWAPDESK_INTERPRETER_URL") {
            config.interpreter.endpoint = endpoint;
        }
        if let Ok(slippage) = std::env::var("SWAPDESK_SLIPPAGE_PCT") {
            match slippage.parse::<f64>() {
                Ok(value) => config.trading.default_slippage_pct = value,
                Err(_) => warn!("Ignoring non-numeric SWAPDESK_SLIPPAGE_PCT: {:?}", slippage),
            }
        }
        if let Ok(deadline) = std::env::var("SWAPDESK_DEADLINE_SECS") {
            match deadline.parse::<u64>() {
                Ok(value) => config.trading.deadline_secs = value,
                Err(_) => warn!("Ignoring non-numeric SWAPDESK_DEADLINE_SECS: {:?}", deadline),
            }
        }
        if let Ok(lookback) = std::env::var("SWAPDESK_HISTORY_LOOKBACK") {
            match lookback.parse::<u64>() {
                Ok(value) => config.trading.history_lookback_blocks = value,
                Err(_) => warn!("Ignoring non-numeric SWAPDESK_HISTORY_LOOKBACK: {:?}", lookback),
            }
        }

        config
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chain.rpc_url.is_empty() {
            anyhow::bail!("rpc_url must not be empty");
        }
        if parse_address(&self.chain.factory).is_none() {
            anyhow::bail!("Invalid factory address format");
        }
        if parse_address(&self.chain.router).is_none() {
            anyhow::bail!("Invalid router address format");
        }
        if let Some(account) = &self.chain.account {
            if parse_address(account).is_none() {
                anyhow::bail!("Invalid account address format");
            }
        }

        if self.interpreter.endpoint.is_empty() {
            anyhow::bail!("interpreter endpoint must not be empty");
        }
        if self.interpreter.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }

        if self.trading.fee_bps >= 10_000 {
            anyhow::bail!("fee_bps must be below 10000 (100%)");
        }
        if !(0.0..100.0).contains(&self.trading.default_slippage_pct) {
            anyhow::bail!("default_slippage_pct must be in [0, 100)");
        }
        if self.trading.deadline_secs == 0 {
            anyhow::bail!("deadline_secs must be positive");
        }
        if self.trading.confirmation_poll_ms == 0 {
            anyhow::bail!("confirmation_poll_ms must be positive");
        }
        if self.trading.confirmation_timeout_secs == 0 {
            anyhow::bail!("confirmation_timeout_secs must be positive");
        }
        if self.trading.history_lookback_blocks == 0 {
            anyhow::bail!("history_lookback_blocks must be positive");
        }

        Ok(())
    }
}

/// Parse a `0x`-prefixed (or bare) hex address.
pub fn parse_address(value: &str) -> Option<H160> {
    value.trim().trim_start_matches("0x").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_round_trip_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.json");
        let path = path.to_str().unwrap();

        let mut config = GatewayConfig::default();
        config.trading.deadline_secs = 900;
        config.chain.account = Some("0x91c2F30bc8f156B345B166c9b1F31C4acf7f2163".to_string());
        config.save_to_file(path).unwrap();

        let loaded = GatewayConfig::from_file(path).unwrap();
        assert_eq!(loaded.trading.deadline_secs, 900);
        assert_eq!(loaded.chain.account, config.chain.account);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn env_overrides_apply() {
        std::env::set_var("SWAPDESK_RPC_URL", "http://10.0.0.5:8545");
        std::env::set_var("SWAPDESK_SLIPPAGE_PCT", "1.25");

        let config = GatewayConfig::from_env();
        assert_eq!(config.chain.rpc_url, "http://10.0.0.5:8545");
        assert!((config.trading.default_slippage_pct - 1.25).abs() < f64::EPSILON);

        std::env::remove_var("SWAPDESK_RPC_URL");
        std::env::remove_var("SWAPDESK_SLIPPAGE_PCT");
    }

    #[test]
    fn bad_addresses_fail_validation() {
        let mut config = GatewayConfig::default();
        config.chain.router = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.chain.account = Some("0x123".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_slippage_fails_validation() {
        let mut config = GatewayConfig::default();
        config.trading.default_slippage_pct = 100.0;
        assert!(config.validate().is_err());
    }
}
