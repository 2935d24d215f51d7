//! # Swapdesk Centralized Configuration
//!
//! This crate provides configuration management and deployment constants
//! for the Swapdesk services, keeping addresses, token metadata and
//! trading parameters out of call sites.
//!
//! ## Features
//!
//! - **Blockchain Constants**: Factory/router addresses, token registry,
//!   protocol defaults for the fork deployment
//! - **Gateway Settings**: JSON file loading, `SWAPDESK_*` environment
//!   overrides, full parameter validation
//!
//! ## Usage
//!
//! ```rust
//! use config::{blockchain, GatewayConfig};
//!
//! let dai = blockchain::find_token("DAI").expect("registry token");
//! assert_eq!(dai.decimals, 18);
//!
//! let settings = GatewayConfig::from_env();
//! settings.validate().expect("valid settings");
//! ```

pub mod blockchain;
pub mod settings;

// Re-export commonly used types
pub use blockchain::{find_token, find_token_by_address, KnownToken, TOKEN_REGISTRY};
pub use settings::{
    parse_address, ChainSettings, GatewayConfig, InterpreterSettings, TradingSettings,
};
