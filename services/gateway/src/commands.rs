//! Typed commands decoded from interpreter function calls
//!
//! The interpreter service returns loosely-typed function calls. This
//! module decodes them into a closed [`Command`] set up front, so every
//! downstream flow works with resolved tokens and validated arguments,
//! then routes each command to the orchestrator or the read-only
//! reserve and history queries. Dispatch never returns an error: every
//! failure becomes a chat line with the wording the flow owns.

use std::str::FromStr;

use chain::{ChainContext, ReserveReader, SwapHistory};
use config::blockchain::{self, KnownToken};
use config::settings::TradingSettings;
use serde_json::Value;
use swapdesk_amm::units;
use tracing::debug;

use crate::error::GatewayError;
use crate::interpreter::FunctionCall;
use crate::orchestrator::{
    AddLiquidityRequest, RemoveLiquidityRequest, SwapRequest, TransactionOrchestrator, LP_DECIMALS,
};
use crate::status::StatusSink;

/// Lookback window for event queries, parsed from forms like `24h` or `7d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    label: String,
    secs: u64,
}

impl Period {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Window size in blocks at the configured block cadence.
    pub fn lookback_blocks(&self) -> u64 {
        (self.secs / blockchain::defaults::SECONDS_PER_BLOCK).max(1)
    }
}

impl FromStr for Period {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unit = trimmed.chars().next_back().ok_or_else(|| bad_period(s))?;
        let value: u64 = trimmed[..trimmed.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| bad_period(s))?;
        if value == 0 {
            return Err(bad_period(s));
        }
        let secs = match unit.to_ascii_lowercase() {
            'h' => value * 3_600,
            'd' => value * 86_400,
            _ => return Err(bad_period(s)),
        };
        Ok(Self { label: trimmed.to_string(), secs })
    }
}

fn bad_period(raw: &str) -> GatewayError {
    GatewayError::InvalidArgument(format!(
        "unrecognized period '{raw}', expected forms like '24h' or '7d'"
    ))
}

/// Everything the gateway knows how to execute.
#[derive(Debug, Clone)]
pub enum Command {
    Swap(SwapRequest),
    AddLiquidity(AddLiquidityRequest),
    RemoveLiquidity(RemoveLiquidityRequest),
    QueryReserves { token_a: KnownToken, token_b: KnownToken },
    SwapCount { token_a: KnownToken, token_b: KnownToken, period: Period },
}

impl Command {
    /// Decode one interpreter function call. Tokens are resolved against
    /// the registry here; the first unknown symbol is the one reported.
    pub fn from_call(call: &FunctionCall, defaults: &TradingSettings) -> Result<Self, GatewayError> {
        let args = Args(&call.arguments);
        match call.name.as_str() {
            "swap_tokens" => Ok(Command::Swap(SwapRequest {
                token_in: args.token("tokenIn")?,
                token_out: args.token("tokenOut")?,
                amount_in: args.amount("amountIn")?,
                slippage_pct: args.slippage(defaults.default_slippage_pct)?,
            })),
            "add_liquidity" => Ok(Command::AddLiquidity(AddLiquidityRequest {
                token_a: args.token("tokenA")?,
                token_b: args.token("tokenB")?,
                amount_a: args.amount("amountA")?,
                amount_b: args.amount("amountB")?,
                slippage_pct: args.slippage(defaults.default_slippage_pct)?,
            })),
            "remove_liquidity" => Ok(Command::RemoveLiquidity(RemoveLiquidityRequest {
                token_a: args.token("tokenA")?,
                token_b: args.token("tokenB")?,
                lp_amount: args.amount("lpAmount")?,
                slippage_pct: args.slippage(defaults.default_slippage_pct)?,
            })),
            "get_pool_reserves" => Ok(Command::QueryReserves {
                token_a: args.token("tokenA")?,
                token_b: args.token("tokenB")?,
            }),
            "get_swap_count" => Ok(Command::SwapCount {
                token_a: args.token("tokenA")?,
                token_b: args.token("tokenB")?,
                period: args.string("period")?.parse()?,
            }),
            other => Err(GatewayError::UnknownCommand(other.to_string())),
        }
    }
}

/// Field access over the interpreter's argument object.
struct Args<'a>(&'a Value);

impl Args<'_> {
    fn string(&self, key: &str) -> Result<&str, GatewayError> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::InvalidArgument(format!("missing argument '{key}'")))
    }

    fn token(&self, key: &str) -> Result<KnownToken, GatewayError> {
        let symbol = self.string(key)?;
        blockchain::find_token(symbol)
            .copied()
            .ok_or_else(|| GatewayError::UnknownToken(symbol.to_string()))
    }

    /// Amounts arrive as JSON numbers or strings; both are carried as the
    /// human-readable string the unit parser takes.
    fn amount(&self, key: &str) -> Result<String, GatewayError> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(GatewayError::InvalidArgument(format!(
                "argument '{key}' must be a numeric amount"
            ))),
        }
    }

    /// Absent or null falls back to the configured default. An explicit
    /// zero is honored.
    fn slippage(&self, default_pct: f64) -> Result<f64, GatewayError> {
        match self.0.get("slippageTolerance") {
            None | Some(Value::Null) => Ok(default_pct),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(bad_slippage),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| bad_slippage()),
            Some(_) => Err(bad_slippage()),
        }
    }
}

fn bad_slippage() -> GatewayError {
    GatewayError::InvalidArgument("argument 'slippageTolerance' must be a number".into())
}

/// Routes decoded commands to the flows and reports every outcome as a
/// chat line.
pub struct CommandRouter {
    ctx: ChainContext,
    orchestrator: TransactionOrchestrator,
    history: SwapHistory,
    trading: TradingSettings,
    status: StatusSink,
}

impl CommandRouter {
    pub fn new(ctx: ChainContext, trading: TradingSettings, status: StatusSink) -> Self {
        let orchestrator =
            TransactionOrchestrator::new(ctx.clone(), trading.clone(), status.clone());
        let history = SwapHistory::new(ctx.reader.clone(), ctx.factory);
        Self { ctx, orchestrator, history, trading, status }
    }

    /// Decode and run one function call from the interpreter.
    pub async fn dispatch(&self, call: &FunctionCall) {
        debug!(function = %call.name, "dispatching interpreter call");
        match Command::from_call(call, &self.trading) {
            Ok(command) => self.run(command).await,
            Err(e @ GatewayError::UnknownCommand(_)) => self.status.push(e.to_string()),
            Err(e) => self.status.push(format!("Error: {e}")),
        }
    }

    pub async fn run(&self, command: Command) {
        match command {
            Command::Swap(request) => match self.orchestrator.swap(request).await {
                Ok(_) => {}
                Err(e @ GatewayError::NoPool { .. }) => self.status.push(format!("Error: {e}")),
                Err(e) => self.status.push(format!("Error executing swap: {e}")),
            },
            Command::AddLiquidity(request) => {
                if self.ctx.account.is_none() {
                    self.status.push(format!("Error: {}", GatewayError::WalletNotConnected));
                    return;
                }
                if let Err(e) = self.orchestrator.add_liquidity(request).await {
                    self.status.push(format!("Error adding liquidity: {e}"));
                }
            }
            Command::RemoveLiquidity(request) => {
                if self.ctx.account.is_none() {
                    self.status.push(format!("Error: {}", GatewayError::WalletNotConnected));
                    return;
                }
                match self.orchestrator.remove_liquidity(request).await {
                    Ok(_) => {}
                    Err(e @ GatewayError::NoPool { .. }) => {
                        self.status.push(format!("Error: {e}"))
                    }
                    Err(e) => self.status.push(format!("Error removing liquidity: {e}")),
                }
            }
            Command::QueryReserves { token_a, token_b } => {
                self.query_reserves(token_a, token_b).await;
            }
            Command::SwapCount { token_a, token_b, period } => {
                self.swap_count(token_a, token_b, period).await;
            }
        }
    }

    async fn query_reserves(&self, token_a: KnownToken, token_b: KnownToken) {
        self.status.push(format!(
            "Fetching current reserves for {}-{} pool...",
            token_a.symbol, token_b.symbol
        ));

        let reader = ReserveReader::new(self.ctx.reader.clone(), self.ctx.factory);
        let overview = match reader
            .overview(token_a.address, token_b.address, self.ctx.account)
            .await
        {
            Ok(overview) => overview,
            Err(e) => {
                self.status.push(format!("Error fetching pool reserves: {e}"));
                return;
            }
        };

        let Some(reserves) = overview.state.live() else {
            self.status.push(format!(
                "No liquidity pool exists for {}-{}",
                token_a.symbol, token_b.symbol
            ));
            return;
        };

        self.status.push(format!(
            "Current reserves for {}-{} pool:\n      - {}: {:.6}\n      - {}: {:.6}",
            token_a.symbol,
            token_b.symbol,
            token_a.symbol,
            units::to_display(reserves.reserve_a, token_a.decimals),
            token_b.symbol,
            units::to_display(reserves.reserve_b, token_b.decimals),
        ));

        // LP figures are best-effort; the block is skipped when the
        // supply read failed.
        if let Some(total_supply) = overview.lp_total_supply {
            let mut info = format!(
                "Additional pool information:\n        - Pair address: {:?}\n        - Total LP tokens: {:.6}\n        - Last updated: Block timestamp {}",
                reserves.pair,
                units::to_display(total_supply, LP_DECIMALS),
                reserves.block_timestamp_last,
            );
            if let Some(balance) = overview.lp_balance {
                info.push_str(&format!(
                    "\n        - Your LP tokens: {:.6}",
                    units::to_display(balance, LP_DECIMALS)
                ));
            }
            self.status.push(info);
        }
    }

    async fn swap_count(&self, token_a: KnownToken, token_b: KnownToken, period: Period) {
        match self
            .history
            .swap_count(token_a.address, token_b.address, period.lookback_blocks())
            .await
        {
            Ok(None) => self.status.push(format!(
                "No liquidity pool exists for {}-{}",
                token_a.symbol, token_b.symbol
            )),
            Ok(Some(count)) => {
                let noun = if count == 1 { "swap" } else { "swaps" };
                self.status.push(format!(
                    "The {}-{} pool recorded {} {} over the past {}.",
                    token_a.symbol,
                    token_b.symbol,
                    count,
                    noun,
                    period.label()
                ));
            }
            Err(e) => self.status.push(format!("Error counting swaps: {e}")),
        }
    }
}
