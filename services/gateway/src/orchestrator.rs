//! Approve, execute, confirm transaction orchestration
//!
//! Every state-changing operation walks the same protocol: validate inputs
//! against fresh chain state, bound the call with slippage minimums and a
//! deadline, submit the required approvals, await each receipt, submit the
//! router call, await its receipt, then refresh the balances the operation
//! touched. The sequencing is plain control flow; a step cannot start
//! before the previous receipt resolved. Failures are terminal for the
//! operation and carry the underlying reason, there is no automatic retry.

use std::time::{Duration, Instant};

use chain::{AddLiquidityCall, ChainContext, ChainError, RemoveLiquidityCall, ReserveReader};
use chrono::{DateTime, Utc};
use config::blockchain::KnownToken;
use config::settings::TradingSettings;
use swapdesk_amm::units;
use swapdesk_amm::{LiquidityMath, PricingEngine, SlippageGuard, U256};
use tracing::{debug, info, warn};
use uuid::Uuid;
use web3::types::{Address, H256};

use crate::error::GatewayError;
use crate::status::StatusSink;

/// LP tokens are minted with 18 decimals regardless of the pair's tokens.
pub(crate) const LP_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
}

/// Lifecycle of one orchestrated operation. `Confirmed` and `Failed` are
/// terminal; everything else may still fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    AwaitingApproval,
    Approved,
    AwaitingExecution,
    Confirmed,
    Failed,
}

impl OperationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationState::Confirmed | OperationState::Failed)
    }

    /// Legal forward transitions. Failure is reachable from every
    /// non-terminal state; nothing leaves a terminal state.
    pub fn permits(self, next: OperationState) -> bool {
        use OperationState::*;
        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Idle, AwaitingApproval)
                | (AwaitingApproval, Approved)
                | (Approved, AwaitingExecution)
                | (AwaitingExecution, Confirmed)
        )
    }
}

/// Per-step trace entry for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionStep {
    pub name: &'static str,
    pub tx_hash: Option<H256>,
    pub duration: Duration,
    pub success: bool,
}

/// One orchestrated operation with its step trace.
#[derive(Debug, Clone)]
pub struct PendingOperation {
    pub id: Uuid,
    pub kind: OperationKind,
    pub state: OperationState,
    pub steps: Vec<ExecutionStep>,
    pub started_at: DateTime<Utc>,
}

impl PendingOperation {
    fn new(kind: OperationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            state: OperationState::Idle,
            steps: Vec::new(),
            started_at: Utc::now(),
        }
    }

    fn transition(&mut self, next: OperationState) {
        debug_assert!(
            self.state.permits(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(op = %self.id, from = ?self.state, to = ?next, "operation transition");
        self.state = next;
    }

    fn record(&mut self, name: &'static str, tx_hash: Option<H256>, started: Instant, success: bool) {
        self.steps.push(ExecutionStep {
            name,
            tx_hash,
            duration: started.elapsed(),
            success,
        });
    }
}

#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub token_in: KnownToken,
    pub token_out: KnownToken,
    /// Human-readable amount, e.g. `"10"` or `"0.25"`.
    pub amount_in: String,
    pub slippage_pct: f64,
}

#[derive(Debug, Clone)]
pub struct AddLiquidityRequest {
    pub token_a: KnownToken,
    pub token_b: KnownToken,
    pub amount_a: String,
    pub amount_b: String,
    pub slippage_pct: f64,
}

#[derive(Debug, Clone)]
pub struct RemoveLiquidityRequest {
    pub token_a: KnownToken,
    pub token_b: KnownToken,
    /// Human-readable LP token amount.
    pub lp_amount: String,
    pub slippage_pct: f64,
}

/// Drives approve→execute→confirm flows against one deployment.
pub struct TransactionOrchestrator {
    ctx: ChainContext,
    trading: TradingSettings,
    status: StatusSink,
}

impl TransactionOrchestrator {
    pub fn new(ctx: ChainContext, trading: TradingSettings, status: StatusSink) -> Self {
        Self { ctx, trading, status }
    }

    /// Swap an exact input amount along the direct pair path.
    pub async fn swap(&self, request: SwapRequest) -> Result<PendingOperation, GatewayError> {
        let mut op = PendingOperation::new(OperationKind::Swap);
        match self.run_swap(&mut op, request).await {
            Ok(()) => Ok(op),
            Err(e) => Err(self.fail(op, e)),
        }
    }

    /// Deposit both tokens. When no pair exists the deposit creates the
    /// pool at the caller's ratio; otherwise the router settles the
    /// optimal subset of the desired amounts above the slippage minimums.
    pub async fn add_liquidity(
        &self,
        request: AddLiquidityRequest,
    ) -> Result<PendingOperation, GatewayError> {
        let mut op = PendingOperation::new(OperationKind::AddLiquidity);
        match self.run_add_liquidity(&mut op, request).await {
            Ok(()) => Ok(op),
            Err(e) => Err(self.fail(op, e)),
        }
    }

    /// Burn LP tokens for the underlying pair tokens.
    pub async fn remove_liquidity(
        &self,
        request: RemoveLiquidityRequest,
    ) -> Result<PendingOperation, GatewayError> {
        let mut op = PendingOperation::new(OperationKind::RemoveLiquidity);
        match self.run_remove_liquidity(&mut op, request).await {
            Ok(()) => Ok(op),
            Err(e) => Err(self.fail(op, e)),
        }
    }

    async fn run_swap(
        &self,
        op: &mut PendingOperation,
        request: SwapRequest,
    ) -> Result<(), GatewayError> {
        let SwapRequest { token_in, token_out, amount_in, slippage_pct } = request;
        let account = self.require_account()?;
        let amount_raw = units::parse_units(&amount_in, token_in.decimals)?;
        if amount_raw.is_zero() {
            return Err(GatewayError::InvalidArgument(
                "swap amount must be greater than zero".into(),
            ));
        }
        op.transition(OperationState::AwaitingApproval);

        self.status.push(format!(
            "Processing swap: {} {} → {}",
            amount_in, token_in.symbol, token_out.symbol
        ));

        let state = self
            .reserve_reader()
            .pair_state(token_in.address, token_out.address)
            .await?;
        let Some(reserves) = state.live().copied() else {
            return Err(no_pool(&token_in, &token_out));
        };

        let balance = self.ctx.reader.balance_of(token_in.address, account).await?;
        if balance < amount_raw {
            return Err(GatewayError::InsufficientBalance {
                token: token_in.symbol.to_string(),
                needed: units::format_units(amount_raw, token_in.decimals),
                available: units::format_units(balance, token_in.decimals),
            });
        }

        // Quote against the freshly read reserves; the minimum bound must
        // never be derived from stale state.
        let quote = PricingEngine::quote(
            reserves.reserve_a,
            reserves.reserve_b,
            amount_raw,
            self.trading.fee_bps,
        )?;
        let min_out = SlippageGuard::minimum_amount(quote.amount_out, slippage_pct)?;
        let quoted_display = units::to_display(quote.amount_out, token_out.decimals);
        debug!(
            amount_out = %quote.amount_out,
            min_out = %min_out,
            impact = %quote.price_impact_pct,
            "swap quoted"
        );

        self.status.push(format!(
            "Executing swap: {} {} → approximately {:.6} {} (slippage: {}%)",
            amount_in, token_in.symbol, quoted_display, token_out.symbol, slippage_pct
        ));

        self.approve_and_confirm(op, "approve input token", token_in.address, amount_raw, account)
            .await?;
        op.transition(OperationState::Approved);
        op.transition(OperationState::AwaitingExecution);

        let started = Instant::now();
        let submitted = self
            .ctx
            .writer
            .swap_exact_tokens_for_tokens(
                self.ctx.router,
                amount_raw,
                min_out,
                vec![token_in.address, token_out.address],
                account,
                self.deadline(),
                account,
            )
            .await;
        self.execute_and_confirm(op, "swapExactTokensForTokens", started, submitted).await?;
        op.transition(OperationState::Confirmed);

        self.refresh_balances(account, &[token_in, token_out], None).await;
        self.status.push(format!(
            "Swap completed: {} {} → {:.6} {}",
            amount_in, token_in.symbol, quoted_display, token_out.symbol
        ));
        info!(op = %op.id, "swap confirmed");
        Ok(())
    }

    async fn run_add_liquidity(
        &self,
        op: &mut PendingOperation,
        request: AddLiquidityRequest,
    ) -> Result<(), GatewayError> {
        let AddLiquidityRequest { token_a, token_b, amount_a, amount_b, slippage_pct } = request;
        let account = self.require_account()?;
        let amount_a_raw = units::parse_units(&amount_a, token_a.decimals)?;
        let amount_b_raw = units::parse_units(&amount_b, token_b.decimals)?;
        if amount_a_raw.is_zero() || amount_b_raw.is_zero() {
            return Err(GatewayError::InvalidArgument(
                "deposit amounts must be greater than zero".into(),
            ));
        }
        op.transition(OperationState::AwaitingApproval);

        self.status.push(format!(
            "Adding liquidity: {} {} + {} {} (slippage: {}%)",
            amount_a, token_a.symbol, amount_b, token_b.symbol, slippage_pct
        ));

        let state = self
            .reserve_reader()
            .pair_state(token_a.address, token_b.address)
            .await?;
        match state.live() {
            None => {
                self.status.push(format!(
                    "No pool exists yet for {}-{}; this deposit will create it at your chosen ratio.",
                    token_a.symbol, token_b.symbol
                ));
            }
            Some(reserves) if reserves.is_empty() => {
                self.status.push(format!(
                    "The {}-{} pool is empty; this deposit sets the initial price.",
                    token_a.symbol, token_b.symbol
                ));
            }
            Some(reserves) => {
                // Advisory only. The router settles whatever optimal subset
                // of the desired amounts clears the minimums.
                if let Ok(optimal_b) = LiquidityMath::optimal_paired_amount(
                    reserves.reserve_a,
                    reserves.reserve_b,
                    amount_a_raw,
                ) {
                    debug!(
                        optimal_b = %optimal_b,
                        desired_b = %amount_b_raw,
                        "pool-ratio counterpart for desired deposit"
                    );
                }
            }
        }

        let min_a = SlippageGuard::minimum_amount(amount_a_raw, slippage_pct)?;
        let min_b = SlippageGuard::minimum_amount(amount_b_raw, slippage_pct)?;

        self.approve_and_confirm(op, "approve token A", token_a.address, amount_a_raw, account)
            .await?;
        // A failure here leaves the first approval outstanding; the
        // operation still fails without touching the router.
        self.approve_and_confirm(op, "approve token B", token_b.address, amount_b_raw, account)
            .await?;
        op.transition(OperationState::Approved);
        op.transition(OperationState::AwaitingExecution);

        self.status.push("Adding liquidity...");
        let started = Instant::now();
        let submitted = self
            .ctx
            .writer
            .add_liquidity(
                self.ctx.router,
                AddLiquidityCall {
                    token_a: token_a.address,
                    token_b: token_b.address,
                    amount_a_desired: amount_a_raw,
                    amount_b_desired: amount_b_raw,
                    amount_a_min: min_a,
                    amount_b_min: min_b,
                    to: account,
                    deadline: self.deadline(),
                },
                account,
            )
            .await;
        self.execute_and_confirm(op, "addLiquidity", started, submitted).await?;
        op.transition(OperationState::Confirmed);

        let pair = self
            .reserve_reader()
            .pair_address(token_a.address, token_b.address)
            .await
            .ok()
            .flatten();
        self.refresh_balances(account, &[token_a, token_b], pair).await;
        self.status.push(format!(
            "Liquidity added: {} {} + {} {}.",
            amount_a, token_a.symbol, amount_b, token_b.symbol
        ));
        info!(op = %op.id, "liquidity added");
        Ok(())
    }

    async fn run_remove_liquidity(
        &self,
        op: &mut PendingOperation,
        request: RemoveLiquidityRequest,
    ) -> Result<(), GatewayError> {
        let RemoveLiquidityRequest { token_a, token_b, lp_amount, slippage_pct } = request;
        let account = self.require_account()?;
        let lp_raw = units::parse_units(&lp_amount, LP_DECIMALS)?;
        if lp_raw.is_zero() {
            return Err(GatewayError::InvalidArgument(
                "LP amount must be greater than zero".into(),
            ));
        }
        op.transition(OperationState::AwaitingApproval);

        let state = self
            .reserve_reader()
            .pair_state(token_a.address, token_b.address)
            .await?;
        let Some(reserves) = state.live().copied() else {
            return Err(no_pool(&token_a, &token_b));
        };

        let lp_balance = self.ctx.reader.balance_of(reserves.pair, account).await?;
        if lp_raw > lp_balance {
            return Err(GatewayError::InsufficientBalance {
                token: format!("{}-{} LP", token_a.symbol, token_b.symbol),
                needed: units::format_units(lp_raw, LP_DECIMALS),
                available: units::format_units(lp_balance, LP_DECIMALS),
            });
        }

        let total_supply = self.ctx.reader.total_supply(reserves.pair).await?;
        let (expected_a, expected_b) = LiquidityMath::withdrawal_amounts(
            reserves.reserve_a,
            reserves.reserve_b,
            total_supply,
            lp_raw,
        )?;
        let min_a = SlippageGuard::minimum_amount(expected_a, slippage_pct)?;
        let min_b = SlippageGuard::minimum_amount(expected_b, slippage_pct)?;

        let expected_a_display = units::to_display(expected_a, token_a.decimals);
        let expected_b_display = units::to_display(expected_b, token_b.decimals);
        self.status.push(format!(
            "Removing liquidity: {} LP tokens → approximately {:.6} {} + {:.6} {} (slippage: {}%)",
            lp_amount,
            expected_a_display,
            token_a.symbol,
            expected_b_display,
            token_b.symbol,
            slippage_pct
        ));

        // The LP token lives at the pair address and is approved like any
        // other ERC20.
        self.approve_and_confirm(op, "approve LP tokens", reserves.pair, lp_raw, account).await?;
        op.transition(OperationState::Approved);
        op.transition(OperationState::AwaitingExecution);

        let started = Instant::now();
        let submitted = self
            .ctx
            .writer
            .remove_liquidity(
                self.ctx.router,
                RemoveLiquidityCall {
                    token_a: token_a.address,
                    token_b: token_b.address,
                    liquidity: lp_raw,
                    amount_a_min: min_a,
                    amount_b_min: min_b,
                    to: account,
                    deadline: self.deadline(),
                },
                account,
            )
            .await;
        self.execute_and_confirm(op, "removeLiquidity", started, submitted).await?;
        op.transition(OperationState::Confirmed);

        self.refresh_balances(account, &[token_a, token_b], Some(reserves.pair)).await;
        self.status.push(format!(
            "Liquidity removed: {} LP tokens → approximately {:.6} {} + {:.6} {}.",
            lp_amount, expected_a_display, token_a.symbol, expected_b_display, token_b.symbol
        ));
        info!(op = %op.id, "liquidity removed");
        Ok(())
    }

    /// Settle a failed operation from whichever state it reached.
    fn fail(&self, mut op: PendingOperation, e: GatewayError) -> GatewayError {
        if !op.state.is_terminal() {
            op.transition(OperationState::Failed);
        }
        warn!(op = %op.id, kind = ?op.kind, error = %e, "operation failed");
        e
    }

    fn reserve_reader(&self) -> ReserveReader {
        ReserveReader::new(self.ctx.reader.clone(), self.ctx.factory)
    }

    fn require_account(&self) -> Result<Address, GatewayError> {
        self.ctx.account.ok_or(GatewayError::WalletNotConnected)
    }

    fn deadline(&self) -> U256 {
        U256::from(Utc::now().timestamp() as u64 + self.trading.deadline_secs)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.trading.confirmation_poll_ms)
    }

    fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.trading.confirmation_timeout_secs)
    }

    /// Submit an ERC20 approval for the router and await its receipt.
    async fn approve_and_confirm(
        &self,
        op: &mut PendingOperation,
        step: &'static str,
        token: Address,
        amount: U256,
        owner: Address,
    ) -> Result<(), GatewayError> {
        self.status.push(format!("Requesting approval for token {token:?}..."));
        let started = Instant::now();

        let tx = match self.ctx.writer.approve(token, self.ctx.router, amount, owner).await {
            Ok(tx) => tx,
            Err(e) => {
                op.record(step, None, started, false);
                return Err(self.approval_failed(token, e.to_string()));
            }
        };

        match self
            .ctx
            .writer
            .wait_confirmed(tx, self.poll_interval(), self.confirmation_timeout())
            .await
        {
            Ok(outcome) if outcome.success => {
                op.record(step, Some(tx), started, true);
                self.status.push(format!(
                    "Token {token:?} approved for spending by {:?}.",
                    self.ctx.router
                ));
                Ok(())
            }
            Ok(_) => {
                op.record(step, Some(tx), started, false);
                Err(self.approval_failed(token, format!("approval transaction {tx:?} reverted")))
            }
            Err(e) => {
                op.record(step, Some(tx), started, false);
                Err(self.approval_failed(token, e.to_string()))
            }
        }
    }

    fn approval_failed(&self, token: Address, reason: String) -> GatewayError {
        self.status.push(format!("Error approving token {token:?}: {reason}"));
        GatewayError::ApprovalRejected(reason)
    }

    /// Await the receipt of an already-submitted router call.
    async fn execute_and_confirm(
        &self,
        op: &mut PendingOperation,
        step: &'static str,
        started: Instant,
        submitted: Result<H256, ChainError>,
    ) -> Result<H256, GatewayError> {
        let tx = match submitted {
            Ok(tx) => tx,
            Err(e) => {
                op.record(step, None, started, false);
                return Err(e.into());
            }
        };

        match self
            .ctx
            .writer
            .wait_confirmed(tx, self.poll_interval(), self.confirmation_timeout())
            .await
        {
            Ok(outcome) if outcome.success => {
                op.record(step, Some(tx), started, true);
                debug!(op = %op.id, step, ?tx, block = ?outcome.block_number, "confirmed");
                Ok(tx)
            }
            Ok(_) => {
                op.record(step, Some(tx), started, false);
                Err(GatewayError::ExecutionReverted { tx })
            }
            Err(e) => {
                op.record(step, Some(tx), started, false);
                Err(e.into())
            }
        }
    }

    /// Post-confirmation refresh of the balances and reserves the
    /// operation touched. Display-only, so failures degrade to a log line.
    async fn refresh_balances(
        &self,
        account: Address,
        tokens: &[KnownToken],
        pair: Option<Address>,
    ) {
        for token in tokens {
            match self.ctx.reader.balance_of(token.address, account).await {
                Ok(balance) => {
                    debug!(symbol = token.symbol, balance = %balance, "balance refreshed")
                }
                Err(e) => debug!(symbol = token.symbol, error = %e, "balance refresh failed"),
            }
        }
        if let Some(pair) = pair {
            match self.ctx.reader.balance_of(pair, account).await {
                Ok(balance) => debug!(lp_balance = %balance, "lp balance refreshed"),
                Err(e) => debug!(error = %e, "lp balance refresh failed"),
            }
        }
        if tokens.len() == 2 {
            if let Err(e) = self
                .reserve_reader()
                .pair_state(tokens[0].address, tokens[1].address)
                .await
            {
                debug!(error = %e, "reserve refresh failed");
            }
        }
    }
}

fn no_pool(token_a: &KnownToken, token_b: &KnownToken) -> GatewayError {
    GatewayError::NoPool {
        token_a: token_a.symbol.to_string(),
        token_b: token_b.symbol.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_permit_nothing() {
        use OperationState::*;
        for next in [Idle, AwaitingApproval, Approved, AwaitingExecution, Confirmed, Failed] {
            assert!(!Confirmed.permits(next), "Confirmed -> {next:?}");
            assert!(!Failed.permits(next), "Failed -> {next:?}");
        }
    }

    #[test]
    fn the_happy_path_is_legal() {
        use OperationState::*;
        assert!(Idle.permits(AwaitingApproval));
        assert!(AwaitingApproval.permits(Approved));
        assert!(Approved.permits(AwaitingExecution));
        assert!(AwaitingExecution.permits(Confirmed));
    }

    #[test]
    fn failure_is_reachable_from_every_live_state() {
        use OperationState::*;
        for live in [Idle, AwaitingApproval, Approved, AwaitingExecution] {
            assert!(live.permits(Failed), "{live:?} -> Failed");
        }
    }

    #[test]
    fn phases_cannot_be_skipped() {
        use OperationState::*;
        assert!(!Idle.permits(Approved));
        assert!(!AwaitingApproval.permits(AwaitingExecution));
        assert!(!AwaitingApproval.permits(Confirmed));
        assert!(!Approved.permits(Confirmed));
    }

    #[test]
    fn new_operations_start_idle() {
        let op = PendingOperation::new(OperationKind::Swap);
        assert_eq!(op.state, OperationState::Idle);
        assert!(op.steps.is_empty());
        assert!(!op.state.is_terminal());
    }
}
