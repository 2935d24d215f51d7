//! Interactive chat loop for the swap gateway.
//!
//! Reads free-form requests from stdin, hands them to the interpreter
//! service and routes the returned function calls through the command
//! router. Status updates stream to stdout in submission order.

use std::time::Duration;

use anyhow::{Context, Result};
use chain::ChainContext;
use config::settings::{parse_address, GatewayConfig};
use swap_gateway::{CommandRouter, InterpreterClient, StatusSink};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🚀 Starting Swap Gateway...");

    let config = match std::env::args().nth(1) {
        Some(path) => GatewayConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => GatewayConfig::from_env(),
    };
    config.validate().context("Invalid configuration")?;

    let factory = parse_address(&config.chain.factory).context("Invalid factory address")?;
    let router_contract = parse_address(&config.chain.router).context("Invalid router address")?;
    let account = config.chain.account.as_deref().and_then(parse_address);

    let ctx = ChainContext::connect(&config.chain.rpc_url, factory, router_contract, account)
        .context("Failed to connect to the RPC endpoint")?;
    info!("✅ Chain connection ready at {}", config.chain.rpc_url);
    match account {
        Some(account) => info!("✅ Trading as {account:?}"),
        None => info!("⚠️ No account configured; transactions will be rejected"),
    }

    let interpreter = InterpreterClient::new(
        &config.interpreter.endpoint,
        Duration::from_secs(config.interpreter.request_timeout_secs),
    )
    .context("Failed to set up the interpreter client")?;
    info!("✅ Interpreter endpoint {}", config.interpreter.endpoint);

    let (status, mut updates) = StatusSink::channel();
    let printer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            println!("[{}] {}", update.at.format("%H:%M"), update.line);
        }
    });

    let command_router = CommandRouter::new(ctx, config.trading.clone(), status.clone());

    info!("✅ Swap Gateway ready");
    info!("💬 Type a request (Ctrl-D to exit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        match interpreter.interpret(message).await {
            Ok(reply) if reply.is_function_call() => {
                status.push(
                    reply
                        .message
                        .clone()
                        .unwrap_or_else(|| "Processing your request...".to_string()),
                );
                for function in &reply.functions {
                    command_router.dispatch(function).await;
                }
            }
            Ok(reply) => match reply.message {
                Some(message) => status.push(message),
                None => debug!("interpreter returned an empty reply"),
            },
            Err(e) => status.push(format!("Error processing your request: {e}")),
        }
    }

    info!("👋 Shutting down");
    drop(command_router);
    drop(status);
    let _ = printer.await;

    Ok(())
}
