mod cli;
mod config;

use std::process::ExitCode;

use clap::Parser;
use common::init_logger;
use engine::{CorrelationEngine, CorrelationMonitor, PairRequest, console_handler};
use market::{YahooChartClient, validate_overrides};
use tokio::sync::watch;

use crate::cli::{Cli, resolve_request};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();
    let cfg = AppConfig::from_env();

    init_logger("pairwatch", cfg.json_logs);
    validate_overrides()?;

    let request = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut out = std::io::stdout();
        resolve_request(&args, &mut input, &mut out)?
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?e, "failed to listen for ctrl-c");
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = stop_tx.send(true);
    });

    Ok(monitor_until_stopped(&cfg, request, stop_rx).await)
}

/// Builds the provider and runs the monitor until `shutdown` fires.
///
/// Fails without entering the loop when the provider cannot be built.
async fn monitor_until_stopped(
    cfg: &AppConfig,
    request: PairRequest,
    shutdown: watch::Receiver<bool>,
) -> ExitCode {
    let client = match YahooChartClient::new(&cfg.provider_url, cfg.http_timeout) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "price history provider unavailable");
            eprintln!("Error: could not set up the price history provider: {e}");
            eprintln!("Check that PAIRWATCH_PROVIDER_URL is a valid http(s) URL");
            eprintln!(
                "(default: {}) and that TLS is available.",
                YahooChartClient::DEFAULT_BASE_URL
            );
            return ExitCode::FAILURE;
        }
    };

    println!("\nStarting continuous monitoring... (Press Ctrl+C to stop)");
    println!("Updates will occur every minute when new data is available");

    let engine = CorrelationEngine::new(client).with_slow_fetch_threshold(cfg.slow_fetch);
    let monitor = CorrelationMonitor::new(engine, request, cfg.monitor(), console_handler());

    monitor.run(shutdown).await;

    ExitCode::SUCCESS
}
