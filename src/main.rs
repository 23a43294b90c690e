//! Zero-Gas Wallet Sweeper
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use zero_gas_sweeper::block_feed::{BlockFeed, FeedMode};
use zero_gas_sweeper::block_monitor::BlockMonitor;
use zero_gas_sweeper::chain_client::AlloyChainClient;
use zero_gas_sweeper::config::ConfigArgs;
use zero_gas_sweeper::sweeper::SweepController;
use zero_gas_sweeper::types::SweepReport;

#[derive(Parser)]
#[command(name = "zero-gas-sweeper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep on every new block until killed (default)
    Run,

    /// Run a single sweep attempt and exit
    Once {
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(json: bool) {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "zero_gas_sweeper=info".into()),
    );

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match cli.config.validate() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let account = Arc::new(config.account.clone());
    info!("Zero Gas Account: {}", account.address());
    info!("Receiver Wallet: {}", config.receiver);

    let client = Arc::new(
        AlloyChainClient::connect(&config.rpc_url)
            .await
            .context("Failed to connect to RPC endpoint")?,
    );
    info!("Connected to {}", config.rpc_url);

    let controller = Arc::new(SweepController::new(client.clone(), config.receiver));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Once { json } => {
            let outcome = controller.sweep(&account).await;
            let report = SweepReport::new(account.address(), &outcome);
            if json {
                let out = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize sweep report")?;
                println!("{}", out);
            } else {
                info!("Sweep attempt {}: {}", report.status, report.detail);
            }
        }
        Commands::Run => {
            let feed = BlockFeed::new(
                client.provider().clone(),
                FeedMode::for_url(&config.rpc_url),
                config.feed,
            );
            let monitor = BlockMonitor::new(controller, account);

            tokio::select! {
                stats = monitor.run(feed.spawn()) => {
                    warn!(
                        "Block feed closed; swept {} times over {} blocks",
                        stats.submitted, stats.blocks_seen
                    );
                    anyhow::bail!("block feed closed");
                }
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                }
            }
        }
    }

    info!("Sweeper shutdown complete");
    Ok(())
}
