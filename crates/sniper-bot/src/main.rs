//! Whale Sniper - Entry Point
//!
//! Streams limit-depth snapshots, renders the book and pushes wall and
//! spread-spike alerts to Telegram.

use anyhow::Result;
use clap::Parser;
use sniper_bot::config::CONFIG_ENV;
use sniper_bot::{AppConfig, Application, Secrets};
use std::path::Path;
use tracing::{error, info, warn};

/// Order-book whale and spread-spike alert bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SNIPER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Environment file with the Telegram credentials
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Disable the terminal order-book view
    #[arg(long)]
    no_render: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Mutates the process environment, so it runs before the runtime
    // starts any worker thread.
    let env_vars = sniper_bot::env_file::load_env_file(&args.env_file)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args, env_vars))
}

async fn run(args: Args, env_vars: usize) -> Result<()> {
    // TLS crypto provider must be installed before any connection
    sniper_ws::init_crypto();

    let config_path = AppConfig::resolve_path(args.config);
    let mut config = AppConfig::load(&config_path)?;
    if args.no_render {
        config.render.enabled = false;
    }

    sniper_telemetry::init_logging(config.log_file().map(Path::new))?;

    info!("Starting Whale Sniper v{}", env!("CARGO_PKG_VERSION"));
    info!(config_path = %config_path, env_file = %args.env_file, env_vars, "Loading configuration");
    if !Path::new(&config_path).exists() {
        warn!(
            config_path = %config_path,
            env = CONFIG_ENV,
            "Config file not found, using built-in defaults"
        );
    }
    config.validate()?;
    info!(ws_url = %config.ws_url, markets = ?config.markets, "Configuration loaded");

    let secrets = match Secrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => {
            error!(error = %e, "Missing Telegram credentials");
            return Err(e.into());
        }
    };

    Application::new(config, secrets)?.run().await?;

    info!("Whale Sniper stopped");
    Ok(())
}
