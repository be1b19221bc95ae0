use clap::Parser;

mod app;
mod cli;
mod config;
mod core;
mod dispatch;
mod history;
mod providers;
mod server;

use crate::app::Application;
use crate::cli::Args;
use crate::config::Config;
use crate::core::error::RelayError;

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_logging(&args.log_level)?;

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env();
    config.apply_args(&args);
    config.validate()?;

    Application::new(config).await?.run().await
}

fn init_logging(level: &str) -> Result<(), RelayError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .map_err(|e| RelayError::Config(format!("Invalid log filter '{}': {}", level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
