//! lectern CLI entrypoint

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lectern::cli::Cli;
use lectern::config;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins over the configured filter
    let filter = config::config()
        .map(|cfg| cfg.log_filter.clone())
        .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Parse and execute CLI
    let cli = Cli::parse();
    cli.execute().await
}
