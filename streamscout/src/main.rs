use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod channel;
mod cli;
mod config;
mod engine;
mod error;
mod output;
mod util;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    cli::Args::parse().run().await
}
