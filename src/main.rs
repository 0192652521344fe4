//! # Desk
//!
//! A custodial trading service that executes fixed-route buy and sell swaps
//! for chat-session wallets.
use clap::Parser;
use desk::cli::Args;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    Args::parse().run().await
}
