//! marginalia - durable highlights and notes for XHTML documents
//!
//! Command-line front end over the `marginalia` library: highlight character
//! spans of a document, annotate them, and resolve stored highlights against
//! the document again later.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marginalia=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    cli::run(cli).await
}
