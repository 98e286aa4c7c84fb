mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout carries anonymized batches
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Serve { host, port, dispatch } => {
            commands::serve::handle(host, port, &dispatch).await
        }
        cli::Commands::Anonymize {
            input,
            pretty,
            dispatch,
        } => commands::anonymize::handle(input.as_deref(), pretty, &dispatch).await,
    }
}
