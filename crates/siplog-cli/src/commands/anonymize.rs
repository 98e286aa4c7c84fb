use anyhow::{Context, Result};
use siplog_config::Config;
use siplog_core::Batch;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use super::{build_dispatcher, cancel_on_signal, load_config};
use crate::cli::DispatchArgs;

pub async fn handle(input: Option<&Path>, pretty: bool, args: &DispatchArgs) -> Result<()> {
    let config = load_config(args)?;
    let raw = read_input(input).await?;

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone());

    let output = anonymize_json(&raw, &config, pretty, &cancel).await?;
    println!("{}", output);
    Ok(())
}

async fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed to read batch from stdin")?;
            Ok(buf)
        }
    }
}

/// Decode, anonymize and re-encode one batch
async fn anonymize_json(
    raw: &[u8],
    config: &Config,
    pretty: bool,
    cancel: &CancellationToken,
) -> Result<String> {
    let batch = Batch::from_json(raw)?;
    tracing::info!(
        entries = batch.len(),
        candidates = batch.candidate_count(),
        strategy = %config.dispatch.strategy,
        "Anonymizing batch"
    );

    let dispatcher = build_dispatcher(config);
    let batch = dispatcher.anonymize(batch, cancel).await?;

    Ok(batch.to_json(pretty)?)
}
