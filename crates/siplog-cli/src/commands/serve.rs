use anyhow::Result;
use siplog_server::SipLogServer;
use tokio_util::sync::CancellationToken;

use super::{build_dispatcher, cancel_on_signal, load_config};
use crate::cli::DispatchArgs;

pub async fn handle(host: Option<String>, port: Option<u16>, args: &DispatchArgs) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!(
        strategy = %config.dispatch.strategy,
        max_in_flight = config.dispatch.effective_max_in_flight(),
        timeout_ms = config.dispatch.timeout_ms,
        "Starting siplog"
    );

    let dispatcher = build_dispatcher(&config);

    // Owned here: signals cancel it, the server drains and in-flight batches abort
    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone());

    SipLogServer::serve(dispatcher, &config.server, shutdown).await?;

    tracing::info!("Finished");
    Ok(())
}
