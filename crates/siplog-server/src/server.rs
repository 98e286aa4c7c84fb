use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use siplog_config::ServerConfig;
use siplog_core::{Batch, Error};
use siplog_engine::Dispatcher;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};

use crate::response::ApiError;

pub struct SipLogServer;

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
}

/// Build the HTTP router.
///
/// Batches still running when `shutdown` fires fail with `Cancelled`.
pub fn router(dispatcher: Arc<Dispatcher>, route: &str, shutdown: CancellationToken) -> Router {
    let state = AppState {
        dispatcher,
        shutdown,
    };

    Router::new()
        .route("/", get(handle_info))
        .route(route, post(handle_batch))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl SipLogServer {
    /// Serve until `shutdown` is cancelled, then drain open connections.
    pub async fn serve(
        dispatcher: Arc<Dispatcher>,
        config: &ServerConfig,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            config.route.starts_with('/'),
            "route must start with '/': {}",
            config.route
        );

        let app = router(dispatcher, &config.route, shutdown.clone());

        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!("siplog listening on {} (POST {})", addr, config.route);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("siplog server stopped");

        Ok(())
    }
}

/// GET handler for server info/health check
async fn handle_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let policy = state.dispatcher.policy();
    Json(serde_json::json!({
        "name": "siplog",
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": policy.strategy.to_string(),
        "max_in_flight": policy.effective_max_in_flight(),
    }))
}

/// POST /sip - Anonymize a batch of log entries
async fn handle_batch(
    State(state): State<AppState>,
    payload: Result<Json<Batch>, JsonRejection>,
) -> Result<Json<Batch>, ApiError> {
    let Json(batch) = payload.map_err(|e| Error::MalformedBatch(e.body_text()))?;

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("batch", %request_id, entries = batch.len());
    let cancel = state.shutdown.child_token();

    let batch = state
        .dispatcher
        .anonymize(batch, &cancel)
        .instrument(span)
        .await?;

    Ok(Json(batch))
}
