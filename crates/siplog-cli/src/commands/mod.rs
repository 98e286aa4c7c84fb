pub mod anonymize;
pub mod serve;

use anyhow::Result;
use siplog_config::Config;
use siplog_engine::Dispatcher;
use siplog_security::SipRedactor;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::cli::DispatchArgs;

/// Load config and apply command line overrides
pub fn load_config(args: &DispatchArgs) -> Result<Config> {
    let mut config = Config::resolve(args.config.as_deref())?;

    if let Some(strategy) = args.strategy {
        config.dispatch.strategy = strategy;
    }
    if let Some(max_in_flight) = args.max_in_flight {
        config.dispatch.max_in_flight = max_in_flight;
    }

    Ok(config)
}

pub fn build_dispatcher(config: &Config) -> Arc<Dispatcher> {
    let redactor = Arc::new(SipRedactor::new(&config.redaction));
    Arc::new(Dispatcher::new(redactor, config.dispatch.clone()))
}

/// Cancel `token` on SIGINT or SIGTERM
pub fn cancel_on_signal(token: CancellationToken) {
    let signal_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received shutdown signal");
                signal_token.cancel();
            }
            Err(err) => {
                tracing::error!("Error setting up signal handler: {}", err);
            }
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::spawn(async move {
                    sigterm.recv().await;
                    tracing::info!("Received SIGTERM signal");
                    token.cancel();
                });
            }
            Err(err) => {
                tracing::error!("Error setting up SIGTERM handler: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siplog_core::ExecutionStrategy;
    use std::io::Write;

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[dispatch]\nstrategy = \"sequential\"\nmax_in_flight = 2\n").unwrap();

        let args = DispatchArgs {
            config: Some(file.path().to_path_buf()),
            strategy: Some(ExecutionStrategy::FanOut),
            max_in_flight: None,
        };
        let config = load_config(&args).unwrap();

        assert_eq!(config.dispatch.strategy, ExecutionStrategy::FanOut);
        assert_eq!(config.dispatch.max_in_flight, 2);
    }
}
