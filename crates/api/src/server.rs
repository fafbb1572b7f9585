//! Process startup shared by both service binaries.

use std::sync::Arc;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use model::{Classifier, ModelError};
use thiserror::Error;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, ServiceVariant};
use crate::routes::AppState;

/// Errors that stop a service from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load model: {0}")]
    Model(#[from] ModelError),

    #[error("failed to install Prometheus recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when it parses.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Describes how request rows for `variant` will line up with the model's
/// training columns, when they cannot be checked by name.
///
/// Logged once at startup instead of on every request.
pub fn feature_name_notice(
    variant: ServiceVariant,
    feature_names: Option<&[String]>,
) -> Option<&'static str> {
    match (variant, feature_names) {
        (ServiceVariant::Simple, Some(_)) => Some(
            "model was fitted with feature names; positional rows are scored without a name check",
        ),
        (ServiceVariant::Balanced, None) => Some(
            "model was fitted without feature names; request keys are scored in the order given",
        ),
        _ => None,
    }
}

/// Loads the model, then serves until a shutdown signal arrives.
///
/// The listener is only bound after the model has loaded, so a missing or
/// corrupt artifact never results in a service answering without a model.
pub async fn run(config: Config) -> Result<(), StartupError> {
    // 1. Load the model
    let classifier = model::load_onnx(&config.model_path)?;
    tracing::info!(
        service = %config.variant,
        path = %config.model_path.display(),
        classes = classifier.classes().len(),
        features = classifier.n_features(),
        "model loaded"
    );
    if let Some(notice) = feature_name_notice(config.variant, classifier.feature_names()) {
        tracing::warn!(service = %config.variant, "{notice}");
    }
    let state = Arc::new(AppState::new(config.variant, Arc::new(classifier)));

    // 2. Install Prometheus metrics recorder
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    // 3. Build the application
    let app = crate::create_app(&config, state, metrics_handle);

    // 4. Start server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(%addr, service = %config.variant, "starting prediction service");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["funding_required".to_string(), "team_size".to_string()]
    }

    #[test]
    fn simple_service_notes_unchecked_names_once() {
        let names = names();
        let notice = feature_name_notice(ServiceVariant::Simple, Some(names.as_slice()));
        assert!(notice.unwrap().contains("positional rows"));
        assert!(feature_name_notice(ServiceVariant::Simple, None).is_none());
    }

    #[test]
    fn balanced_service_notes_only_unnamed_models() {
        let names = names();
        assert!(feature_name_notice(ServiceVariant::Balanced, Some(names.as_slice())).is_none());
        let notice = feature_name_notice(ServiceVariant::Balanced, None);
        assert!(notice.unwrap().contains("without feature names"));
    }
}
