//! HTTP prediction services over a pre-trained success classifier.
//!
//! Two services share this crate:
//! - `balanced`: named features in, positive-class probability and a
//!   class thresholded at 0.4 out, CORS for the local front-ends
//! - `simple`: positional features in, raw class label out, plus a
//!   constant `/test` liveness route
//!
//! Both load the model once at startup, log through `tracing` and expose
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{Config, ServiceVariant};
use routes::AppState;

/// Creates the Axum application router for the configured variant.
pub fn create_app(config: &Config, state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let app = match config.variant {
        ServiceVariant::Balanced => Router::new()
            .route("/predict", post(routes::balanced::predict))
            .route("/health", get(routes::health::check)),
        ServiceVariant::Simple => Router::new()
            .route("/predict", post(routes::simple::predict))
            .route("/test", get(routes::simple::test))
            .route("/health", get(routes::health::check)),
    }
    .with_state(state)
    .merge(metrics_router);

    let app = match config.variant {
        ServiceVariant::Balanced => app.layer(cors_layer(&config.cors_origins)),
        ServiceVariant::Simple => app,
    };

    app.layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
