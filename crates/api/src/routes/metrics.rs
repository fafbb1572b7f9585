//! Prometheus metrics endpoint and prediction instrumentation.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServiceVariant;

/// GET /metrics — returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}

/// Records the outcome and latency of one `/predict` call.
pub fn record_prediction(variant: ServiceVariant, success: bool, elapsed: Duration) {
    let outcome = if success { "ok" } else { "error" };
    metrics::counter!(
        "predictions_total",
        "variant" => variant.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("prediction_duration_seconds", "variant" => variant.as_str())
        .record(elapsed.as_secs_f64());
}
