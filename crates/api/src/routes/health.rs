//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub classes: usize,
    pub n_features: usize,
}

/// GET /health — returns service health and the loaded model's shape.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: state.variant.as_str(),
        classes: state.classifier.classes().len(),
        n_features: state.classifier.n_features(),
    })
}
