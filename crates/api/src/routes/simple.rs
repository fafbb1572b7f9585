//! Positional-feature prediction returning the raw class label.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use model::{ClassLabel, Classifier, FeatureRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AppState, feature_value};
use crate::error::ApiError;
use crate::routes::metrics::record_prediction;

pub const TEST_MESSAGE: &str = "Test route is working!";

#[derive(Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub features: Option<Value>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: Vec<ClassLabel>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /predict — classify a `[number, ...]` feature list.
#[tracing::instrument(skip_all)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = payload?;

    let started = Instant::now();
    let result = label(state.classifier.as_ref(), req.features.as_ref());
    record_prediction(state.variant, result.is_ok(), started.elapsed());

    let label = result?;
    tracing::debug!(%label, "classified feature list");
    Ok(Json(PredictResponse {
        prediction: vec![label],
    }))
}

/// Wraps the list as one unnamed row and asks the classifier for its class.
pub fn label(classifier: &dyn Classifier, features: Option<&Value>) -> Result<ClassLabel, ApiError> {
    let items = features
        .ok_or_else(|| ApiError::Internal("request body has no features".to_string()))?
        .as_array()
        .ok_or_else(|| ApiError::Internal("features must be a list of numbers".to_string()))?;

    let values = items
        .iter()
        .enumerate()
        .map(|(i, v)| feature_value(&i.to_string(), v))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(classifier.predict(&FeatureRow::unnamed(values))?)
}

/// GET /test — constant liveness response.
pub async fn test() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: TEST_MESSAGE,
    })
}
