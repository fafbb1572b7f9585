//! Named-feature prediction with a thresholded positive class.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use model::{Classifier, FeatureRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AppState, feature_value};
use crate::error::ApiError;
use crate::routes::metrics::record_prediction;

/// Probability at or above which a row is classified as a success.
pub const POSITIVE_CLASS_THRESHOLD: f64 = 0.4;

/// Index of the positive class in the classifier's probability output.
const POSITIVE_CLASS_INDEX: usize = 1;

pub const NO_FEATURES_MESSAGE: &str = "No features provided in the request body";

// -- Request types --

#[derive(Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub features: Option<Value>,
}

// -- Response types --

#[derive(Debug, Serialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: u8,
    pub success_probability: Vec<f64>,
}

// -- Handlers --

/// POST /predict — score a `{name: number}` feature mapping.
#[tracing::instrument(skip_all)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = payload?;

    let features = match req.features {
        Some(features) if !is_falsy(&features) => features,
        _ => return Err(ApiError::BadRequest(NO_FEATURES_MESSAGE.to_string())),
    };

    let started = Instant::now();
    let result = score(state.classifier.as_ref(), &features);
    record_prediction(state.variant, result.is_ok(), started.elapsed());

    let response = result?;
    tracing::debug!(
        probability = response.success_probability[0],
        prediction = response.prediction,
        "scored feature mapping"
    );
    Ok(Json(response))
}

/// Builds the single-row frame from the mapping and applies the threshold.
///
/// Columns follow the mapping's insertion order.
pub fn score(classifier: &dyn Classifier, features: &Value) -> Result<PredictResponse, ApiError> {
    let mapping = features.as_object().ok_or_else(|| {
        ApiError::Internal("features must be an object of name to value".to_string())
    })?;

    let pairs = mapping
        .iter()
        .map(|(name, value)| Ok((name.as_str(), feature_value(name, value)?)))
        .collect::<Result<Vec<_>, ApiError>>()?;
    let row = FeatureRow::named(pairs);

    let proba = classifier.predict_proba(&row)?;
    let probability = *proba.get(POSITIVE_CLASS_INDEX).ok_or_else(|| {
        ApiError::Internal(format!(
            "model returned {} class probabilities, no positive class",
            proba.len()
        ))
    })?;

    Ok(PredictResponse {
        prediction: classify(probability),
        success_probability: vec![probability],
    })
}

/// 1 when `probability` reaches the threshold, else 0.
pub fn classify(probability: f64) -> u8 {
    u8::from(probability >= POSITIVE_CLASS_THRESHOLD)
}

/// Whether a JSON value counts as "nothing provided".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
