//! Route handlers for both prediction services.

pub mod balanced;
pub mod health;
pub mod metrics;
pub mod simple;

use std::sync::Arc;

use model::Classifier;
use serde_json::Value;

use crate::config::ServiceVariant;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
///
/// The classifier is loaded once at startup and never mutated afterwards.
pub struct AppState {
    pub variant: ServiceVariant,
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(variant: ServiceVariant, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            variant,
            classifier,
        }
    }
}

/// Reads one JSON feature value as a float.
///
/// Booleans count as 0/1. Anything else that is not a number fails.
fn feature_value(column: &str, value: &Value) -> Result<f64, ApiError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ApiError::Internal(format!("feature {column} is out of range: {n}"))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(ApiError::Internal(format!(
            "could not convert feature {column} to float: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_bools_convert() {
        assert_eq!(feature_value("a", &json!(3)).unwrap(), 3.0);
        assert_eq!(feature_value("a", &json!(2.5)).unwrap(), 2.5);
        assert_eq!(feature_value("a", &json!(true)).unwrap(), 1.0);
    }

    #[test]
    fn strings_and_nulls_fail() {
        assert!(matches!(
            feature_value("a", &json!("3")),
            Err(ApiError::Internal(_))
        ));
        assert!(matches!(
            feature_value("a", &json!(null)),
            Err(ApiError::Internal(_))
        ));
    }
}
