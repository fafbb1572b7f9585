//! The calling contract the HTTP services rely on.

use crate::error::{ModelError, Result};
use crate::label::ClassLabel;
use crate::row::FeatureRow;

/// A trained classifier that can score a single feature row.
///
/// Implementations are immutable once loaded and are shared across request
/// handlers without locking.
pub trait Classifier: Send + Sync {
    /// Class labels in model order. `predict_proba` output is indexed the same way.
    fn classes(&self) -> &[ClassLabel];

    /// Number of input columns the model was fitted on.
    fn n_features(&self) -> usize;

    /// Column names seen at fit time, when the model was trained on a frame.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Returns one probability per class for the row.
    fn predict_proba(&self, row: &FeatureRow) -> Result<Vec<f64>>;

    /// Returns the most probable class. Ties go to the class listed first.
    fn predict(&self, row: &FeatureRow) -> Result<ClassLabel> {
        let proba = self.predict_proba(row)?;
        let best = argmax(&proba)
            .ok_or_else(|| ModelError::Invalid("model produced no class probabilities".into()))?;
        self.classes()
            .get(best)
            .cloned()
            .ok_or_else(|| ModelError::Invalid(format!("no class label at index {best}")))
    }
}

fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
