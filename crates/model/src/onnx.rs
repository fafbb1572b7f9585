//! Inference over a classifier exported to ONNX.
//!
//! The artifact is expected in the layout a scikit-learn exporter writes
//! for a probabilistic classifier with the zipmap wrapper disabled: one
//! float input of shape `[N, n_features]`, a `label` output and a dense
//! `probabilities` output of shape `[N, n_classes]`. Training column names,
//! when the model was fitted on a frame, travel in the `feature_names_in`
//! metadata entry as a comma-separated list.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tract_onnx::pb::{self, tensor_shape_proto::dimension, type_proto};
use tract_onnx::prelude::*;

use crate::classifier::Classifier;
use crate::error::{ModelError, Result};
use crate::label::ClassLabel;
use crate::row::FeatureRow;

/// Metadata key holding the comma-separated training column names.
pub const FEATURE_NAMES_KEY: &str = "feature_names_in";

const LABEL_OUTPUT: usize = 0;
const PROBABILITIES_OUTPUT: usize = 1;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A loaded, optimized ONNX classifier ready to score single rows.
pub struct OnnxClassifier {
    plan: Plan,
    classes: Vec<ClassLabel>,
    n_features: usize,
    feature_names: Option<Vec<String>>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("classes", &self.classes)
            .field("n_features", &self.n_features)
            .field("feature_names", &self.feature_names)
            .finish_non_exhaustive()
    }
}

/// Loads an ONNX classifier from disk.
pub fn load_onnx(path: impl AsRef<Path>) -> Result<OnnxClassifier> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = OnnxClassifier::from_reader(BufReader::new(file))?;
    tracing::debug!(
        path = %path.display(),
        classes = model.classes.len(),
        features = model.n_features,
        "onnx model decoded"
    );
    Ok(model)
}

impl OnnxClassifier {
    /// Decodes and prepares a model from raw ONNX bytes.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let proto = tract_onnx::onnx().proto_model_for_read(&mut reader)?;
        Self::from_proto(&proto)
    }

    fn from_proto(proto: &pb::ModelProto) -> Result<Self> {
        let graph = proto
            .graph
            .as_ref()
            .ok_or_else(|| ModelError::Invalid("model has no graph".into()))?;
        if graph.output.len() <= PROBABILITIES_OUTPUT {
            return Err(ModelError::Invalid(format!(
                "expected label and probability outputs, graph has {}",
                graph.output.len()
            )));
        }

        let n_features = input_width(graph)?;
        let classes = class_labels(graph)?;
        let feature_names = feature_names(proto);
        if let Some(names) = &feature_names {
            if names.len() != n_features {
                return Err(ModelError::Invalid(format!(
                    "{} feature names recorded for an input of width {n_features}",
                    names.len()
                )));
            }
        }

        let plan = tract_onnx::onnx()
            .model_for_proto_model(proto)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, n_features)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self {
            plan,
            classes,
            n_features,
            feature_names,
        })
    }

    fn check_row(&self, row: &FeatureRow) -> Result<()> {
        match (&self.feature_names, row.columns()) {
            (Some(expected), Some(actual)) if expected.as_slice() != actual => {
                return Err(ModelError::FeatureNamesMismatch {
                    expected: expected.clone(),
                    actual: actual.to_vec(),
                });
            }
            (Some(_), None) => {
                tracing::debug!("row has no feature names, but the model was fitted with names");
            }
            (None, Some(_)) => {
                tracing::debug!("row has feature names, but the model was fitted without names");
            }
            _ => {}
        }

        if row.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        if let Some(i) = row.values().iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteValue {
                column: row.column_name(i),
            });
        }
        Ok(())
    }

    fn run(&self, row: &FeatureRow) -> Result<TVec<TValue>> {
        self.check_row(row)?;
        let values: Vec<f32> = row.values().iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, self.n_features], &values)?;
        Ok(self.plan.run(tvec!(input.into()))?)
    }
}

impl Classifier for OnnxClassifier {
    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict_proba(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let outputs = self.run(row)?;
        let proba: Vec<f64> = outputs[PROBABILITIES_OUTPUT]
            .to_array_view::<f32>()?
            .iter()
            .map(|&p| f64::from(p))
            .collect();
        if proba.len() != self.classes.len() {
            return Err(ModelError::Invalid(format!(
                "model returned {} probabilities for {} classes",
                proba.len(),
                self.classes.len()
            )));
        }
        Ok(proba)
    }

    fn predict(&self, row: &FeatureRow) -> Result<ClassLabel> {
        let outputs = self.run(row)?;
        let label = &outputs[LABEL_OUTPUT];
        let first = match label.datum_type() {
            DatumType::I64 => label.as_slice::<i64>()?.first().map(|&v| ClassLabel::Int(v)),
            DatumType::String => label
                .as_slice::<String>()?
                .first()
                .map(|v| ClassLabel::Text(v.clone())),
            other => {
                return Err(ModelError::Invalid(format!(
                    "unsupported label output type {other:?}"
                )));
            }
        };
        first.ok_or_else(|| ModelError::Invalid("model produced no label".into()))
    }
}

fn input_width(graph: &pb::GraphProto) -> Result<usize> {
    let input = graph
        .input
        .first()
        .ok_or_else(|| ModelError::Invalid("graph has no inputs".into()))?;
    let width = input
        .r#type
        .as_ref()
        .and_then(|t| match &t.value {
            Some(type_proto::Value::TensorType(tensor)) => tensor.shape.as_ref(),
            _ => None,
        })
        .and_then(|shape| shape.dim.get(1))
        .and_then(|d| match d.value {
            Some(dimension::Value::DimValue(v)) if v > 0 => Some(v as usize),
            _ => None,
        });
    width.ok_or_else(|| {
        ModelError::Invalid(format!(
            "input {} must be a [N, n_features] tensor with a fixed width",
            input.name
        ))
    })
}

fn class_labels(graph: &pb::GraphProto) -> Result<Vec<ClassLabel>> {
    for attr in graph.node.iter().flat_map(|n| n.attribute.iter()) {
        match attr.name.as_str() {
            "classlabels_int64s" if !attr.ints.is_empty() => {
                return Ok(attr.ints.iter().map(|&v| ClassLabel::Int(v)).collect());
            }
            "classlabels_strings" if !attr.strings.is_empty() => {
                return Ok(attr
                    .strings
                    .iter()
                    .map(|s| ClassLabel::Text(String::from_utf8_lossy(s).into_owned()))
                    .collect());
            }
            _ => {}
        }
    }
    Err(ModelError::Invalid(
        "no classifier node with class labels found".into(),
    ))
}

fn feature_names(proto: &pb::ModelProto) -> Option<Vec<String>> {
    proto
        .metadata_props
        .iter()
        .find(|p| p.key == FEATURE_NAMES_KEY)
        .map(|p| p.value.split(',').map(|s| s.trim().to_string()).collect())
}
