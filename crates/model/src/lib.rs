//! Model layer for the success-prediction services.
//!
//! This crate provides:
//! - the `Classifier` trait the HTTP handlers call into
//! - `FeatureRow`, the single-row input frame
//! - `OnnxClassifier`, inference over an exported ONNX artifact

pub mod classifier;
pub mod error;
pub mod label;
pub mod onnx;
pub mod row;

pub use classifier::Classifier;
pub use error::{ModelError, Result};
pub use label::ClassLabel;
pub use onnx::{FEATURE_NAMES_KEY, OnnxClassifier, load_onnx};
pub use row::FeatureRow;
