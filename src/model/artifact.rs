//! Serialized artifact layout
//!
//! The artifact is a JSON document with exactly two named members, `model`
//! and `label_encoder`, mirroring what the training pipeline writes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::predictor::SeverityModel;

/// The deserialized bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: SeverityModel,
    pub label_encoder: LabelEncoder,
}

/// Maps internal class indices back to human-readable severity labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Label at position i decodes class index i.
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Inverse mapping: class index -> label.
    pub fn inverse_transform(&self, index: usize) -> Result<&str, DecodeError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(DecodeError {
                index,
                classes: self.classes.len(),
            })
    }
}

#[derive(Debug, Error)]
#[error("class index {index} outside label encoder range (0..{classes})")]
pub struct DecodeError {
    pub index: usize,
    pub classes: usize,
}
