//! Severity predictor
//!
//! A linear scorer over closed categorical vocabularies plus standardized
//! numeric features. The training pipeline exports it as part of the model
//! artifact; this side only evaluates it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::AccidentRecord;

#[derive(Debug, Error)]
pub enum PredictError {
    /// The submitted value is outside the closed training vocabulary.
    #[error("value '{value}' for field '{field}' is outside the model vocabulary")]
    UnknownCategory { field: String, value: String },

    /// The model schema names a field the record cannot supply. This is a
    /// model/record contract break, not a user input problem.
    #[error("model schema names unknown field '{field}'")]
    SchemaMismatch { field: String },
}

/// Parameters for one categorical feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalFeature {
    /// Closed vocabulary from training. Also drives the form's options.
    pub vocabulary: Vec<String>,
    /// weights[value_index][class_index]
    pub weights: Vec<Vec<f64>>,
}

/// Parameters for one standardized numeric feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericFeature {
    pub mean: f64,
    pub scale: f64,
    /// weights[class_index]
    pub weights: Vec<f64>,
}

/// The trained classifier, as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityModel {
    /// Training-time column order. The form renders and echoes fields in
    /// this order, so the contract lives in the artifact, not in the UI.
    pub schema: Vec<String>,
    /// Number of severity classes
    pub classes: usize,
    /// bias[class_index]
    pub bias: Vec<f64>,
    pub categorical: BTreeMap<String, CategoricalFeature>,
    pub numeric: BTreeMap<String, NumericFeature>,
}

impl SeverityModel {
    /// Structural validation. A digest match proves the bytes are the
    /// pinned ones, not that the contained parameters are consistent.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes == 0 {
            return Err("model declares zero classes".to_string());
        }
        if self.bias.len() != self.classes {
            return Err(format!(
                "bias length {} does not match class count {}",
                self.bias.len(),
                self.classes
            ));
        }
        for (field, feat) in &self.categorical {
            if feat.weights.len() != feat.vocabulary.len() {
                return Err(format!(
                    "field '{}': {} weight rows for {} vocabulary entries",
                    field,
                    feat.weights.len(),
                    feat.vocabulary.len()
                ));
            }
            if feat.weights.iter().any(|row| row.len() != self.classes) {
                return Err(format!(
                    "field '{}': weight row length does not match class count {}",
                    field, self.classes
                ));
            }
        }
        for (field, feat) in &self.numeric {
            if feat.weights.len() != self.classes {
                return Err(format!(
                    "field '{}': {} numeric weights for {} classes",
                    field,
                    feat.weights.len(),
                    self.classes
                ));
            }
            if feat.scale <= 0.0 {
                return Err(format!("field '{}': non-positive scale", field));
            }
        }
        for field in &self.schema {
            if !self.categorical.contains_key(field) && !self.numeric.contains_key(field) {
                return Err(format!("schema field '{}' has no feature parameters", field));
            }
        }
        Ok(())
    }

    /// Classify a batch of records. Returns one class index per record.
    pub fn predict(&self, records: &[AccidentRecord]) -> Result<Vec<usize>, PredictError> {
        records.iter().map(|r| self.predict_one(r)).collect()
    }

    fn predict_one(&self, record: &AccidentRecord) -> Result<usize, PredictError> {
        let mut scores = self.bias.clone();

        for field in &self.schema {
            if let Some(feat) = self.categorical.get(field) {
                let value = record.categorical_value(field).ok_or_else(|| {
                    PredictError::SchemaMismatch {
                        field: field.clone(),
                    }
                })?;
                let idx = feat
                    .vocabulary
                    .iter()
                    .position(|v| v == value)
                    .ok_or_else(|| PredictError::UnknownCategory {
                        field: field.clone(),
                        value: value.to_string(),
                    })?;
                for (score, w) in scores.iter_mut().zip(&feat.weights[idx]) {
                    *score += w;
                }
            } else if let Some(feat) = self.numeric.get(field) {
                let value = record.numeric_value(field).ok_or_else(|| {
                    PredictError::SchemaMismatch {
                        field: field.clone(),
                    }
                })?;
                let z = (value - feat.mean) / feat.scale;
                for (score, w) in scores.iter_mut().zip(&feat.weights) {
                    *score += z * w;
                }
            }
            // validate() guarantees every schema field resolves to one of
            // the two branches above.
        }

        // Arg-max; ties resolve to the lowest class index.
        let mut best = 0;
        for (i, s) in scores.iter().enumerate().skip(1) {
            if *s > scores[best] {
                best = i;
            }
        }
        Ok(best)
    }
}
