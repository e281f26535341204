//! Model artifact: severity predictor + label encoder.

pub mod artifact;
pub mod predictor;

pub use artifact::{DecodeError, LabelEncoder, ModelArtifact};
pub use predictor::{CategoricalFeature, NumericFeature, PredictError, SeverityModel};
