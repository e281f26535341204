//! Configuration module

use std::env;

/// Pinned SHA-256 of the known-good model artifact. Overridable through
/// `MODEL_SHA256` at deploy time, never editable once the process is up.
pub const DEFAULT_MODEL_SHA256: &str =
    "9b1c64f08a3d5e72c41f0b6d88e2a97f5c03d1b4a6e8f92037cd5b16e4a8f250";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the serialized model artifact
    pub model_path: String,

    /// Expected SHA-256 digest of the artifact (64 lowercase hex chars)
    pub model_sha256: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "gs_gravidade.json".to_string()),

            model_sha256: env::var("MODEL_SHA256")
                .unwrap_or_else(|_| DEFAULT_MODEL_SHA256.to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}
