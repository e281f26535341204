//! Integrity-checked model loading
//!
//! Verify-then-load: the artifact's SHA-256 is computed and compared against
//! the pinned digest before a single byte reaches the deserializer. A
//! mismatch withholds the artifact entirely.

use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::{LabelEncoder, ModelArtifact, SeverityModel};

/// Digest read block size. Bounds memory use during hashing independent of
/// artifact size.
const HASH_BLOCK_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model artifact not found at: {path}")]
    NotFound { path: String },

    #[error("I/O error while reading model artifact: {0}")]
    ReadError(#[from] std::io::Error),

    /// Digest mismatch. Carries both digests for forensic comparison.
    #[error("model artifact tampered: expected sha256 {expected}, found {computed}")]
    TamperDetected { expected: String, computed: String },

    /// The bytes matched the pinned digest but did not deserialize into a
    /// structurally valid bundle.
    #[error("model artifact corrupt: {0}")]
    CorruptArtifact(String),
}

/// A verified, deserialized model bundle. Shared read-only for the process
/// lifetime; nothing mutates it after load.
#[derive(Debug)]
pub struct VerifiedModel {
    pub model: SeverityModel,
    pub encoder: LabelEncoder,
    /// The digest that was actually computed (equal to the pinned one).
    pub digest: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// SHA-256 of a file, streamed in fixed-size blocks, as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_BLOCK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Validate the artifact's integrity, then load it.
///
/// The comparison is exact string equality over the full lowercase hex
/// digest; anything else fails closed. Every failure path returns without a
/// model, never a partial result.
pub fn load_verified(path: &Path, expected_digest: &str) -> Result<VerifiedModel, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.display().to_string(),
        });
    }

    let computed = sha256_file(path)?;
    if computed != expected_digest {
        return Err(LoadError::TamperDetected {
            expected: expected_digest.to_string(),
            computed,
        });
    }

    // Only reached on digest match. A matching digest does not guarantee
    // the contained objects are structurally sound, so validation follows.
    let bytes = fs::read(path)?;
    let artifact: ModelArtifact =
        serde_json::from_slice(&bytes).map_err(|e| LoadError::CorruptArtifact(e.to_string()))?;

    artifact.model.validate().map_err(LoadError::CorruptArtifact)?;
    if artifact.label_encoder.is_empty() {
        return Err(LoadError::CorruptArtifact(
            "label encoder has no classes".to_string(),
        ));
    }
    if artifact.label_encoder.len() != artifact.model.classes {
        return Err(LoadError::CorruptArtifact(format!(
            "label encoder has {} classes, model declares {}",
            artifact.label_encoder.len(),
            artifact.model.classes
        )));
    }

    tracing::info!("model artifact verified, sha256={}", computed);

    Ok(VerifiedModel {
        model: artifact.model,
        encoder: artifact.label_encoder,
        digest: computed,
        loaded_at: chrono::Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::model::test_fixtures::{sample_artifact, sample_record};

    fn write_artifact(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn one_shot_digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    #[test]
    fn test_streamed_digest_matches_one_shot_digest() {
        // 10000 bytes: not a multiple of the 4096-byte block, so the last
        // block is short. The streamed result must not depend on blocking.
        let bytes: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let file = write_artifact(&bytes);

        let streamed = sha256_file(file.path()).unwrap();
        assert_eq!(streamed, one_shot_digest(&bytes));
        assert_eq!(streamed.len(), 64);
        assert_eq!(streamed, streamed.to_lowercase());
    }

    #[test]
    fn test_digest_is_deterministic() {
        let bytes = serde_json::to_vec(&sample_artifact()).unwrap();
        let file = write_artifact(&bytes);
        let a = sha256_file(file.path()).unwrap();
        let b = sha256_file(file.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_verified_happy_path() {
        let bytes = serde_json::to_vec(&sample_artifact()).unwrap();
        let file = write_artifact(&bytes);

        let verified = load_verified(file.path(), &one_shot_digest(&bytes)).unwrap();
        assert_eq!(verified.digest, one_shot_digest(&bytes));
        assert_eq!(verified.encoder.len(), 3);

        // The loaded predictor is immediately usable.
        let classes = verified.model.predict(&[sample_record()]).unwrap();
        assert_eq!(classes.len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nao_existe.json");

        match load_verified(&path, "0".repeat(64).as_str()) {
            Err(LoadError::NotFound { path: p }) => assert!(p.contains("nao_existe")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_single_bit_flip_is_tamper_detected() {
        let mut bytes = serde_json::to_vec(&sample_artifact()).unwrap();
        let pinned = one_shot_digest(&bytes);

        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x01;
        let file = write_artifact(&bytes);

        match load_verified(file.path(), &pinned) {
            Err(LoadError::TamperDetected { expected, computed }) => {
                assert_eq!(expected, pinned);
                assert_eq!(computed, one_shot_digest(&bytes));
                assert_ne!(expected, computed);
            }
            other => panic!("expected TamperDetected, got {:?}", other),
        }
    }

    #[test]
    fn test_digest_comparison_is_case_sensitive() {
        let bytes = serde_json::to_vec(&sample_artifact()).unwrap();
        let file = write_artifact(&bytes);

        let uppercased = one_shot_digest(&bytes).to_uppercase();
        assert!(matches!(
            load_verified(file.path(), &uppercased),
            Err(LoadError::TamperDetected { .. })
        ));
    }

    #[test]
    fn test_matching_digest_with_garbage_bytes_is_corrupt() {
        let bytes = b"nao sou json de modelo".to_vec();
        let file = write_artifact(&bytes);

        assert!(matches!(
            load_verified(file.path(), &one_shot_digest(&bytes)),
            Err(LoadError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_missing_member_is_corrupt() {
        let json = serde_json::json!({
            "model": serde_json::to_value(sample_artifact().model).unwrap(),
        });
        let bytes = serde_json::to_vec(&json).unwrap();
        let file = write_artifact(&bytes);

        assert!(matches!(
            load_verified(file.path(), &one_shot_digest(&bytes)),
            Err(LoadError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_inconsistent_parameters_are_corrupt() {
        let mut artifact = sample_artifact();
        artifact.model.bias.push(9.9);
        let bytes = serde_json::to_vec(&artifact).unwrap();
        let file = write_artifact(&bytes);

        assert!(matches!(
            load_verified(file.path(), &one_shot_digest(&bytes)),
            Err(LoadError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_encoder_class_count_must_match_model() {
        let mut artifact = sample_artifact();
        artifact.label_encoder.classes.pop();
        let bytes = serde_json::to_vec(&artifact).unwrap();
        let file = write_artifact(&bytes);

        match load_verified(file.path(), &one_shot_digest(&bytes)) {
            Err(LoadError::CorruptArtifact(msg)) => assert!(msg.contains("label encoder")),
            other => panic!("expected CorruptArtifact, got {:?}", other),
        }
    }
}
