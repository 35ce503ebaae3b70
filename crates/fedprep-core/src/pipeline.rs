//! Session pipeline: encode → encrypt → serialize
//!
//! [`Pipeline`] is the explicit session handle. It owns the [`KeyManager`],
//! so dropping or tearing down the pipeline ends the key pair's life.

use std::time::Instant;

use tracing::{debug, info};

use crate::backend::FheBackend;
use crate::encoding::{self, EncodedMatrix, TabularInput};
use crate::engine;
use crate::error::PrepResult;
use crate::keys::KeyManager;
use crate::serialize;
use crate::submission::Submission;
use crate::verify;

pub struct Pipeline<B: FheBackend> {
    keys: KeyManager<B>,
}

impl<B: FheBackend> Pipeline<B> {
    pub fn new(backend: B) -> Self {
        Self {
            keys: KeyManager::new(backend),
        }
    }

    pub fn keys(&self) -> &KeyManager<B> {
        &self.keys
    }

    /// Pre-flight structural check, see [`encoding::validate`]
    pub fn validate(&self, input: &TabularInput) -> bool {
        encoding::validate(input)
    }

    pub fn encode(&self, input: &TabularInput) -> PrepResult<EncodedMatrix> {
        encoding::encode(input)
    }

    /// Encode, encrypt and serialize a table
    ///
    /// Input is fully validated before any key generation or encryption.
    pub fn prepare(&self, input: &TabularInput) -> PrepResult<Submission> {
        let matrix = self.encode(input)?;
        self.prepare_matrix(&matrix)
    }

    /// Like [`Pipeline::prepare`], then decrypts the result and compares it
    /// with the encoded input before returning it
    pub fn prepare_verified(&self, input: &TabularInput) -> PrepResult<Submission> {
        let matrix = self.encode(input)?;
        let submission = self.prepare_matrix(&matrix)?;
        self.self_test(&submission, &matrix)?;
        Ok(submission)
    }

    pub fn prepare_matrix(&self, matrix: &EncodedMatrix) -> PrepResult<Submission> {
        debug!(
            rows = matrix.row_count(),
            columns = matrix.column_count(),
            "Encoded input"
        );

        let start = Instant::now();
        let table = engine::encrypt_matrix(&self.keys, matrix)?;
        info!(
            cells = matrix.row_count() * matrix.column_count(),
            "Encrypted table in {:?}",
            start.elapsed()
        );

        let backend = self.keys.backend();
        let serialized = serialize::serialize_table(backend, &table)?;
        let evaluation_key = self.keys.public_key_bytes()?;

        Ok(Submission::new(
            backend.backend_id(),
            &serialized,
            &evaluation_key,
        ))
    }

    /// Decrypt every cell of `submission` and compare against `expected`
    pub fn self_test(&self, submission: &Submission, expected: &EncodedMatrix) -> PrepResult<()> {
        let table = submission.to_table()?;
        verify::verify_serialized(&self.keys, &table, expected)
    }

    /// Drop the session key pair; the next submission generates a new one
    pub fn teardown(&mut self) -> bool {
        self.keys.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::backends::MockBackend;
    use crate::encoding::Row;
    use crate::error::PrepError;

    #[test]
    fn validation_runs_before_key_generation() {
        let pipeline = Pipeline::new(MockBackend::new());
        let input = TabularInput::new(vec![Row::new().with("x", "8")]);

        assert!(matches!(
            pipeline.prepare(&input),
            Err(PrepError::OutOfDomain { .. })
        ));
        assert!(!pipeline.keys().is_initialized());
    }

    #[test]
    fn prepare_verified_roundtrips() {
        let pipeline = Pipeline::new(MockBackend::new());
        let input = TabularInput::new(vec![
            Row::new().with("x", "3").with("y", "7"),
            Row::new().with("x", "2.9").with("y", 0i64),
        ]);

        let submission = pipeline.prepare_verified(&input).unwrap();
        assert_eq!(submission.row_count, 2);
        assert_eq!(submission.column_count, 2);
        assert_eq!(submission.original_headers, ["x", "y"]);
        assert_eq!(
            submission.evaluation_key_bytes().unwrap(),
            pipeline.keys().public_key_bytes().unwrap()
        );
    }

    #[test]
    fn teardown_rotates_keys() {
        let mut pipeline = Pipeline::new(MockBackend::new());
        let input = TabularInput::new(vec![Row::new().with("x", "1")]);

        let first = pipeline.prepare(&input).unwrap();
        assert!(pipeline.teardown());
        let second = pipeline.prepare(&input).unwrap();

        assert_ne!(first.evaluation_key, second.evaluation_key);

        let matrix = pipeline.encode(&input).unwrap();
        pipeline.self_test(&second, &matrix).unwrap();
    }
}
