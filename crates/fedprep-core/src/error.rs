use std::fmt;

use thiserror::Error;

/// Location of a cell in the input table (zero-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
    pub header: String,
}

impl CellPosition {
    pub fn new(row: usize, column: usize, header: impl Into<String>) -> Self {
        Self {
            row,
            column,
            header: header.into(),
        }
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column {} ('{}')", self.row, self.column, self.header)
    }
}

fn at(position: &Option<CellPosition>) -> String {
    position
        .as_ref()
        .map(|p| format!(" at {p}"))
        .unwrap_or_default()
}

/// Errors from the preparation pipeline
///
/// None of the variants carry cell values, so errors can be logged or shown
/// to the user without leaking plaintext.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Row {row} does not expose the same columns as the first row")]
    ShapeMismatch { row: usize },

    #[error("Value at {position} is outside the message domain 0..={max}")]
    OutOfDomain { position: CellPosition, max: u8 },

    #[error("Value at {position} is not a parseable number")]
    UnparseableValue { position: CellPosition },

    #[error("Keys not initialized")]
    KeyNotInitialized,

    #[error("{operation} failed{}: {source}", at(.position))]
    Primitive {
        operation: &'static str,
        position: Option<CellPosition>,
        #[source]
        source: BackendError,
    },

    #[error("Verification failed at {position}: decrypted value differs from input")]
    VerificationMismatch { position: CellPosition },
}

impl PrepError {
    pub(crate) fn primitive(operation: &'static str, source: BackendError) -> Self {
        Self::Primitive {
            operation,
            position: None,
            source,
        }
    }

    pub(crate) fn primitive_at(
        operation: &'static str,
        position: CellPosition,
        source: BackendError,
    ) -> Self {
        Self::Primitive {
            operation,
            position: Some(position),
            source,
        }
    }

    /// Primitive failures do not heal on retry
    pub fn is_primitive_failure(&self) -> bool {
        matches!(self, Self::Primitive { .. })
    }

    /// Input problems detected before any cryptographic work
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput(_)
                | Self::ShapeMismatch { .. }
                | Self::OutOfDomain { .. }
                | Self::UnparseableValue { .. }
        )
    }
}

pub type PrepResult<T> = Result<T, PrepError>;

/// Errors from the underlying FHE primitive
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Backend not available: {0}")]
    BackendUnavailable(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl From<fedprep_tfhe::TfheError> for BackendError {
    fn from(err: fedprep_tfhe::TfheError) -> Self {
        use fedprep_tfhe::TfheError;

        match err {
            TfheError::InvalidParameters(msg) => Self::InvalidParameters(msg),
            TfheError::Encryption(msg) => Self::Encryption(msg),
            TfheError::Decryption(msg) => Self::Decryption(msg),
            TfheError::Serialization(msg) => Self::Serialization(msg),
            TfheError::Deserialization(msg) => Self::Deserialization(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_error_reports_position() {
        let err = PrepError::primitive_at(
            "encrypt",
            CellPosition::new(2, 1, "age"),
            BackendError::Encryption("boom".into()),
        );
        assert_eq!(
            err.to_string(),
            "encrypt failed at row 2, column 1 ('age'): Encryption failed: boom"
        );
        assert!(err.is_primitive_failure());
        assert!(!err.is_validation_failure());
    }

    #[test]
    fn primitive_error_without_position() {
        let err = PrepError::primitive(
            "generate_keys",
            BackendError::InvalidParameters("bad params".into()),
        );
        assert_eq!(
            err.to_string(),
            "generate_keys failed: Invalid parameters: bad params"
        );
    }
}
