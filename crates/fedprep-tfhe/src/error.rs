//! Error types for TFHE operations

#[derive(Debug, thiserror::Error)]
pub enum TfheError {
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
}

pub type TfheResult<T> = Result<T, TfheError>;
