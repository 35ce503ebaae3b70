use super::BackendId;
use crate::error::BackendResult;

/// A homomorphic encryption primitive for single small-integer cells
///
/// Abstracts over the scheme that actually produces ciphertexts. Key material
/// and ciphertexts stay in the backend's native types; only the serialization
/// layer turns them into bytes.
///
/// Ciphertexts are randomized: two encryptions of the same value under the
/// same key produce different bytes. Test decrypted values, not bytes.
pub trait FheBackend: Send + Sync {
    /// Secret key: encrypts and decrypts, never leaves the process
    type ClientKey: Send + Sync;
    /// Public evaluation key shipped to the remote compute side
    type EvaluationKey: Send + Sync + std::fmt::Debug;
    /// One encrypted cell
    type Ciphertext: Send + Sync + std::fmt::Debug;

    /// Backend identifier for serialization format detection
    fn backend_id(&self) -> BackendId;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Number of distinct plaintext values a ciphertext can hold
    fn message_modulus(&self) -> u64;

    /// Generate a fresh client key and the evaluation key derived from it
    fn generate_keys(&self) -> BackendResult<(Self::ClientKey, Self::EvaluationKey)>;

    /// Encrypt one cell value
    fn encrypt(&self, key: &Self::ClientKey, message: u8) -> BackendResult<Self::Ciphertext>;

    /// Decrypt one cell value
    fn decrypt(&self, key: &Self::ClientKey, ciphertext: &Self::Ciphertext) -> BackendResult<u8>;

    /// Primitive byte encoding of a ciphertext
    fn ciphertext_to_bytes(&self, ciphertext: &Self::Ciphertext) -> BackendResult<Vec<u8>>;

    /// Inverse of [`FheBackend::ciphertext_to_bytes`]
    fn ciphertext_from_bytes(&self, bytes: &[u8]) -> BackendResult<Self::Ciphertext>;

    /// Primitive byte encoding of the evaluation key
    fn evaluation_key_to_bytes(&self, key: &Self::EvaluationKey) -> BackendResult<Vec<u8>>;
}
