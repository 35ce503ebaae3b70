//! Compressed evaluation (server) key
//!
//! Derived from the client key and shipped to the remote compute side, which
//! decompresses it to run homomorphic operations on the submitted cells.

use std::fmt;

use tfhe::shortint::CompressedServerKey;

use crate::error::{TfheError, TfheResult};
use crate::keys::TfheClientKey;

/// Public evaluation key in compressed (seeded) form
#[derive(Clone)]
pub struct TfheEvaluationKey {
    inner: CompressedServerKey,
}

impl TfheEvaluationKey {
    /// Derive the compressed evaluation key from a client key
    ///
    /// This is the expensive half of key generation: it encrypts the
    /// bootstrapping and keyswitching material under the client key.
    pub fn from_client(client: &TfheClientKey) -> Self {
        Self {
            inner: CompressedServerKey::new(client.inner()),
        }
    }

    /// Get the inner compressed server key
    pub fn inner(&self) -> &CompressedServerKey {
        &self.inner
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> TfheResult<Vec<u8>> {
        bincode::serialize(&self.inner).map_err(|e| TfheError::Serialization(e.to_string()))
    }

    /// Deserialize from bytes, as the remote compute side does
    pub fn from_bytes(bytes: &[u8]) -> TfheResult<Self> {
        let inner = bincode::deserialize(bytes)
            .map_err(|e| TfheError::Deserialization(format!("evaluation key: {e}")))?;
        Ok(Self { inner })
    }
}

impl fmt::Debug for TfheEvaluationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfheEvaluationKey").finish_non_exhaustive()
    }
}
