//! Cell ciphertext type

use std::fmt;

use tfhe::shortint::Ciphertext;

use crate::error::{TfheError, TfheResult};

/// One encrypted table cell
#[derive(Clone)]
pub struct CellCiphertext {
    inner: Ciphertext,
}

impl CellCiphertext {
    pub(crate) fn new(inner: Ciphertext) -> Self {
        Self { inner }
    }

    /// Get the inner shortint ciphertext
    pub fn inner(&self) -> &Ciphertext {
        &self.inner
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> TfheResult<Vec<u8>> {
        bincode::serialize(&self.inner).map_err(|e| TfheError::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> TfheResult<Self> {
        if bytes.is_empty() {
            return Err(TfheError::Deserialization(
                "Ciphertext bytes are empty".to_string(),
            ));
        }

        let inner = bincode::deserialize(bytes)
            .map_err(|e| TfheError::Deserialization(format!("ciphertext: {e}")))?;
        Ok(Self { inner })
    }
}

impl fmt::Debug for CellCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellCiphertext").finish_non_exhaustive()
    }
}
