//! TFHE client key wrapper
//!
//! The client key is the secret half of the key pair: it encrypts cells locally
//! and decrypts them for verification. It never leaves the process.

use std::fmt;

use tfhe::shortint::ClientKey;

use crate::error::TfheResult;
use crate::params::TfheParams;

/// TFHE shortint client key
#[derive(Clone)]
pub struct TfheClientKey {
    params: TfheParams,
    key: ClientKey,
}

impl TfheClientKey {
    /// Generate a new random client key
    pub fn generate(params: &TfheParams) -> TfheResult<Self> {
        params.validate()?;
        let key = ClientKey::new(params.inner());
        Ok(Self {
            params: *params,
            key,
        })
    }

    /// Get the inner shortint client key
    pub fn inner(&self) -> &ClientKey {
        &self.key
    }

    /// Parameter set the key was generated under
    pub fn params(&self) -> &TfheParams {
        &self.params
    }
}

// Secret material stays out of logs
impl fmt::Debug for TfheClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfheClientKey")
            .field("message_modulus", &self.params.message_modulus())
            .finish_non_exhaustive()
    }
}
