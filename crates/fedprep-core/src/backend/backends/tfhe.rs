//! TFHE shortint backend (production)
//!
//! Wraps `fedprep-tfhe`. The default parameter set has a 3-bit message space,
//! which is exactly the cell domain `0..=7`.

use fedprep_tfhe::{CellCiphertext, TfheClientKey, TfheEvaluationKey, TfheParams};

use crate::backend::{BackendId, FheBackend};
use crate::error::BackendResult;

/// TFHE shortint backend
#[derive(Clone, Debug, Default)]
pub struct TfheBackend {
    params: TfheParams,
}

impl TfheBackend {
    /// Create a backend with the default 3-bit parameter set
    pub fn new() -> Self {
        Self {
            params: TfheParams::default_3bit(),
        }
    }

    /// Create a backend with a custom parameter set
    pub fn with_params(params: TfheParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TfheParams {
        &self.params
    }
}

impl FheBackend for TfheBackend {
    type ClientKey = TfheClientKey;
    type EvaluationKey = TfheEvaluationKey;
    type Ciphertext = CellCiphertext;

    fn backend_id(&self) -> BackendId {
        BackendId::Tfhe
    }

    fn name(&self) -> &'static str {
        "TFHE shortint (3-bit message, KS-PBS)"
    }

    fn message_modulus(&self) -> u64 {
        self.params.message_modulus()
    }

    fn generate_keys(&self) -> BackendResult<(TfheClientKey, TfheEvaluationKey)> {
        let client = TfheClientKey::generate(&self.params)?;
        let evaluation = TfheEvaluationKey::from_client(&client);
        Ok((client, evaluation))
    }

    fn encrypt(&self, key: &TfheClientKey, message: u8) -> BackendResult<CellCiphertext> {
        Ok(fedprep_tfhe::encrypt_cell(key, u64::from(message))?)
    }

    fn decrypt(&self, key: &TfheClientKey, ciphertext: &CellCiphertext) -> BackendResult<u8> {
        let value = fedprep_tfhe::decrypt_cell(key, ciphertext)?;
        // decrypt_cell reduces modulo the message modulus, which fits in a u8 for
        // every shortint parameter set
        Ok(value as u8)
    }

    fn ciphertext_to_bytes(&self, ciphertext: &CellCiphertext) -> BackendResult<Vec<u8>> {
        Ok(ciphertext.to_bytes()?)
    }

    fn ciphertext_from_bytes(&self, bytes: &[u8]) -> BackendResult<CellCiphertext> {
        Ok(CellCiphertext::from_bytes(bytes)?)
    }

    fn evaluation_key_to_bytes(&self, key: &TfheEvaluationKey) -> BackendResult<Vec<u8>> {
        Ok(key.to_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;
    use crate::keys::KeyManager;
    use ::tfhe::shortint::parameters::PARAM_MESSAGE_2_CARRY_2_KS_PBS;

    #[test]
    fn default_backend_covers_cell_domain() {
        let backend = TfheBackend::new();
        assert_eq!(backend.message_modulus(), 8);
        assert_eq!(backend.backend_id(), BackendId::Tfhe);
    }

    #[test]
    fn two_bit_params_are_refused_before_keygen() {
        let params = TfheParams::custom(PARAM_MESSAGE_2_CARRY_2_KS_PBS).unwrap();
        let backend = TfheBackend::with_params(params);
        assert_eq!(backend.params().message_modulus(), 4);

        let keys = KeyManager::new(backend);
        let err = keys.ensure_keys().unwrap_err();
        assert!(matches!(err, PrepError::Primitive { operation: "generate_keys", .. }));
        assert!(!keys.is_initialized());
    }
}
