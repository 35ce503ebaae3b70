//! Shortint parameter set used for cell encryption

use tfhe::shortint::parameters::{ClassicPBSParameters, PARAM_MESSAGE_3_CARRY_3_KS_PBS};

use crate::error::{TfheError, TfheResult};

/// TFHE shortint parameters
///
/// The message modulus of the parameter set defines the plaintext domain of a
/// single cell: `0..message_modulus`.
#[derive(Clone, Copy, Debug)]
pub struct TfheParams {
    inner: ClassicPBSParameters,
}

impl TfheParams {
    /// 3-bit message space (0-7) with 3 carry bits, keyswitch-then-bootstrap
    pub fn default_3bit() -> Self {
        Self {
            inner: PARAM_MESSAGE_3_CARRY_3_KS_PBS,
        }
    }

    /// Wrap a custom parameter set after sanity-checking its moduli
    pub fn custom(inner: ClassicPBSParameters) -> TfheResult<Self> {
        let params = Self { inner };
        params.validate()?;
        Ok(params)
    }

    /// Reject parameter sets the cell encoding cannot use
    pub fn validate(&self) -> TfheResult<()> {
        let message = self.message_modulus();
        let carry = self.inner.carry_modulus.0 as u64;

        if message < 2 || !message.is_power_of_two() {
            return Err(TfheError::InvalidParameters(format!(
                "message modulus must be a power of two >= 2, got {message}"
            )));
        }
        if carry == 0 {
            return Err(TfheError::InvalidParameters(
                "carry modulus must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of distinct plaintext values per ciphertext
    pub fn message_modulus(&self) -> u64 {
        self.inner.message_modulus.0 as u64
    }

    /// Largest encryptable message
    pub fn max_message(&self) -> u64 {
        self.message_modulus() - 1
    }

    /// Underlying tfhe parameter set
    pub fn inner(&self) -> ClassicPBSParameters {
        self.inner
    }
}

impl Default for TfheParams {
    fn default() -> Self {
        Self::default_3bit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_cover_three_bits() {
        let params = TfheParams::default_3bit();
        assert!(params.validate().is_ok());
        assert_eq!(params.message_modulus(), 8);
        assert_eq!(params.max_message(), 7);
    }
}
