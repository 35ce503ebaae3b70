//! Mock FHE backend for testing
//!
//! NOT SECURE and not homomorphic - XChaCha20 keystream over the one-byte
//! message. Key generation is instant, which keeps pipeline and concurrency
//! tests fast.

use chacha20::XChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use rand::{RngCore, rngs::OsRng};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::backend::{BackendId, FheBackend};
use crate::error::{BackendError, BackendResult};

const NONCE_LEN: usize = 24;
const CIPHERTEXT_LEN: usize = NONCE_LEN + 1;

#[derive(Clone, Copy, Debug)]
pub struct MockBackend {
    message_modulus: u64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self { message_modulus: 8 }
    }

    /// Mock with a different message space, for parameter mismatch tests
    pub fn with_message_modulus(message_modulus: u64) -> Self {
        Self { message_modulus }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock secret key (zeroized on drop)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MockClientKey {
    bytes: [u8; 32],
}

/// Mock evaluation key: BLAKE3 digest of the secret
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockEvaluationKey {
    digest: [u8; 32],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCiphertext {
    nonce: [u8; NONCE_LEN],
    body: u8,
}

impl FheBackend for MockBackend {
    type ClientKey = MockClientKey;
    type EvaluationKey = MockEvaluationKey;
    type Ciphertext = MockCiphertext;

    fn backend_id(&self) -> BackendId {
        BackendId::Mock
    }

    fn name(&self) -> &'static str {
        "Mock (TESTING ONLY)"
    }

    fn message_modulus(&self) -> u64 {
        self.message_modulus
    }

    fn generate_keys(&self) -> BackendResult<(MockClientKey, MockEvaluationKey)> {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);

        let digest = *blake3::hash(&bytes).as_bytes();
        Ok((MockClientKey { bytes }, MockEvaluationKey { digest }))
    }

    fn encrypt(&self, key: &MockClientKey, message: u8) -> BackendResult<MockCiphertext> {
        if u64::from(message) >= self.message_modulus {
            return Err(BackendError::Encryption(format!(
                "message exceeds mock modulus {}",
                self.message_modulus
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let mut body = [message];
        let mut cipher = XChaCha20::new((&key.bytes).into(), &nonce.into());
        cipher.apply_keystream(&mut body);

        Ok(MockCiphertext {
            nonce,
            body: body[0],
        })
    }

    fn decrypt(&self, key: &MockClientKey, ciphertext: &MockCiphertext) -> BackendResult<u8> {
        let mut body = [ciphertext.body];
        let mut cipher = XChaCha20::new((&key.bytes).into(), (&ciphertext.nonce).into());
        cipher.apply_keystream(&mut body);

        // A foreign key almost always lands outside the message space
        if u64::from(body[0]) >= self.message_modulus {
            return Err(BackendError::Decryption(
                "decrypted value outside message space (wrong key?)".into(),
            ));
        }
        Ok(body[0])
    }

    fn ciphertext_to_bytes(&self, ciphertext: &MockCiphertext) -> BackendResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(CIPHERTEXT_LEN);
        bytes.extend_from_slice(&ciphertext.nonce);
        bytes.push(ciphertext.body);
        Ok(bytes)
    }

    fn ciphertext_from_bytes(&self, bytes: &[u8]) -> BackendResult<MockCiphertext> {
        if bytes.len() != CIPHERTEXT_LEN {
            return Err(BackendError::Deserialization(format!(
                "Invalid mock ciphertext length: {} != {CIPHERTEXT_LEN}",
                bytes.len()
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        Ok(MockCiphertext {
            nonce,
            body: bytes[NONCE_LEN],
        })
    }

    fn evaluation_key_to_bytes(&self, key: &MockEvaluationKey) -> BackendResult<Vec<u8>> {
        Ok(key.digest.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_encrypt_decrypt() {
        let backend = MockBackend::new();
        let (sk, _) = backend.generate_keys().unwrap();

        for message in 0..8u8 {
            let ct = backend.encrypt(&sk, message).unwrap();
            assert_eq!(backend.decrypt(&sk, &ct).unwrap(), message);
        }
    }

    #[test]
    fn test_mock_ciphertexts_are_randomized() {
        let backend = MockBackend::new();
        let (sk, _) = backend.generate_keys().unwrap();

        let a = backend.encrypt(&sk, 3).unwrap();
        let b = backend.encrypt(&sk, 3).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_mock_bytes_roundtrip() {
        let backend = MockBackend::new();
        let (sk, _) = backend.generate_keys().unwrap();

        let ct = backend.encrypt(&sk, 6).unwrap();
        let bytes = backend.ciphertext_to_bytes(&ct).unwrap();
        let restored = backend.ciphertext_from_bytes(&bytes).unwrap();

        assert_eq!(restored, ct);
        assert!(backend.ciphertext_from_bytes(&bytes[1..]).is_err());
    }

    #[test]
    fn test_mock_rejects_message_outside_modulus() {
        let backend = MockBackend::new();
        let (sk, _) = backend.generate_keys().unwrap();

        assert!(matches!(
            backend.encrypt(&sk, 8),
            Err(BackendError::Encryption(_))
        ));
    }
}
