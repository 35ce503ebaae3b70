//! Key lifecycle: exactly one key pair per session
//!
//! [`KeyManager`] is the session's key holder. It is created explicitly,
//! handed by reference to the engine and the verifier, and torn down
//! explicitly. The key pair is generated at most once per manager, even
//! when many threads ask for it at the same time.

use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Instant;

use tracing::{debug, info};

use crate::backend::FheBackend;
use crate::encoding::MESSAGE_DOMAIN_MAX;
use crate::error::{BackendError, PrepError, PrepResult};
use crate::serialize;

/// The active client key and the evaluation key derived from it
pub struct KeyPair<B: FheBackend> {
    client: B::ClientKey,
    evaluation: B::EvaluationKey,
}

impl<B: FheBackend> KeyPair<B> {
    /// Secret key used for encryption and verification
    pub fn client(&self) -> &B::ClientKey {
        &self.client
    }

    /// Public evaluation key for the remote compute side
    pub fn evaluation(&self) -> &B::EvaluationKey {
        &self.evaluation
    }
}

impl<B: FheBackend> fmt::Debug for KeyPair<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

/// Owner of the session key pair
pub struct KeyManager<B: FheBackend> {
    backend: B,
    keys: OnceLock<KeyPair<B>>,
    // Serializes generation so concurrent first callers never build two pairs
    init: Mutex<()>,
}

impl<B: FheBackend> KeyManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            keys: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.keys.get().is_some()
    }

    /// Return the active key pair, generating it if none exists yet
    ///
    /// Idempotent: once a pair exists it is returned unchanged. Generation
    /// failures are returned to the caller and leave the manager empty, so a
    /// later call may try again.
    pub fn ensure_keys(&self) -> PrepResult<&KeyPair<B>> {
        if let Some(keys) = self.keys.get() {
            return Ok(keys);
        }

        // Poisoning only means a previous generator panicked; the guarded
        // state is the OnceLock, which is still consistent
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(keys) = self.keys.get() {
            debug!("Key pair created by a concurrent caller");
            return Ok(keys);
        }

        let keys = self.generate()?;
        Ok(self.keys.get_or_init(|| keys))
    }

    /// Return the active key pair without ever generating one
    pub fn get_keys(&self) -> PrepResult<&KeyPair<B>> {
        self.keys.get().ok_or(PrepError::KeyNotInitialized)
    }

    /// Serialized public evaluation key (never the client key)
    pub fn public_key_bytes(&self) -> PrepResult<Vec<u8>> {
        serialize::evaluation_key_to_bytes(self)
    }

    /// Drop the active key pair
    ///
    /// Takes `&mut self`, so no encryption or verification can be borrowing
    /// the pair. Returns whether a pair was active.
    pub fn teardown(&mut self) -> bool {
        let had_keys = self.keys.take().is_some();
        if had_keys {
            info!(backend = %self.backend.backend_id(), "Key pair torn down");
        }
        had_keys
    }

    fn generate(&self) -> PrepResult<KeyPair<B>> {
        let modulus = self.backend.message_modulus();
        if modulus <= u64::from(MESSAGE_DOMAIN_MAX) {
            return Err(PrepError::primitive(
                "generate_keys",
                BackendError::InvalidParameters(format!(
                    "message modulus {modulus} cannot represent 0..={MESSAGE_DOMAIN_MAX}"
                )),
            ));
        }

        info!(backend = self.backend.name(), "Generating key pair");
        let start = Instant::now();

        let (client, evaluation) = self
            .backend
            .generate_keys()
            .map_err(|e| PrepError::primitive("generate_keys", e))?;

        info!("Key pair ready in {:?}", start.elapsed());
        Ok(KeyPair { client, evaluation })
    }
}

impl<B: FheBackend> fmt::Debug for KeyManager<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("backend", &self.backend.backend_id())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::backends::MockBackend;

    #[test]
    fn get_keys_never_generates() {
        let manager = KeyManager::new(MockBackend::new());

        assert!(matches!(
            manager.get_keys(),
            Err(PrepError::KeyNotInitialized)
        ));
        assert!(!manager.is_initialized());
    }

    #[test]
    fn ensure_keys_is_idempotent() {
        let manager = KeyManager::new(MockBackend::new());

        let first = manager.ensure_keys().unwrap();
        let second = manager.ensure_keys().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, manager.get_keys().unwrap()));

        assert_eq!(
            manager.public_key_bytes().unwrap(),
            manager.public_key_bytes().unwrap()
        );
    }

    #[test]
    fn public_key_bytes_requires_keys() {
        let manager = KeyManager::new(MockBackend::new());
        assert!(matches!(
            manager.public_key_bytes(),
            Err(PrepError::KeyNotInitialized)
        ));
    }

    #[test]
    fn teardown_drops_pair() {
        let mut manager = KeyManager::new(MockBackend::new());
        let before = {
            manager.ensure_keys().unwrap();
            manager.public_key_bytes().unwrap()
        };

        assert!(manager.teardown());
        assert!(!manager.teardown());
        assert!(matches!(
            manager.get_keys(),
            Err(PrepError::KeyNotInitialized)
        ));

        manager.ensure_keys().unwrap();
        assert_ne!(manager.public_key_bytes().unwrap(), before);
    }

    #[test]
    fn rejects_backend_too_small_for_domain() {
        let manager = KeyManager::new(MockBackend::with_message_modulus(4));

        let err = manager.ensure_keys().unwrap_err();
        assert!(err.is_primitive_failure());
        assert!(!manager.is_initialized());
    }
}
