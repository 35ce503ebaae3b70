//! TFHE shortint wrapper for tabular cell encryption
//!
//! This crate isolates the `tfhe` dependency behind a handful of small types:
//!
//! 1. **Parameters**: a shortint parameter set whose message modulus fixes the
//!    plaintext domain of one cell (`0..=7` for the default 3-bit set)
//! 2. **Keys**: the client key (secret, local only) and the compressed
//!    evaluation key (public, shipped to the remote compute side)
//! 3. **Cells**: one shortint ciphertext per table cell, with byte encoding
//!
//! # Example
//!
//! ```ignore
//! use fedprep_tfhe::{CellCiphertext, TfheClientKey, TfheParams, decrypt_cell, encrypt_cell};
//!
//! let params = TfheParams::default_3bit();
//! let client = TfheClientKey::generate(&params)?;
//!
//! let ct = encrypt_cell(&client, 5)?;
//! let restored = CellCiphertext::from_bytes(&ct.to_bytes()?)?;
//! assert_eq!(decrypt_cell(&client, &restored)?, 5);
//! ```

pub mod ciphertext;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod keys;
pub mod params;

// Re-exports for convenience
pub use ciphertext::CellCiphertext;
pub use decrypt::decrypt_cell;
pub use encrypt::encrypt_cell;
pub use error::{TfheError, TfheResult};
pub use keys::{TfheClientKey, TfheEvaluationKey};
pub use params::TfheParams;
