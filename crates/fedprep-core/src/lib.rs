//! # fedprep-core: Preparing Tabular Data for FHE Computation
//!
//! Turns a small table of rows into a set of ciphertexts, one per cell,
//! plus the public evaluation key a remote party needs to compute on them.
//!
//! ## Pipeline
//!
//! 1. **Encode**: every cell becomes an integer in `0..=7`, or the whole
//!    table is rejected with the offending position
//! 2. **Keys**: one key pair per session, generated lazily and exactly once
//! 3. **Encrypt**: each cell is encrypted independently, in parallel
//! 4. **Serialize**: ciphertexts and the evaluation key become framed bytes
//! 5. **Verify** (optional): decrypt everything and compare with the input
//!
//! ## Example
//!
//! ```rust
//! use fedprep_core::{Pipeline, Row, TabularInput, backend::backends::MockBackend};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = TabularInput::new(vec![
//!     Row::new().with("age_band", "3").with("score", 7i64),
//!     Row::new().with("age_band", "1").with("score", 0i64),
//! ]);
//!
//! let pipeline = Pipeline::new(MockBackend::new());
//! let submission = pipeline.prepare_verified(&input)?;
//!
//! assert_eq!(submission.row_count, 2);
//! assert_eq!(submission.original_headers, ["age_band", "score"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Non-Determinism
//!
//! Encryption is randomized: the same value encrypts to different bytes every
//! time. Tests compare decrypted values, never ciphertext bytes.

pub mod backend;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod serialize;
pub mod submission;
pub mod verify;

// Re-exports for convenience
pub use backend::{BackendId, FheBackend};
pub use encoding::{CellValue, EncodedMatrix, MESSAGE_DOMAIN_MAX, Row, TabularInput, encode, validate};
pub use engine::{EncryptedTable, encrypt_matrix};
pub use error::{BackendError, BackendResult, CellPosition, PrepError, PrepResult};
pub use keys::{KeyManager, KeyPair};
pub use pipeline::Pipeline;
pub use serialize::SerializedTable;
pub use submission::Submission;
pub use verify::{decrypt_cell, decrypt_table, verify_serialized};
