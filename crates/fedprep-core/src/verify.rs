//! Verification decryptor
//!
//! Local self-test only: confirms that what is about to be submitted decrypts
//! back to the encoded input. Never part of the submission path itself.

use tracing::debug;

use crate::backend::FheBackend;
use crate::encoding::EncodedMatrix;
use crate::engine::EncryptedTable;
use crate::error::{CellPosition, PrepError, PrepResult};
use crate::keys::KeyManager;
use crate::serialize::{self, SerializedTable};

/// Decrypt one ciphertext with the active client key
pub fn decrypt_cell<B: FheBackend>(keys: &KeyManager<B>, ct: &B::Ciphertext) -> PrepResult<u8> {
    let pair = keys.get_keys()?;
    keys.backend()
        .decrypt(pair.client(), ct)
        .map_err(|e| PrepError::primitive("decrypt", e))
}

/// Decrypt every cell of an in-memory table
pub fn decrypt_table<B: FheBackend>(
    keys: &KeyManager<B>,
    table: &EncryptedTable<B::Ciphertext>,
) -> PrepResult<Vec<Vec<u8>>> {
    table
        .cells()
        .iter()
        .map(|row| row.iter().map(|ct| decrypt_cell(keys, ct)).collect())
        .collect()
}

/// Deserialize and decrypt every cell, comparing against `expected`
///
/// Fails on the first cell whose plaintext differs, without reporting either
/// value.
pub fn verify_serialized<B: FheBackend>(
    keys: &KeyManager<B>,
    table: &SerializedTable,
    expected: &EncodedMatrix,
) -> PrepResult<()> {
    keys.get_keys()?;

    if table.row_count() != expected.row_count() {
        return Err(PrepError::ShapeMismatch {
            row: table.row_count().min(expected.row_count()),
        });
    }

    for (r, row) in table.cells().iter().enumerate() {
        if row.len() != expected.column_count() {
            return Err(PrepError::ShapeMismatch { row: r });
        }

        for (c, bytes) in row.iter().enumerate() {
            let position = expected.position(r, c);
            let ct = serialize::ciphertext_from_bytes(keys.backend(), bytes)
                .map_err(|e| with_position(e, &position))?;
            let value = decrypt_cell(keys, &ct).map_err(|e| with_position(e, &position))?;

            if Some(value) != expected.get(r, c) {
                return Err(PrepError::VerificationMismatch { position });
            }
        }
    }

    debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        "Self-test passed"
    );
    Ok(())
}

fn with_position(err: PrepError, position: &CellPosition) -> PrepError {
    match err {
        PrepError::Primitive {
            operation,
            position: None,
            source,
        } => PrepError::Primitive {
            operation,
            position: Some(position.clone()),
            source,
        },
        other => other,
    }
}
