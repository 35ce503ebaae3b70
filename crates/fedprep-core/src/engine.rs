//! Cell encryption engine
//!
//! Encrypts an [`EncodedMatrix`] cell by cell. Cells are independent, so the
//! work runs on the rayon pool over a flat arena of `rows * columns` slots;
//! collection is indexed, so the output order never depends on completion
//! order.

use rayon::prelude::*;
use tracing::debug;

use crate::backend::FheBackend;
use crate::encoding::EncodedMatrix;
use crate::error::{PrepError, PrepResult};
use crate::keys::{KeyManager, KeyPair};

/// Row-major ciphertext matrix with the original table shape
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct EncryptedTable<C> {
    cells: Vec<Vec<C>>,
    headers: Vec<String>,
}

impl<C> EncryptedTable<C> {
    pub fn cells(&self) -> &[Vec<C>] {
        &self.cells
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&C> {
        self.cells.get(row).and_then(|r| r.get(column))
    }
}

/// Active keys, generating them on first use
///
/// This is the single place in the pipeline allowed to cause key generation
/// implicitly. It happens at most once per [`KeyManager`].
fn keys_for_encryption<B: FheBackend>(keys: &KeyManager<B>) -> PrepResult<&KeyPair<B>> {
    match keys.get_keys() {
        Ok(pair) => Ok(pair),
        Err(PrepError::KeyNotInitialized) => {
            debug!("No active key pair, generating before encryption");
            keys.ensure_keys()
        }
        Err(e) => Err(e),
    }
}

/// Encrypt every cell of `matrix` under the session key pair
pub fn encrypt_matrix<B: FheBackend>(
    keys: &KeyManager<B>,
    matrix: &EncodedMatrix,
) -> PrepResult<EncryptedTable<B::Ciphertext>> {
    let pair = keys_for_encryption(keys)?;
    let backend = keys.backend();

    let columns = matrix.column_count();
    let total = matrix.row_count() * columns;
    debug!(
        rows = matrix.row_count(),
        columns,
        "Encrypting {total} cells"
    );

    let flat = (0..total)
        .into_par_iter()
        .map(|slot| {
            let (row, column) = (slot / columns, slot % columns);
            let value = matrix.rows()[row][column];
            backend
                .encrypt(pair.client(), value)
                .map_err(|e| PrepError::primitive_at("encrypt", matrix.position(row, column), e))
        })
        .collect::<PrepResult<Vec<_>>>()?;

    let mut flat = flat.into_iter();
    let cells = (0..matrix.row_count())
        .map(|_| flat.by_ref().take(columns).collect())
        .collect();

    Ok(EncryptedTable {
        cells,
        headers: matrix.headers().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::backends::MockBackend;
    use crate::verify::decrypt_table;

    fn matrix(rows: Vec<Vec<u8>>) -> EncodedMatrix {
        let headers = (0..rows[0].len()).map(|c| format!("c{c}")).collect();
        EncodedMatrix::new(headers, rows).unwrap()
    }

    #[test]
    fn encrypts_lazily_initializing_keys() {
        let keys = KeyManager::new(MockBackend::new());
        assert!(!keys.is_initialized());

        let m = matrix(vec![vec![3, 7]]);
        let table = encrypt_matrix(&keys, &m).unwrap();

        assert!(keys.is_initialized());
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.headers(), ["c0", "c1"]);
    }

    #[test]
    fn preserves_positions() {
        let keys = KeyManager::new(MockBackend::new());
        let rows: Vec<Vec<u8>> = (0..37)
            .map(|r| (0..5).map(|c| ((r * 5 + c) % 8) as u8).collect())
            .collect();
        let m = matrix(rows.clone());

        let table = encrypt_matrix(&keys, &m).unwrap();
        assert_eq!(decrypt_table(&keys, &table).unwrap(), rows);
    }

    #[test]
    fn reuses_existing_keys() {
        let keys = KeyManager::new(MockBackend::new());
        keys.ensure_keys().unwrap();
        let before = keys.public_key_bytes().unwrap();

        encrypt_matrix(&keys, &matrix(vec![vec![1]])).unwrap();
        encrypt_matrix(&keys, &matrix(vec![vec![2]])).unwrap();

        assert_eq!(keys.public_key_bytes().unwrap(), before);
    }
}
