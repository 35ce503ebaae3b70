//! Serialization layer
//!
//! Turns ciphertexts and the evaluation key into transportable bytes. Every
//! payload is framed as `[kind][backend][body]`, where `body` is the
//! primitive's own encoding, so a payload identifies itself without any
//! external metadata.

use tracing::debug;

use crate::backend::{BackendId, FheBackend};
use crate::engine::EncryptedTable;
use crate::error::{BackendError, BackendResult, CellPosition, PrepError, PrepResult};
use crate::keys::KeyManager;

const HEADER_LEN: usize = 2;

/// What a serialized payload contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadKind {
    Ciphertext = 0x01,
    EvaluationKey = 0x02,
}

impl TryFrom<u8> for PayloadKind {
    type Error = BackendError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Ciphertext),
            0x02 => Ok(Self::EvaluationKey),
            other => Err(BackendError::Deserialization(format!(
                "Unknown payload kind: {other:#04x}"
            ))),
        }
    }
}

fn frame(kind: PayloadKind, backend: BackendId, body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.push(kind as u8);
    out.push(backend as u8);
    out.extend(body);
    out
}

fn unframe(kind: PayloadKind, backend: BackendId, bytes: &[u8]) -> BackendResult<&[u8]> {
    let (found_kind, found_backend) = peek(bytes)?;

    if found_kind != kind {
        return Err(BackendError::Deserialization(format!(
            "Expected {kind:?} payload, got {found_kind:?}"
        )));
    }
    if found_backend != backend {
        return Err(BackendError::Deserialization(format!(
            "Payload produced by {found_backend} backend, expected {backend}"
        )));
    }
    Ok(&bytes[HEADER_LEN..])
}

/// Read the frame header of a payload without decoding the body
pub fn peek(bytes: &[u8]) -> BackendResult<(PayloadKind, BackendId)> {
    if bytes.len() < HEADER_LEN {
        return Err(BackendError::Deserialization("Payload too short".into()));
    }
    Ok((
        PayloadKind::try_from(bytes[0])?,
        BackendId::try_from(bytes[1])?,
    ))
}

fn encode_ciphertext<B: FheBackend>(backend: &B, ct: &B::Ciphertext) -> BackendResult<Vec<u8>> {
    let body = backend.ciphertext_to_bytes(ct)?;
    Ok(frame(PayloadKind::Ciphertext, backend.backend_id(), body))
}

fn decode_ciphertext<B: FheBackend>(backend: &B, bytes: &[u8]) -> BackendResult<B::Ciphertext> {
    let body = unframe(PayloadKind::Ciphertext, backend.backend_id(), bytes)?;
    backend.ciphertext_from_bytes(body)
}

/// Serialize one ciphertext
pub fn ciphertext_to_bytes<B: FheBackend>(backend: &B, ct: &B::Ciphertext) -> PrepResult<Vec<u8>> {
    encode_ciphertext(backend, ct).map_err(|e| PrepError::primitive("serialize_ciphertext", e))
}

/// Deserialize one ciphertext produced by [`ciphertext_to_bytes`]
pub fn ciphertext_from_bytes<B: FheBackend>(backend: &B, bytes: &[u8]) -> PrepResult<B::Ciphertext> {
    decode_ciphertext(backend, bytes).map_err(|e| PrepError::primitive("deserialize_ciphertext", e))
}

/// Serialize the public evaluation key of the active key pair
///
/// One-directional: nothing in this crate reads a foreign evaluation key.
pub fn evaluation_key_to_bytes<B: FheBackend>(keys: &KeyManager<B>) -> PrepResult<Vec<u8>> {
    let pair = keys.get_keys()?;
    let backend = keys.backend();

    let body = backend
        .evaluation_key_to_bytes(pair.evaluation())
        .map_err(|e| PrepError::primitive("serialize_evaluation_key", e))?;
    debug!(size = body.len(), "Serialized evaluation key");

    Ok(frame(PayloadKind::EvaluationKey, backend.backend_id(), body))
}

/// Byte form of an [`EncryptedTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTable {
    cells: Vec<Vec<Vec<u8>>>,
    headers: Vec<String>,
}

impl SerializedTable {
    /// Rebuild from transported parts, checking that the shape is rectangular
    pub fn from_parts(headers: Vec<String>, cells: Vec<Vec<Vec<u8>>>) -> PrepResult<Self> {
        if cells.is_empty() {
            return Err(PrepError::EmptyInput("no rows"));
        }
        if headers.is_empty() {
            return Err(PrepError::EmptyInput("no columns"));
        }
        if let Some(row) = cells.iter().position(|r| r.len() != headers.len()) {
            return Err(PrepError::ShapeMismatch { row });
        }
        Ok(Self { cells, headers })
    }

    pub fn cells(&self) -> &[Vec<Vec<u8>>] {
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

    pub fn get(&self, row: usize, column: usize) -> Option<&[u8]> {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .map(Vec::as_slice)
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Vec<u8>>>) {
        (self.headers, self.cells)
    }
}

/// Serialize every ciphertext of a table, keeping positions
pub fn serialize_table<B: FheBackend>(
    backend: &B,
    table: &EncryptedTable<B::Ciphertext>,
) -> PrepResult<SerializedTable> {
    let cells = table
        .cells()
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, ct)| {
                    encode_ciphertext(backend, ct).map_err(|e| {
                        let position = CellPosition::new(r, c, &table.headers()[c]);
                        PrepError::primitive_at("serialize_ciphertext", position, e)
                    })
                })
                .collect::<PrepResult<Vec<_>>>()
        })
        .collect::<PrepResult<Vec<_>>>()?;

    Ok(SerializedTable {
        cells,
        headers: table.headers().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::backends::MockBackend;

    #[test]
    fn ciphertext_roundtrip_decrypts() {
        let keys = KeyManager::new(MockBackend::new());
        let pair = keys.ensure_keys().unwrap();
        let backend = keys.backend();

        for n in 0..=7u8 {
            let ct = backend.encrypt(pair.client(), n).unwrap();
            let bytes = ciphertext_to_bytes(backend, &ct).unwrap();
            assert_eq!(
                peek(&bytes).unwrap(),
                (PayloadKind::Ciphertext, BackendId::Mock)
            );

            let restored = ciphertext_from_bytes(backend, &bytes).unwrap();
            assert_eq!(backend.decrypt(pair.client(), &restored).unwrap(), n);
        }
    }

    #[test]
    fn evaluation_key_requires_keys() {
        let keys = KeyManager::new(MockBackend::new());
        assert!(matches!(
            evaluation_key_to_bytes(&keys),
            Err(PrepError::KeyNotInitialized)
        ));
    }

    #[test]
    fn evaluation_key_is_framed() {
        let keys = KeyManager::new(MockBackend::new());
        keys.ensure_keys().unwrap();

        let bytes = evaluation_key_to_bytes(&keys).unwrap();
        assert_eq!(
            peek(&bytes).unwrap(),
            (PayloadKind::EvaluationKey, BackendId::Mock)
        );
        assert_eq!(bytes.len(), HEADER_LEN + 32);
    }

    #[test]
    fn rejects_wrong_kind_and_truncation() {
        let keys = KeyManager::new(MockBackend::new());
        keys.ensure_keys().unwrap();
        let backend = keys.backend();

        let eval = evaluation_key_to_bytes(&keys).unwrap();
        let err = ciphertext_from_bytes(backend, &eval).unwrap_err();
        assert!(err.is_primitive_failure());

        assert!(ciphertext_from_bytes(backend, &[]).is_err());
        assert!(ciphertext_from_bytes(backend, &[0x01]).is_err());
    }

    #[test]
    fn rejects_foreign_backend_tag() {
        let keys = KeyManager::new(MockBackend::new());
        let pair = keys.ensure_keys().unwrap();
        let backend = keys.backend();

        let ct = backend.encrypt(pair.client(), 1).unwrap();
        let mut bytes = ciphertext_to_bytes(backend, &ct).unwrap();
        bytes[1] = BackendId::Tfhe as u8;

        assert!(ciphertext_from_bytes(backend, &bytes).is_err());
    }

    #[test]
    fn from_parts_checks_shape() {
        let headers = vec!["a".to_string(), "b".to_string()];
        assert!(SerializedTable::from_parts(headers.clone(), vec![vec![vec![1], vec![2]]]).is_ok());
        assert!(matches!(
            SerializedTable::from_parts(headers.clone(), vec![vec![vec![1]]]),
            Err(PrepError::ShapeMismatch { row: 0 })
        ));
        assert!(matches!(
            SerializedTable::from_parts(headers, vec![]),
            Err(PrepError::EmptyInput(_))
        ));
    }
}
