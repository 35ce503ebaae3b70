//! Transport form of a prepared submission
//!
//! Field names follow the camelCase JSON the marketplace backend already
//! consumes. Binary payloads are standard base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::backend::BackendId;
use crate::error::{BackendError, PrepError, PrepResult};
use crate::serialize::SerializedTable;

/// Everything the transport collaborator hands to the remote compute side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub backend: BackendId,
    /// Framed ciphertexts, row-major, one per cell
    pub encrypted_values: Vec<Vec<String>>,
    pub original_headers: Vec<String>,
    pub row_count: usize,
    pub column_count: usize,
    /// Framed compressed evaluation key
    pub evaluation_key: String,
}

impl Submission {
    pub fn new(backend: BackendId, table: &SerializedTable, evaluation_key: &[u8]) -> Self {
        let encrypted_values = table
            .cells()
            .iter()
            .map(|row| row.iter().map(|ct| STANDARD.encode(ct)).collect())
            .collect();

        Self {
            backend,
            encrypted_values,
            original_headers: table.headers().to_vec(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            evaluation_key: STANDARD.encode(evaluation_key),
        }
    }

    /// Decode the ciphertext payloads back into a [`SerializedTable`]
    pub fn to_table(&self) -> PrepResult<SerializedTable> {
        if self.encrypted_values.len() != self.row_count
            || self.original_headers.len() != self.column_count
        {
            return Err(PrepError::ShapeMismatch {
                row: self.encrypted_values.len().min(self.row_count),
            });
        }

        let cells = self
            .encrypted_values
            .iter()
            .map(|row| row.iter().map(|ct| decode(ct)).collect())
            .collect::<PrepResult<Vec<Vec<Vec<u8>>>>>()?;

        SerializedTable::from_parts(self.original_headers.clone(), cells)
    }

    pub fn evaluation_key_bytes(&self) -> PrepResult<Vec<u8>> {
        decode(&self.evaluation_key)
    }
}

fn decode(payload: &str) -> PrepResult<Vec<u8>> {
    STANDARD.decode(payload).map_err(|e| {
        PrepError::primitive(
            "decode_submission",
            BackendError::Deserialization(format!("invalid base64: {e}")),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SerializedTable {
        SerializedTable::from_parts(
            vec!["x".into(), "y".into()],
            vec![vec![vec![1, 2, 3], vec![4]], vec![vec![5], vec![6, 7]]],
        )
        .unwrap()
    }

    #[test]
    fn json_uses_camel_case() {
        let submission = Submission::new(BackendId::Mock, &table(), &[9, 9]);
        let json = serde_json::to_value(&submission).unwrap();

        assert_eq!(json["backend"], "mock");
        assert_eq!(json["rowCount"], 2);
        assert_eq!(json["columnCount"], 2);
        assert_eq!(json["originalHeaders"][1], "y");
        assert_eq!(json["encryptedValues"][0][0], STANDARD.encode([1, 2, 3]));
        assert_eq!(json["evaluationKey"], STANDARD.encode([9, 9]));
    }

    #[test]
    fn to_table_restores_bytes() {
        let original = table();
        let submission = Submission::new(BackendId::Mock, &original, &[1]);

        let parsed: Submission =
            serde_json::from_str(&serde_json::to_string(&submission).unwrap()).unwrap();
        assert_eq!(parsed.to_table().unwrap(), original);
        assert_eq!(parsed.evaluation_key_bytes().unwrap(), vec![1]);
    }

    #[test]
    fn to_table_rejects_inconsistent_counts() {
        let mut submission = Submission::new(BackendId::Mock, &table(), &[1]);
        submission.row_count = 3;
        assert!(matches!(
            submission.to_table(),
            Err(PrepError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn to_table_rejects_bad_base64() {
        let mut submission = Submission::new(BackendId::Mock, &table(), &[1]);
        submission.encrypted_values[1][0] = "not base64!".into();
        assert!(submission.to_table().unwrap_err().is_primitive_failure());
    }
}
