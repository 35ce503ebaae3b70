//! TFHE encryption operations

use crate::ciphertext::CellCiphertext;
use crate::error::{TfheError, TfheResult};
use crate::keys::TfheClientKey;

/// Encrypt a single cell value under the client key
///
/// The value must lie in the message space of the key's parameter set;
/// shortint would otherwise silently reduce it modulo the message modulus.
pub fn encrypt_cell(client: &TfheClientKey, value: u64) -> TfheResult<CellCiphertext> {
    let max = client.params().max_message();
    if value > max {
        return Err(TfheError::Encryption(format!(
            "message exceeds parameter set maximum of {max}"
        )));
    }

    Ok(CellCiphertext::new(client.inner().encrypt(value)))
}
