//! TFHE decryption operations

use crate::ciphertext::CellCiphertext;
use crate::error::{TfheError, TfheResult};
use crate::keys::TfheClientKey;

/// Decrypt a single cell ciphertext back to its message
///
/// Fails when the ciphertext was produced under a parameter set with a
/// different message modulus than the key's.
pub fn decrypt_cell(client: &TfheClientKey, ciphertext: &CellCiphertext) -> TfheResult<u64> {
    let expected = client.params().message_modulus();
    let found = ciphertext.inner().message_modulus.0 as u64;
    if found != expected {
        return Err(TfheError::Decryption(format!(
            "ciphertext message modulus {found} does not match key modulus {expected}"
        )));
    }

    // Reduced modulo the message modulus; carries are never set on fresh cells
    Ok(client.inner().decrypt(ciphertext.inner()))
}
