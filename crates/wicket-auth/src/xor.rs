use crate::errors::{AuthError, AuthResult};

/// Byte-wise XOR of `data` with `keystream`.
///
/// Encryption and decryption are the same operation: applying the identical
/// keystream twice recovers the input. The buffers must match in length;
/// this never truncates or pads.
pub fn apply(data: &[u8], keystream: &[u8]) -> AuthResult<Vec<u8>> {
    if data.len() != keystream.len() {
        return Err(AuthError::LengthMismatch(data.len(), keystream.len()));
    }
    Ok(data
        .iter()
        .zip(keystream)
        .map(|(byte, mask)| byte ^ mask)
        .collect())
}
