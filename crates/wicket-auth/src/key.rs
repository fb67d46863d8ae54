use crate::errors::{AuthError, AuthResult};
use rand::RngCore;
use std::fmt;

/// Keys are AES-128 sized; the envelope reuses the same bytes for the MAC.
pub const KEY_LEN: usize = 16;

/// The process-wide symmetric secret. Constructed once at startup and only
/// ever borrowed read-only by the cryptographic operations.
#[derive(Clone)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Draw a fresh random key. Generated keys are not persisted, so tickets
    /// sealed before a restart will no longer verify after one.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> AuthResult<Self> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| AuthError::KeyLength {
            expected: KEY_LEN,
            got: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

// Debug never prints key material.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}
