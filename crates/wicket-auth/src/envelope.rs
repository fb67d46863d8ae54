//! Authenticated envelope carrying a sealed payload.
//!
//! Encrypt-then-MAC over the counter-mode keystream. Wire form is
//! `mac(32) || nonce(8) || ciphertext`, with the tag computed over
//! `nonce || ciphertext`. Opening verifies the tag before a single byte of
//! ciphertext is decrypted or inspected.
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::{AuthError, AuthResult};
use crate::key::SecretKey;
use crate::keystream::{keystream, NONCE_LEN};
use crate::xor;

type HmacSha256 = Hmac<Sha256>;

pub const MAC_LEN: usize = 32;

/// Smallest well-formed envelope: a tag and a nonce around an empty payload.
pub const MIN_LEN: usize = MAC_LEN + NONCE_LEN;

/// Seal `plaintext` under `key` with a fresh random nonce.
pub fn seal(plaintext: &[u8], key: &SecretKey) -> AuthResult<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    seal_with_nonce(plaintext, key, nonce)
}

// Nonce selection stays inside this module: a repeated nonce under one key
// voids both confidentiality and integrity, so callers never supply one.
fn seal_with_nonce(
    plaintext: &[u8],
    key: &SecretKey,
    nonce: [u8; NONCE_LEN],
) -> AuthResult<Vec<u8>> {
    let stream = keystream(key, &nonce, plaintext.len());
    let ciphertext = xor::apply(plaintext, &stream)?;

    let mut mac = mac_for(key);
    mac.update(&nonce);
    mac.update(&ciphertext);
    let tag = mac.finalize().into_bytes();

    let mut blob = Vec::with_capacity(MIN_LEN + ciphertext.len());
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Open a sealed blob, verifying the tag before decrypting.
///
/// Fails with [`AuthError::MalformedEnvelope`] when the blob cannot hold a
/// tag and nonce, and with [`AuthError::AuthenticationFailed`] on any tag
/// mismatch. Tampering and corruption are indistinguishable by design.
pub fn open(blob: &[u8], key: &SecretKey) -> AuthResult<Vec<u8>> {
    if blob.len() < MIN_LEN {
        return Err(AuthError::MalformedEnvelope(blob.len()));
    }
    let (tag, rest) = blob.split_at(MAC_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let mut mac = mac_for(key);
    mac.update(nonce);
    mac.update(ciphertext);
    let expected = mac.finalize().into_bytes();
    if !bool::from(expected.as_slice().ct_eq(tag)) {
        return Err(AuthError::AuthenticationFailed);
    }

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce);
    let stream = keystream(key, &nonce_bytes, ciphertext.len());
    xor::apply(ciphertext, &stream)
}

fn mac_for(key: &SecretKey) -> HmacSha256 {
    HmacSha256::new_from_slice(key.as_bytes()).expect("hmac accepts any key length")
}
