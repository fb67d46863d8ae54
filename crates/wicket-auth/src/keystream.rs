use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::key::SecretKey;

pub const NONCE_LEN: usize = 8;
const BLOCK_LEN: usize = 16;

/// Derive `len` pseudorandom bytes from `key` and `nonce`.
///
/// Counter mode over the raw block cipher: block `i` is the encryption of
/// `nonce || little-endian-64(i)`, successive blocks are concatenated, and
/// the result is truncated to `len`. The same key, nonce, and length always
/// produce the same stream, and a shorter request is a prefix of a longer
/// one.
pub fn keystream(key: &SecretKey, nonce: &[u8; NONCE_LEN], len: usize) -> Vec<u8> {
    let cipher = Aes128::new(GenericArray::from_slice(key.as_bytes()));
    let mut out = Vec::with_capacity(len + BLOCK_LEN);
    let mut counter: u64 = 0;
    while out.len() < len {
        let mut block = [0u8; BLOCK_LEN];
        block[..NONCE_LEN].copy_from_slice(nonce);
        block[NONCE_LEN..].copy_from_slice(&counter.to_le_bytes());
        let mut block = GenericArray::from(block);
        cipher.encrypt_block(&mut block);
        out.extend_from_slice(&block);
        counter += 1;
    }
    out.truncate(len);
    out
}
