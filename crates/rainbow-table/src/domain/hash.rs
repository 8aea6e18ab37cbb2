//! Hash function implementations
//!
//! This module provides the hash function mapping passwords to truncated
//! digests and the reduction function mapping digests back to passwords.

use crate::constants::{RANDOM_SEED_BYTES, REDUCE_MIX_BYTES};
use crate::domain::key::HashKey;
use crate::domain::params::RainbowParameters;
use crate::error::Result;
use md5::{Digest, Md5};
use rand::RngCore;
use rand::rngs::OsRng;

/// Hash a password to a key of `hash_length` bytes
///
/// The password's UTF-8 bytes are digested with MD5 and the digest is
/// truncated to the configured hash length.
#[inline]
pub fn hash_password(params: &RainbowParameters, password: &str) -> HashKey {
    let digest = Md5::digest(password.as_bytes());
    HashKey::truncated(&digest, params.hash_length)
}

/// Reduce a hash to a password (the reduction function)
///
/// The column index takes part in the reduction so the same hash maps to
/// different passwords at different chain positions.
#[inline]
pub fn reduce_hash(params: &RainbowParameters, hash: &HashKey, column: u32) -> String {
    derive_password(params, hash.as_bytes(), column)
}

/// Generate a random chain start
///
/// Four bytes from the OS entropy source are digested and reduced at
/// column 0, so starts follow the same character distribution as every
/// other column.
pub fn random_password(params: &RainbowParameters) -> Result<String> {
    let mut seed = [0u8; RANDOM_SEED_BYTES];
    OsRng.try_fill_bytes(&mut seed)?;

    let digest = Md5::digest(seed);
    Ok(derive_password(params, &digest, 0))
}

/// Reduction over raw bytes
///
/// 1. XOR the first up to four bytes with the little-endian column bytes
/// 2. Digest the mixed buffer
/// 3. Map digest bytes to characters, skipping bytes in the biased tail
///    `v >= 256 / k * k`, and re-digesting when the stream runs out
fn derive_password(params: &RainbowParameters, bytes: &[u8], column: u32) -> String {
    let mut mixed = bytes.to_vec();
    for (b, c) in mixed
        .iter_mut()
        .zip(column.to_le_bytes())
        .take(REDUCE_MIX_BYTES)
    {
        *b ^= c;
    }

    let alphabet = &params.alphabet;
    let char_count = alphabet.len();
    let limit = 256 / char_count * char_count;

    let mut stream = Md5::digest(&mixed);
    let mut password = String::with_capacity(params.password_length);
    let mut produced = 0;
    let mut index = 0;

    while produced < params.password_length {
        // Exhausted: extend the stream by digesting it again
        if index >= stream.len() {
            stream = Md5::digest(stream);
            index = 0;
        }

        let v = stream[index] as usize;
        if v < limit {
            password.push(alphabet.get(v % char_count));
            produced += 1;
        }
        index += 1;
    }

    password
}
