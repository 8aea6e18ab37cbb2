//! Fixed-length hash key
//!
//! `HashKey` is the value type used for chain ends and search targets.
//! Equality is byte-wise; the `Hash` implementation feeds a digest of the
//! bytes to the hasher instead of the raw bytes, so short keys still spread
//! evenly across buckets.

use crate::constants::DIGEST_SIZE;
use crate::error::{RainbowError, Result};
use md5::{Digest, Md5};
use std::hash::{Hash, Hasher};

/// A truncated digest of 1 to 16 bytes
#[derive(Clone, Copy)]
pub struct HashKey {
    /// Key bytes; everything past `len` stays zero
    bytes: [u8; DIGEST_SIZE],
    len: u8,
}

impl HashKey {
    /// Create a key from raw bytes
    ///
    /// Only the digest bounds are checked here: fails with
    /// `InvalidParameters` unless the slice holds 1 to 16 bytes.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() > DIGEST_SIZE {
            return Err(RainbowError::InvalidParameters(format!(
                "hash key must be 1 to {} bytes, got {}",
                DIGEST_SIZE,
                bytes.len()
            )));
        }
        Ok(Self::truncated(bytes, bytes.len()))
    }

    /// Parse a key from hex without prefix, requiring exactly `hash_length` bytes
    pub fn from_hex(text: &str, hash_length: usize) -> Result<Self> {
        let bytes = hex::decode(text.trim())?;
        if bytes.len() != hash_length {
            return Err(RainbowError::InvalidHash {
                expected: hash_length,
                found: bytes.len(),
            });
        }
        Self::new(&bytes)
    }

    /// Keep the first `len` bytes of a digest
    ///
    /// Callers guarantee `1 <= len <= min(digest.len(), DIGEST_SIZE)`.
    pub(crate) fn truncated(digest: &[u8], len: usize) -> Self {
        let mut bytes = [0u8; DIGEST_SIZE];
        bytes[..len].copy_from_slice(&digest[..len]);
        Self {
            bytes,
            len: len as u8,
        }
    }

    /// Key bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Key length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false for a constructed key
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PartialEq for HashKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for HashKey {}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let digest = Md5::digest(self.as_bytes());
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        state.write_u64(u64::from_le_bytes(word));
    }
}

impl std::fmt::Display for HashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode_upper(self.as_bytes()))
    }
}

impl std::fmt::Debug for HashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HashKey({})", self)
    }
}
