//! Chain operations implementation
//!
//! This module provides the chain entry structure and functions for
//! chain generation and verification in rainbow table operations.

use crate::domain::hash::{hash_password, random_password, reduce_hash};
use crate::domain::key::HashKey;
use crate::domain::params::RainbowParameters;
use crate::error::Result;

/// Chain entry structure
///
/// Replaying `row_length` hash/reduce steps from `start` reproduces `end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEntry {
    /// Starting password of the chain
    pub start: String,
    /// Last hash of the chain
    pub end: HashKey,
}

impl ChainEntry {
    /// Create a new chain entry
    pub fn new(start: String, end: HashKey) -> Self {
        Self { start, end }
    }
}

/// Compute a single chain
///
/// Starting from `start`, repeat hash → reduce `row_length` times. The hash
/// computed in the last step is the chain end; the password reduced from it
/// is discarded.
///
/// # Arguments
/// * `params` - Password policy, hash length and row length
/// * `start` - The starting password of the chain
///
/// # Returns
/// The chain entry pairing `start` with its end hash
pub fn compute_chain(params: &RainbowParameters, start: String) -> ChainEntry {
    let mut hash = hash_password(params, &start);

    for column in 1..params.row_length {
        let password = reduce_hash(params, &hash, column - 1);
        hash = hash_password(params, &password);
    }

    ChainEntry { start, end: hash }
}

/// Build a chain from a random start
pub fn build_random_chain(params: &RainbowParameters) -> Result<ChainEntry> {
    let start = random_password(params)?;
    Ok(compute_chain(params, start))
}

/// Replay a chain and look for the target hash in any column
///
/// A merge at the chain end does not mean the target occurs inside the
/// chain, so every search candidate is replayed here.
///
/// # Arguments
/// * `params` - Table parameters
/// * `start` - The starting password of the candidate chain
/// * `target` - The hash to look for
///
/// # Returns
/// `Some(password)` for the first column hashing to `target`, `None` otherwise
pub fn find_in_chain(params: &RainbowParameters, start: &str, target: &HashKey) -> Option<String> {
    let mut password = start.to_string();

    for column in 0..params.row_length {
        let hash = hash_password(params, &password);
        if hash == *target {
            return Some(password);
        }
        password = reduce_hash(params, &hash, column);
    }

    None
}

/// Enumerate every column of a chain
///
/// Returns `row_length` (password, hash) pairs, where each password hashes
/// to its paired hash and the last hash is the chain end.
pub fn enumerate_chain(params: &RainbowParameters, start: &str) -> Vec<(String, HashKey)> {
    let mut columns = Vec::with_capacity(params.row_length as usize);
    let mut password = start.to_string();

    for column in 0..params.row_length {
        let hash = hash_password(params, &password);
        let next = reduce_hash(params, &hash, column);
        columns.push((password, hash));
        password = next;
    }

    columns
}

/// Iterate over the whole password space in alphabet order
///
/// The first character varies slowest. Intended for small policies
/// (tests, coverage checks); the space grows as `|alphabet|^length`.
pub fn all_passwords(params: &RainbowParameters) -> impl Iterator<Item = String> + '_ {
    let char_count = params.alphabet.len();
    let length = params.password_length;
    let mut indices = vec![0usize; length];
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }

        let password: String = indices.iter().map(|&i| params.alphabet.get(i)).collect();

        // Odometer increment from the last position
        done = true;
        for position in (0..length).rev() {
            indices[position] += 1;
            if indices[position] < char_count {
                done = false;
                break;
            }
            indices[position] = 0;
        }

        Some(password)
    })
}
