//! Rainbow table related constants

// =============================================================================
// Digest parameters
// =============================================================================

/// Output size of the digest primitive (MD5) in bytes
///
/// Hash keys are truncated digests, so this is also the longest hash length
/// a table can be configured with.
pub const DIGEST_SIZE: usize = 16;

/// Number of leading hash bytes mixed with the column index during reduction
pub const REDUCE_MIX_BYTES: usize = 4;

/// Number of random bytes used to seed a chain start
pub const RANDOM_SEED_BYTES: usize = 4;

/// Largest alphabet the reduction can draw from (one byte per candidate)
pub const MAX_ALPHABET_SIZE: usize = 256;

// =============================================================================
// Defaults
// =============================================================================

/// Default hash length in bytes (domain 256^3 = 16,777,216)
pub const DEFAULT_HASH_LENGTH: usize = 3;

/// Default number of reduce/hash steps per chain
pub const DEFAULT_ROW_LENGTH: u32 = 64;

// =============================================================================
// Sample-derived alphabets
// =============================================================================

/// Characters enabled by an uppercase letter in a sample password
pub const UPPERCASE_ALPHA: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Characters enabled by a lowercase letter in a sample password
pub const LOWERCASE_ALPHA: &str = "abcdefghijklmnopqrstuvwxyz";

/// Characters enabled by a digit in a sample password
pub const DIGITS: &str = "0123456789";
