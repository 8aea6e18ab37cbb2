//! Table parameters
//!
//! This module defines the password policy and table shape shared by the
//! chain builder, the table store and the search engine.

use crate::constants::{
    DIGEST_SIZE, DIGITS, LOWERCASE_ALPHA, MAX_ALPHABET_SIZE, UPPERCASE_ALPHA,
};
use crate::error::{RainbowError, Result};
use rustc_hash::FxHashSet;

/// Ordered set of characters a password may contain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Create an alphabet from its characters, in order
    ///
    /// Fails if the alphabet is empty, contains a character twice, or holds
    /// more than 256 characters.
    pub fn new(chars: &str) -> Result<Self> {
        let chars: Vec<char> = chars.chars().collect();

        if chars.is_empty() {
            return Err(RainbowError::InvalidParameters(
                "alphabet must not be empty".to_string(),
            ));
        }
        if chars.len() > MAX_ALPHABET_SIZE {
            return Err(RainbowError::InvalidParameters(format!(
                "alphabet has {} characters, at most {} are supported",
                chars.len(),
                MAX_ALPHABET_SIZE
            )));
        }

        let mut seen = FxHashSet::default();
        for &c in &chars {
            if !seen.insert(c) {
                return Err(RainbowError::InvalidParameters(format!(
                    "alphabet contains '{}' more than once",
                    c
                )));
            }
        }

        Ok(Self { chars })
    }

    /// Derive an alphabet from a sample password
    ///
    /// Each character class present in the sample (uppercase letters,
    /// lowercase letters, digits) enables the whole class. Any other
    /// character is rejected.
    pub fn from_sample(sample: &str) -> Result<Self> {
        if sample.is_empty() {
            return Err(RainbowError::InvalidParameters(
                "sample password must not be empty".to_string(),
            ));
        }

        let mut upper = false;
        let mut lower = false;
        let mut digits = false;

        for c in sample.chars() {
            match c {
                'A'..='Z' => upper = true,
                'a'..='z' => lower = true,
                '0'..='9' => digits = true,
                _ => {
                    return Err(RainbowError::InvalidParameters(format!(
                        "sample contains '{}'; only use uppercase alpha, lowercase alpha, digits",
                        c
                    )));
                }
            }
        }

        let mut chars = String::new();
        if upper {
            chars.push_str(UPPERCASE_ALPHA);
        }
        if lower {
            chars.push_str(LOWERCASE_ALPHA);
        }
        if digits {
            chars.push_str(DIGITS);
        }

        Self::new(&chars)
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false for a constructed alphabet
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at the given index
    #[inline]
    pub fn get(&self, index: usize) -> char {
        self.chars[index]
    }

    /// Check whether a character belongs to the alphabet
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Characters in alphabet order
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Immutable parameters of one rainbow table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RainbowParameters {
    /// Allowed password characters
    pub alphabet: Alphabet,
    /// Password length in characters
    pub password_length: usize,
    /// Hash length in bytes (truncated digest)
    pub hash_length: usize,
    /// Number of hash/reduce steps per chain
    pub row_length: u32,
    /// Number of build worker threads
    pub thread_count: usize,
}

impl RainbowParameters {
    /// Validate and bundle table parameters
    pub fn new(
        alphabet: Alphabet,
        password_length: usize,
        hash_length: usize,
        row_length: u32,
        thread_count: usize,
    ) -> Result<Self> {
        if password_length == 0 {
            return Err(RainbowError::InvalidParameters(
                "password length must be at least 1".to_string(),
            ));
        }
        if hash_length == 0 || hash_length > DIGEST_SIZE {
            return Err(RainbowError::InvalidParameters(format!(
                "hash length must be in [1, {}], got {}",
                DIGEST_SIZE, hash_length
            )));
        }
        if row_length == 0 {
            return Err(RainbowError::InvalidParameters(
                "row length must be at least 1".to_string(),
            ));
        }
        if thread_count == 0 {
            return Err(RainbowError::InvalidParameters(
                "thread count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            alphabet,
            password_length,
            hash_length,
            row_length,
            thread_count,
        })
    }

    /// Size of the hash domain (256^hash_length)
    pub fn hash_domain_size(&self) -> f64 {
        256f64.powi(self.hash_length as i32)
    }

    /// Check whether a string is a well-formed password for these parameters
    pub fn is_valid_password(&self, password: &str) -> bool {
        password.chars().count() == self.password_length
            && password.chars().all(|c| self.alphabet.contains(c))
    }
}
