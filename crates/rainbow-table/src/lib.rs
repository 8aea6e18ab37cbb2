//! rainbow-table - Concurrent rainbow table construction and lookup
//!
//! This crate provides functionality to:
//! - Build a rainbow table of hash chains for a fixed password policy on
//!   background worker threads, with cooperative cancellation
//! - Search the table to recover a password from a truncated MD5 hash
//! - Estimate how much of the hash domain the table covers

pub mod app;
pub mod constants;
pub mod domain;
pub mod error;

// Re-export commonly used types
pub use app::generator::{BuildHandle, CancelToken};
pub use app::searcher::{search_all_passwords, search_password, search_password_parallel};
pub use app::table::RainbowTable;
pub use constants::*;
pub use domain::chain::ChainEntry;
pub use domain::coverage::CoverageEstimate;
pub use domain::hash::{hash_password, reduce_hash};
pub use domain::key::HashKey;
pub use domain::params::{Alphabet, RainbowParameters};
pub use error::{RainbowError, Result};
