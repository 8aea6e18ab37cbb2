//! Domain layer - Pure computational logic
//!
//! This module contains pure functions and value types without threads or locks.

pub mod chain;
pub mod coverage;
pub mod hash;
pub mod key;
pub mod params;
