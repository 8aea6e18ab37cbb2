//! Application layer - Use case implementations
//!
//! This module coordinates the domain layer with shared state and threads.

pub mod generator;
pub mod searcher;
pub mod table;
