use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RainbowError>;

#[derive(Error, Debug)]
pub enum RainbowError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("A build is already running on this table")]
    AlreadyBuilding,

    #[error("Invalid hash length: expected {expected} bytes, found {found} bytes")]
    InvalidHash { expected: usize, found: usize },

    #[error("Not a valid hex string")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("The system entropy source failed")]
    Entropy(#[from] rand::Error),

    #[error("Unable to spawn a build worker thread")]
    Spawn(#[from] io::Error),
}
