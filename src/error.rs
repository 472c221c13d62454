//! Error types for the arcade hub
//!
//! Simulation cores never fail; only catalog lookup, configuration parsing
//! and persistence surface errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
