//! Error types for the Nebula engine
//!
//! This module defines the error types used throughout the engine,
//! including GPU backend failures, compositor content errors and
//! resource streaming failures.

use std::fmt;

/// Result type for Nebula engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nebula engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (graphics device, poisoned locks, broken graph wiring)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown id, inconsistent declaration, etc.)
    InvalidResource(String),

    /// Initialization failed (runtime, streamer, subsystems)
    InitializationFailed(String),

    /// Malformed asset bytes (wrong format type/version, truncated records)
    InvalidAsset(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidAsset(msg) => write!(f, "Invalid asset: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
