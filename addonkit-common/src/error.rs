//! Common error types for addonkit

use thiserror::Error;

/// Common result type for addonkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across addonkit crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required argument was absent
    #[error("{0} cannot be null")]
    MissingArgument(&'static str),

    /// Addon already holds the maximum number of drawables for a slot
    #[error("Addon '{addon}' is full for this slot ({capacity} drawables)")]
    CapacityExceeded {
        addon: String,
        capacity: usize,
    },

    /// Character definition or alternate variation file could not be decoded
    #[error("Definition error: {0}")]
    Definition(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
