//! Common error types for Beansort

use thiserror::Error;

/// Common result type for Beansort operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Beansort crates
///
/// A failed classification is deliberately NOT represented here: it is a
/// normal lifecycle outcome (the item lands in the error lane), carried by
/// [`crate::types::ClassificationFailed`] instead.
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
}
