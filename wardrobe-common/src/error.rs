//! Common error types for Wardrobe services

use thiserror::Error;

/// Common result type for Wardrobe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Wardrobe services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
