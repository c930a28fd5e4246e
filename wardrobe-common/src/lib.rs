//! # Wardrobe Common Library
//!
//! Shared code for Wardrobe services:
//! - Common error type
//! - Configuration file location and loading
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
