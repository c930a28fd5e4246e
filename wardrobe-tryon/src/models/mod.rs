//! Data models for wardrobe-tryon
//!
//! - Image references and published-resource mappings
//! - Try-on task lifecycle
//! - Per-session model photo cache entries

pub mod model_cache_entry;
pub mod reference;
pub mod task;

pub use model_cache_entry::ModelCacheEntry;
pub use reference::{ImageReference, ResourceMapping};
pub use task::{GarmentSlot, TaskHandle, TaskState, TryOnMode, TryOnTask};
