//! Storage abstractions for the lens collection.
//!
//! `LensStorage` is the port the service layer talks to; the file-backed
//! adapter is used in production and the in-memory one in tests.

pub mod json_file_store;
pub mod memory_store;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::lens::Lens;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Whole-collection persistence.
#[async_trait]
pub trait LensStorage: Send + Sync {
    /// Read the full collection. An absent store reads as empty.
    async fn load(&self) -> Result<Vec<Lens>, ServiceError>;
    /// Replace the full collection.
    async fn save(&self, lenses: &[Lens]) -> Result<(), ServiceError>;
}
