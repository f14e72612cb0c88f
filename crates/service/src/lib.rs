//! Service layer for the lens collection.
//! - `lens`: the open-schema record, collection operations, id generation
//!   and the `LensService` that runs each request as load → mutate → save.
//! - `storage`: the `LensStorage` port with file-backed and in-memory adapters.

pub mod errors;
pub mod lens;
pub mod storage;

pub use errors::ServiceError;
pub use lens::{Lens, LensService};
