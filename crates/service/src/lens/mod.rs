pub mod collection;
pub mod domain;
pub mod id;
pub mod service;

pub use domain::{lens_id, Lens, PersistedDocument};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use service::LensService;
