use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::collection;
use super::domain::{lens_id, Lens};
use super::id::{IdGenerator, UuidIdGenerator};
use crate::errors::ServiceError;
use crate::storage::LensStorage;

// Attempts at drawing an id not already present in the collection.
const MAX_ID_ATTEMPTS: usize = 8;

/// Lens CRUD over a [`LensStorage`].
///
/// Every call reads the whole collection from storage; mutations write it
/// back before returning. Mutations are serialised through `write_lock` so
/// two overlapping read-modify-write cycles cannot drop each other's changes.
pub struct LensService {
    storage: Arc<dyn LensStorage>,
    ids: Arc<dyn IdGenerator>,
    write_lock: Mutex<()>,
}

impl LensService {
    pub fn new(storage: Arc<dyn LensStorage>) -> Self {
        Self::with_id_generator(storage, Arc::new(UuidIdGenerator))
    }

    pub fn with_id_generator(storage: Arc<dyn LensStorage>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { storage, ids, write_lock: Mutex::new(()) }
    }

    pub async fn list(&self) -> Result<Vec<Lens>, ServiceError> {
        self.storage.load().await
    }

    pub async fn get(&self, id: &str) -> Result<Lens, ServiceError> {
        let lenses = self.storage.load().await?;
        match collection::find_by_id(&lenses, id) {
            Some(lens) => Ok(lens.clone()),
            None => {
                debug!(lens_id = id, "lens not found");
                Err(ServiceError::not_found("lens"))
            }
        }
    }

    /// Store `body` as a new lens under a freshly generated id.
    pub async fn create(&self, body: Lens) -> Result<Lens, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut lenses = self.storage.load().await?;
        let id = self.fresh_id(&lenses)?;
        let created = collection::insert(&mut lenses, body, id);
        self.storage.save(&lenses).await?;
        info!(event = "lens_created", lens_id = lens_id(&created), total = lenses.len(), "lens created");
        Ok(created)
    }

    /// Merge `partial` over the lens with `id`.
    pub async fn update(&self, id: &str, partial: Lens) -> Result<Lens, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut lenses = self.storage.load().await?;
        let Some(updated) = collection::update(&mut lenses, id, partial)? else {
            debug!(lens_id = id, "update of unknown lens");
            return Err(ServiceError::not_found("lens"));
        };
        self.storage.save(&lenses).await?;
        info!(event = "lens_updated", lens_id = id, "lens updated");
        Ok(updated)
    }

    /// Remove the lens with `id`, returning it.
    pub async fn delete(&self, id: &str) -> Result<Lens, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut lenses = self.storage.load().await?;
        let Some(removed) = collection::delete(&mut lenses, id) else {
            debug!(lens_id = id, "delete of unknown lens");
            return Err(ServiceError::not_found("lens"));
        };
        self.storage.save(&lenses).await?;
        info!(event = "lens_deleted", lens_id = id, total = lenses.len(), "lens deleted");
        Ok(removed)
    }

    fn fresh_id(&self, lenses: &[Lens]) -> Result<String, ServiceError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !id.is_empty() && collection::find_by_id(lenses, &id).is_none() {
                return Ok(id);
            }
        }
        Err(ServiceError::Conflict("could not allocate a unique lens id".into()))
    }
}
