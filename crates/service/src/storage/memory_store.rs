use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::LensStorage;
use crate::errors::ServiceError;
use crate::lens::Lens;

/// In-process storage. Can be told to fail saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Vec<Lens>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lenses(lenses: Vec<Lens>) -> Self {
        Self { inner: RwLock::new(lenses), ..Self::default() }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<Lens> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl LensStorage for MemoryStore {
    async fn load(&self) -> Result<Vec<Lens>, ServiceError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, lenses: &[Lens]) -> Result<(), ServiceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage("memory store: saves disabled".into()));
        }
        *self.inner.write().await = lenses.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
