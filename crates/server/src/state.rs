use std::sync::Arc;

use service::{storage::LensStorage, LensService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub lenses: Arc<LensService>,
}

impl AppState {
    pub fn new(storage: Arc<dyn LensStorage>) -> Self {
        Self { lenses: Arc::new(LensService::new(storage)) }
    }
}
