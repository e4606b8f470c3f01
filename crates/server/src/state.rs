use std::sync::Arc;

use configs::UnlockConfig;
use service::unlock::UnlockStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UnlockStore>,
    pub unlock: Arc<UnlockConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn UnlockStore>, unlock: UnlockConfig) -> Self {
        Self { store, unlock: Arc::new(unlock) }
    }
}
