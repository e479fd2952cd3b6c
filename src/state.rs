use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::NewsStore;
use crate::storage::FileStorage;

/// Shared handles every route can reach.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NewsStore>,
    pub storage: Arc<dyn FileStorage>,
    pub auth: Arc<AuthConfig>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn NewsStore>,
        storage: Arc<dyn FileStorage>,
        auth: AuthConfig,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            storage,
            auth: Arc::new(auth),
            max_upload_bytes,
        }
    }
}
