use std::sync::Arc;

use tokio::sync::Mutex;

use crate::storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(store: Store, cors_origin: impl Into<String>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            cors_origin: cors_origin.into(),
        }
    }
}
