//! Shared application state.

use fooddel_core::FoodDelConfig;
use fooddel_store::SqliteStore;

/// State handed to every handler through `State<Arc<AppState>>`.
pub struct AppState {
    pub config: FoodDelConfig,
    pub store: SqliteStore,
}

impl AppState {
    pub fn new(config: FoodDelConfig, store: SqliteStore) -> Self {
        Self { config, store }
    }
}
