use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::diagnostics::Diagnostics;
use crate::storage::LocalStorage;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: the connection is a pool handle and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Read-only consistency queries.
    pub diagnostics: Arc<Diagnostics>,
    /// Object storage for uploads and generated files.
    pub storage: Arc<LocalStorage>,
}

impl AppState {
    /// Builds the state around a connection and loaded configuration.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let storage = LocalStorage::new(&config.storage);
        Self {
            diagnostics: Arc::new(Diagnostics::new(db.clone())),
            storage: Arc::new(storage),
            config: Arc::new(config),
            db,
        }
    }
}
