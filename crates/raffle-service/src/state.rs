//! Application state.

use std::sync::Arc;

use raffle_store::{MemoryStore, PgStore, Store, StoreError};

use crate::auth::SessionKeys;
use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The privileged store handle; the only path to the entries table.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Admin session signing keys.
    pub sessions: SessionKeys,
}

impl AppState {
    /// Create a new application state around an existing store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        if config.admin_pin.is_none() {
            tracing::warn!("ADMIN_PIN not configured - admin actions are disabled");
        }

        let sessions = SessionKeys::new(&config.session_secret, config.session_ttl_seconds);

        Self {
            store,
            config,
            sessions,
        }
    }

    /// Open the store named by the configuration and build the state.
    ///
    /// Uses PostgreSQL when `database_url` is set, otherwise an in-memory
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or migrated.
    pub async fn connect(config: ServiceConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                tracing::info!(
                    max_connections = config.database_max_connections,
                    "Connecting to PostgreSQL store"
                );
                Arc::new(PgStore::connect(url, config.database_max_connections).await?)
            }
            None => {
                tracing::warn!("DATABASE_URL not configured - entries are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::new(store, config))
    }

    /// Check if admin actions can succeed.
    #[must_use]
    pub fn has_admin_pin(&self) -> bool {
        self.config.admin_pin.is_some()
    }
}
