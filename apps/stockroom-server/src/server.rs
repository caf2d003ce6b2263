use std::sync::Arc;

use crate::backend::StoreBackend;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::objects::ObjectStore;
use crate::session::{Session, SessionStore};
use stockroom_storage::Role;
use stockroom_store_memory::MemoryStore;
use stockroom_store_sqlite::SqliteStore;

#[derive(Clone)]
pub struct AppServer {
    pub store: StoreBackend,
    pub sessions: Arc<SessionStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub config: ServerConfig,
}

impl AppServer {
    pub fn new_sqlite(
        store: Arc<SqliteStore>,
        objects: Arc<dyn ObjectStore>,
        config: ServerConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.session_ttl_hours)),
            store: StoreBackend::Sqlite(store),
            objects,
            config,
        }
    }

    pub fn new_memory(
        store: Arc<MemoryStore>,
        objects: Arc<dyn ObjectStore>,
        config: ServerConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.session_ttl_hours)),
            store: StoreBackend::Memory(store),
            objects,
            config,
        }
    }

    /// Gate: there must be a session principal. Runs before any store
    /// mutation; a failed gate prevents all side effects.
    pub fn require_authenticated<'a>(
        &self,
        session: Option<&'a Session>,
    ) -> Result<&'a Session, ApiError> {
        session.ok_or(ApiError::Unauthorized)
    }

    /// Gate: the session's role must include `required`. Admin passes every
    /// worker gate (`Role::includes` owns the hierarchy).
    pub fn require_role(&self, session: &Session, required: Role) -> Result<(), ApiError> {
        if session.role.includes(&required) {
            Ok(())
        } else {
            Err(match required {
                Role::Admin => ApiError::Forbidden("Admins only"),
                Role::Worker => ApiError::Forbidden("Workers only"),
            })
        }
    }
}
