//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the post store behind an async mutex, so every read-modify-write
//! cycle from this process runs to completion before the next one starts,
//! plus the session registry and the loaded configuration.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::services::session::SessionRegistry;
use crate::store::PostStore;

/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<PostStore>>,
    pub sessions: SessionRegistry,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(store: PostStore, config: Config) -> Self {
        Self { store: Arc::new(Mutex::new(store)), sessions: SessionRegistry::new(config.session_idle), config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
