//! Application state for the roster engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::store::Store;

/// Shared application state.
///
/// Contains the in-memory store and the loaded engine configuration,
/// shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    store: Store,
    config: Arc<EngineConfig>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(store: Store, config: EngineConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
