//! Server state management
//!
//! Shared state handed to every handler: configuration, the goal store, and
//! the decomposer wrapping the configured backend.

use crate::config::Config;
use crate::decomposition::GoalDecomposer;
use crate::persistence::GoalStore;

/// Shared application state for the server
pub struct AppState {
    /// Application configuration
    pub config: Config,

    /// Goal persistence (SQLite)
    pub store: GoalStore,

    /// Goal breakdown service
    pub decomposer: GoalDecomposer,
}

impl AppState {
    pub fn new(config: Config, store: GoalStore, decomposer: GoalDecomposer) -> Self {
        Self {
            config,
            store,
            decomposer,
        }
    }

    /// Whether issued session cookies carry `Secure; SameSite=None`
    pub fn secure_cookies(&self) -> bool {
        self.config.server.secure_cookies
    }
}
