// Application state module
// Immutable configuration plus the server-wide connection counter

use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;

/// Application state shared by every connection task
pub struct AppState {
    pub config: Config,
    /// Connections currently being served, checked against `max_connections`
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Whether access lines should be written
    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log && !self.config.server.silent
    }

    /// Reserve a connection slot, `false` if the limit is reached
    pub fn try_acquire_connection(&self) -> bool {
        // Increment first, then check limit
        let prev = self.active_connections.fetch_add(1, Ordering::SeqCst);
        if let Some(max) = self.config.performance.max_connections {
            if prev >= usize::try_from(max).unwrap_or(usize::MAX) {
                self.active_connections.fetch_sub(1, Ordering::SeqCst);
                return false;
            }
        }
        true
    }

    pub fn release_connection(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }
}
