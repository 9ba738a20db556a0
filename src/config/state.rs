// Application state module
// Immutable per-process state shared by every connection

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::types::{Config, LoggingConfig, MediaConfig, PerformanceConfig};
use crate::handler::MediaHandler;

/// Application state
pub struct AppState {
    pub media: MediaHandler,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,

    // Live connection count, checked against max_connections
    active_connections: AtomicUsize,
}

impl AppState {
    /// Build state from the loaded config and the absolute media root
    pub fn new(config: &Config, media_root: PathBuf) -> Self {
        let media = MediaHandler::new(&MediaConfig {
            dir: media_root,
            prefix: config.media.prefix.clone(),
        });

        Self {
            media,
            logging: config.logging.clone(),
            performance: config.performance.clone(),
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Access log format, or `None` when access logging is off
    pub fn access_log_format(&self) -> Option<&str> {
        self.logging
            .access_log
            .then_some(self.logging.access_log_format.as_str())
    }

    pub const fn request_timeout(&self) -> Option<Duration> {
        self.performance.request_timeout()
    }

    /// Reserve a connection slot, failing when the limit is reached
    pub fn try_acquire_connection(&self) -> bool {
        let Some(limit) = self.performance.max_connections else {
            self.active_connections.fetch_add(1, Ordering::Relaxed);
            return true;
        };
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        self.active_connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .is_ok()
    }

    pub fn release_connection(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }
}
