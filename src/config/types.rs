// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Media serving configuration, the only input the media handler needs
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Root directory all served files must live beneath
    pub dir: PathBuf,
    /// URL mount point, e.g. `/media/`
    pub prefix: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, console if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration (all timeouts in seconds, 0 disables)
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub header_read_timeout: u64,
    pub request_timeout: u64,
    pub shutdown_timeout: u64,
    pub max_connections: Option<u64>,
}

impl PerformanceConfig {
    pub const fn request_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.request_timeout)
    }

    pub const fn header_read_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.header_read_timeout)
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

const fn non_zero_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
