//! Logger module
//!
//! Installs the global `tracing` subscriber and provides the server
//! lifecycle and access log helpers:
//! - Diagnostic events go to stderr through an `EnvFilter`
//! - Access lines use the `access` target and can be routed to a file

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::fs::{File, OpenOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::filter::{filter_fn, EnvFilter, ParseError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, Layer};

/// Target used for access log events
pub const ACCESS_TARGET: &str = "access";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("cannot open access log {path}: {source}")]
    AccessLog {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("logger already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` wins over the
/// configured level when set.
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let mut filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let access_file = config
        .access_log_file
        .as_deref()
        .map(open_access_log)
        .transpose()?;
    if access_file.is_some() {
        filter = filter.add_directive(format!("{ACCESS_TARGET}=off").parse()?);
    }

    let access_layer = access_file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_level(false)
            .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .with(access_layer)
        .try_init()?;
    Ok(())
}

fn open_access_log(path: &str) -> Result<File, LoggerError> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| LoggerError::AccessLog {
                path: path.to_string(),
                source,
            })?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::AccessLog {
            path: path.to_string(),
            source,
        })
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, media_root: &Path) {
    tracing::info!("======================================");
    tracing::info!("Media server started successfully");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Serving {} at {}", media_root.display(), config.media.prefix);
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(timeout) = config.performance.request_timeout() {
        tracing::info!("Request timeout: {}s", timeout.as_secs());
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    tracing::info!("======================================");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_access_log_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/access.log");
        let file = open_access_log(path.to_str().unwrap());
        assert!(file.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_open_access_log_appends() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let path = path.to_str().unwrap();

        writeln!(open_access_log(path).unwrap(), "first").unwrap();
        writeln!(open_access_log(path).unwrap(), "second").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }
}
