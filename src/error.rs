//! Error types
//!
//! `ServeError` covers everything that can go wrong while answering a single
//! request and is always translated into a status code. `StartupError` covers
//! the fatal class: the process exits when one is returned.

use hyper::StatusCode;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Per-request failure
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Missing, unreadable, or permission denied
    #[error("cannot open {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Resolved outside the media root
    #[error("path escapes media root: {0}")]
    Traversal(String),

    /// Resolved to a directory
    #[error("{0} is a directory")]
    IsDirectory(PathBuf),

    /// Undecodable or otherwise unusable request path
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// The handler did not produce a response in time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Anything else (metadata or seek failures on an open file)
    #[error("internal error: {0}")]
    Internal(#[from] std::io::Error),
}

impl ServeError {
    /// Status code sent to the client
    ///
    /// Missing, forbidden, directory, and traversal all collapse to 404 so a
    /// client cannot probe what exists outside the media tree.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. }
            | Self::Traversal(_)
            | Self::IsDirectory(_)
            | Self::InvalidPath(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fatal process startup failure
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("error getting absolute path for media directory {path}: {source}")]
    MediaDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid listen address: {0}")]
    Address(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    Logger(#[from] crate::logger::LoggerError),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
