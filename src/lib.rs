//! HTTP media file server
//!
//! Maps `GET <prefix>/<path>` onto files beneath a media directory and serves
//! them with conditional request and byte-range support.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
