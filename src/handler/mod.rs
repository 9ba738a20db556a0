//! Request handler module
//!
//! Routes requests to the media handler, which resolves the file safely and
//! hands it to conditional and range-aware content delivery.

pub mod content;
pub mod media;
pub mod resolve;
pub mod router;

// Re-export main entry point
pub use media::MediaHandler;
pub use router::handle_request;
