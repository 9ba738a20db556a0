//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality (validators, dates, ranges,
//! MIME lookup, bodies, status responses), decoupled from the media handler.

pub mod body;
pub mod cache;
pub mod conditional;
pub mod date;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use range::parse_range_header;
pub use response::{
    build_301_response, build_304_response, build_404_response, build_405_response,
    build_412_response, build_416_response, build_500_response, build_503_response,
};
