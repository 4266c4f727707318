//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by request handling: MIME lookup,
//! content negotiation, body types and fixed-status responses.

pub mod body;
pub mod encoding;
pub mod gzip;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use encoding::accepts_gzip;
pub use response::{
    build_403_response, build_404_response, build_405_response, build_500_response,
    build_redirect_response,
};
