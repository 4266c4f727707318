//! Request handler module
//!
//! Resolution of request paths against the served root, and the responses
//! built from the outcome.

pub mod listing;
pub mod resolver;
pub mod responder;
pub mod router;

// Re-export main entry points
pub use resolver::{resolve, ListingEntry, Resolution, INDEX_FILE};
pub use responder::{respond, RequestMeta};
pub use router::handle_request;
