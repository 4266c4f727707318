//! Static file server for a local directory.
//!
//! Request paths are resolved against the served root into a file, a
//! directory listing, a 404 or a 403, and answered over HTTP/1.1 with
//! optional gzip compression.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
