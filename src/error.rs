// Startup errors
//
// Request handling never fails (every problem becomes a status code), so
// the only fallible path is getting the server up.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum StartupError {
    /// Invalid configuration or unusable root directory
    Config(config::ConfigError),
    /// Binding the listener or reading TLS files
    Io(io::Error),
    /// Certificate or key rejected by rustls
    Tls(rustls::Error),
    /// Self-signed certificate generation failed
    Certificate(rcgen::Error),
    /// PEM file without a usable certificate or key
    InvalidPem(String),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "Configuration error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Tls(err) => write!(f, "TLS error: {err}"),
            Self::Certificate(err) => write!(f, "Certificate generation failed: {err}"),
            Self::InvalidPem(msg) => write!(f, "Invalid PEM file: {msg}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Tls(err) => Some(err),
            Self::Certificate(err) => Some(err),
            Self::InvalidPem(_) => None,
        }
    }
}

impl From<config::ConfigError> for StartupError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<io::Error> for StartupError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<rustls::Error> for StartupError {
    fn from(err: rustls::Error) -> Self {
        Self::Tls(err)
    }
}

impl From<rcgen::Error> for StartupError {
    fn from(err: rcgen::Error) -> Self {
        Self::Certificate(err)
    }
}
