// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use super::ignore::IgnoreList;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Served root, ignore list, flags and network binding.
///
/// Built once at startup and never mutated; request handling only ever
/// sees it through a shared reference.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Directory being served. Canonical once the config is loaded.
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    /// Unix socket path; takes precedence over host/port when set
    #[serde(default)]
    pub path: Option<PathBuf>,
    pub workers: Option<usize>,
    #[serde(default)]
    pub ignore: IgnoreList,
    pub silent: bool,
    pub unzipped: bool,
    pub ssl: bool,
    pub clipless: bool,
}

/// Where the server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

/// TLS material, only read when `server.ssl` is set
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TlsConfig {
    /// PEM certificate chain
    #[serde(default)]
    pub cert: Option<PathBuf>,
    /// PEM private key
    #[serde(default)]
    pub key: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for a client to send request headers, 0 disables
    pub header_read_timeout: u64,
    pub max_connections: Option<u64>,
}

impl ServerConfig {
    pub fn binding(&self) -> Result<Binding, String> {
        if let Some(path) = &self.path {
            return Ok(Binding::Unix(path.clone()));
        }
        let ip = if self.host == "localhost" {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|e| format!("Invalid host '{}': {e}", self.host))?
        };
        Ok(Binding::Tcp(SocketAddr::new(ip, self.port)))
    }
}
