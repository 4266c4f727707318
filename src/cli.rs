//! Command-line interface
//!
//! Every flag is optional so that unset flags fall through to the config
//! file, `SERVE_*` environment variables and built-in defaults.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "serve", author, version, about = "Static file serving and directory listing")]
pub struct Cli {
    /// Directory to serve (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Port to listen on; the next free port is used if it is taken
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Listen on a Unix socket instead of a TCP port
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Extra files and directories to ignore, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Don't log anything to the console
    #[arg(short, long)]
    pub silent: bool,

    /// Disable gzip compression
    #[arg(short, long)]
    pub unzipped: bool,

    /// Serve over HTTPS
    #[arg(long)]
    pub ssl: bool,

    /// Don't copy the local address to the clipboard
    #[arg(short, long)]
    pub clipless: bool,

    /// PEM certificate for --ssl (self-signed if omitted)
    #[arg(long, requires = "key")]
    pub cert: Option<PathBuf>,

    /// PEM private key for --ssl
    #[arg(long, requires = "cert")]
    pub key: Option<PathBuf>,

    /// Number of runtime worker threads
    #[arg(long)]
    pub workers: Option<usize>,

    /// Config file (extension optional)
    #[arg(long, default_value = "serve")]
    pub config: String,
}
