// Configuration module entry point
// Layers defaults, config file, environment and command line into one immutable config

mod ignore;
mod state;
mod types;

use std::path::PathBuf;

use crate::cli::Cli;

// Re-export public types
pub use ignore::{IgnoreList, IgnorePattern, DEFAULT_IGNORES};
pub use state::AppState;
pub use types::{Binding, Config, LoggingConfig, PerformanceConfig, ServerConfig, TlsConfig};

impl Config {
    /// Load configuration.
    ///
    /// Precedence, lowest first: built-in defaults, config file
    /// (`serve.toml` unless `--config` says otherwise, optional),
    /// `SERVE_*` environment variables, command-line flags.
    pub fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.root", ".")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.ignore", Vec::<String>::new())?
            .set_default("server.silent", false)?
            .set_default("server.unzipped", false)?
            .set_default("server.ssl", false)?
            .set_default("server.clipless", false)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?;

        if !cli.config.is_empty() {
            builder = builder.add_source(config::File::with_name(&cli.config).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SERVE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.ignore"),
        );

        let mut cfg: Self = apply_cli(builder, cli)?.build()?.try_deserialize()?;
        cfg.finalize()?;
        Ok(cfg)
    }

    /// Validate the root and derive the values request handling relies on
    fn finalize(&mut self) -> Result<(), config::ConfigError> {
        let root = canonical_root(&self.server.root)?;
        self.server.root = root;
        self.server.ignore = std::mem::take(&mut self.server.ignore).with_defaults();
        self.server.binding().map_err(config::ConfigError::Message)?;

        if self.tls.cert.is_some() != self.tls.key.is_some() {
            return Err(config::ConfigError::Message(
                "tls.cert and tls.key must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command-line flags override everything else
fn apply_cli(
    mut builder: config::ConfigBuilder<config::builder::DefaultState>,
    cli: &Cli,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    if let Some(dir) = &cli.directory {
        builder = builder.set_override("server.root", dir.to_string_lossy().into_owned())?;
    }
    if let Some(port) = cli.port {
        builder = builder.set_override("server.port", i64::from(port))?;
    }
    if let Some(host) = &cli.host {
        builder = builder.set_override("server.host", host.as_str())?;
    }
    if let Some(path) = &cli.path {
        builder = builder.set_override("server.path", path.to_string_lossy().into_owned())?;
    }
    if let Some(workers) = cli.workers {
        builder = builder.set_override(
            "server.workers",
            i64::try_from(workers).unwrap_or(i64::MAX),
        )?;
    }
    if !cli.ignore.is_empty() {
        builder = builder.set_override("server.ignore", cli.ignore.clone())?;
    }

    // Boolean flags can only switch features on
    for (key, set) in [
        ("server.silent", cli.silent),
        ("server.unzipped", cli.unzipped),
        ("server.ssl", cli.ssl),
        ("server.clipless", cli.clipless),
    ] {
        if set {
            builder = builder.set_override(key, true)?;
        }
    }

    if let Some(cert) = &cli.cert {
        builder = builder.set_override("tls.cert", cert.to_string_lossy().into_owned())?;
    }
    if let Some(key) = &cli.key {
        builder = builder.set_override("tls.key", key.to_string_lossy().into_owned())?;
    }
    Ok(builder)
}

fn canonical_root(root: &std::path::Path) -> Result<PathBuf, config::ConfigError> {
    let canonical = root.canonicalize().map_err(|e| {
        config::ConfigError::Message(format!("Cannot serve '{}': {e}", root.display()))
    })?;
    if !canonical.is_dir() {
        return Err(config::ConfigError::Message(format!(
            "Cannot serve '{}': not a directory",
            root.display()
        )));
    }
    Ok(canonical)
}

impl ServerConfig {
    /// Server config for `root` with default ignores, flags off and port 5000
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
        Ok(Self {
            root: canonical_root(&root.into())?,
            host: "0.0.0.0".to_string(),
            port: 5000,
            path: None,
            workers: None,
            ignore: IgnoreList::default().with_defaults(),
            silent: false,
            unzipped: false,
            ssl: false,
            clipless: false,
        })
    }
}
