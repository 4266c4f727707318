// Server module entry point
// Binding, TLS, connection handling and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;
pub mod tls;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;

pub use listener::{bind, BoxedIo, Io, Listener, PortConflict};

use crate::clipboard;
use crate::config::{AppState, Config};
use crate::error::StartupError;
use crate::logger;

/// Bind, announce and serve until a shutdown signal arrives
pub async fn run(config: Config) -> Result<(), StartupError> {
    let binding = config
        .server
        .binding()
        .map_err(config::ConfigError::Message)?;
    let (listener, conflict) = listener::bind(&binding)?;

    let acceptor = if config.server.ssl {
        Some(tls::build_acceptor(&config.tls)?)
    } else {
        None
    };

    let local_url = listener.local_url(acceptor.is_some())?;
    logger::log_server_start(&local_url, &config.server.root, conflict.as_ref(), &config);

    if !config.server.clipless {
        tokio::spawn(async move {
            match clipboard::copy(&local_url).await {
                Ok(()) => logger::log_info("Copied local address to clipboard!"),
                Err(e) => logger::log_warning(&format!("Cannot copy to clipboard: {e}")),
            }
        });
    }

    let state = Arc::new(AppState::new(config));
    let listener =
        server_loop::run(listener, state, acceptor, signal::shutdown_signal()).await;
    listener.cleanup();
    Ok(())
}
