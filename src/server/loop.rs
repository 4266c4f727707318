// Server loop module
// Accepts connections until a shutdown signal arrives

use std::future::Future;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;

use super::connection::accept_connection;
use super::listener::Listener;
use crate::config::AppState;
use crate::logger;

/// Accept loop.
///
/// Returns the listener once `shutdown` resolves so the caller can clean up
/// the socket. Connections already being served keep running on their tasks.
pub async fn run<S>(
    listener: Listener,
    state: Arc<AppState>,
    tls: Option<TlsAcceptor>,
    shutdown: S,
) -> Listener
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer)) => {
                        accept_connection(stream, peer, &state, tls.as_ref());
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    logger::log_shutdown();
    listener
}
