// Connection handling module
// Serves a single accepted connection, optionally behind TLS

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::sync::Arc;
use std::time::Duration;
use tokio_rustls::TlsAcceptor;

use super::listener::BoxedIo;
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Releases the connection slot when the connection task ends
struct ConnectionSlot(Arc<AppState>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.release_connection();
    }
}

/// Accept a connection, checking the connection limit.
///
/// The connection is served on its own task; this returns immediately.
pub fn accept_connection(
    stream: BoxedIo,
    peer: String,
    state: &Arc<AppState>,
    tls: Option<&TlsAcceptor>,
) {
    if !state.try_acquire_connection() {
        if let Some(max) = state.config.performance.max_connections {
            logger::log_warning(&format!(
                "Max connections reached: {max}. Connection from {peer} rejected."
            ));
        }
        drop(stream);
        return;
    }

    let slot = ConnectionSlot(Arc::clone(state));
    let tls = tls.cloned();
    tokio::spawn(async move {
        let stream = match tls {
            Some(acceptor) => match acceptor.accept(stream).await {
                Ok(tls_stream) => Box::new(tls_stream) as BoxedIo,
                Err(e) => {
                    logger::log_tls_handshake_failed(&peer, &e);
                    return;
                }
            },
            None => stream,
        };
        serve_connection(stream, Arc::from(peer), Arc::clone(&slot.0)).await;
        drop(slot);
    });
}

async fn serve_connection(stream: BoxedIo, peer: Arc<str>, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let performance = &state.config.performance;

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(performance.keep_alive)
        .timer(TokioTimer::new());
    if performance.header_read_timeout > 0 {
        builder.header_read_timeout(Duration::from_secs(performance.header_read_timeout));
    }

    let service_state = Arc::clone(&state);
    let service = service_fn(move |req| {
        handler::handle_request(req, Arc::clone(&service_state), Arc::clone(&peer))
    });

    if let Err(err) = builder.serve_connection(io, service).await {
        // Clients hanging up mid-response is routine
        if !err.is_incomplete_message() && !err.is_canceled() {
            logger::log_connection_error(&err);
        }
    }
}
