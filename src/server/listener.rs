// Listener module
// Binds the TCP listener with port auto-detection, or a Unix socket

use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

use crate::config::Binding;

/// How many ports after the requested one are probed before falling back
/// to an ephemeral port
const PORT_PROBE_LIMIT: u16 = 100;

/// Requested port was taken, `open` is the one actually bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConflict {
    pub old: u16,
    pub open: u16,
}

/// Any accepted byte stream, plain or TLS, TCP or Unix
pub trait Io: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Io for T {}

pub type BoxedIo = Box<dyn Io>;

pub enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(tokio::net::UnixListener, PathBuf),
}

impl Listener {
    /// Accept the next connection along with a printable peer address
    pub async fn accept(&self) -> io::Result<(BoxedIo, String)> {
        match self {
            Self::Tcp(listener) => {
                let (stream, peer) = listener.accept().await?;
                // Small responses should not wait for Nagle
                let _ = stream.set_nodelay(true);
                let stream: BoxedIo = Box::new(stream);
                Ok((stream, peer.ip().to_string()))
            }
            #[cfg(unix)]
            Self::Unix(listener, _) => {
                let (stream, _) = listener.accept().await?;
                let stream: BoxedIo = Box::new(stream);
                Ok((stream, "-".to_string()))
            }
        }
    }

    /// URL a local client would use
    pub fn local_url(&self, tls: bool) -> io::Result<String> {
        let scheme = if tls { "https" } else { "http" };
        match self {
            Self::Tcp(listener) => {
                let addr = listener.local_addr()?;
                let host = match addr.ip() {
                    ip if ip.is_unspecified() || ip.is_loopback() => "localhost".to_string(),
                    std::net::IpAddr::V6(ip) => format!("[{ip}]"),
                    std::net::IpAddr::V4(ip) => ip.to_string(),
                };
                Ok(format!("{scheme}://{host}:{}", addr.port()))
            }
            #[cfg(unix)]
            Self::Unix(_, path) => Ok(format!("{scheme}+unix://{}", path.display())),
        }
    }

    /// Remove the socket file of a Unix listener
    pub fn cleanup(self) {
        #[cfg(unix)]
        if let Self::Unix(listener, path) = self {
            drop(listener);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Bind according to the configured binding.
///
/// Must run inside a tokio runtime.
pub fn bind(binding: &Binding) -> io::Result<(Listener, Option<PortConflict>)> {
    match binding {
        Binding::Tcp(addr) => {
            let (listener, conflict) = bind_available(*addr)?;
            Ok((Listener::Tcp(listener), conflict))
        }
        #[cfg(unix)]
        Binding::Unix(path) => {
            let listener = tokio::net::UnixListener::bind(path)?;
            Ok((Listener::Unix(listener, path.clone()), None))
        }
        #[cfg(not(unix))]
        Binding::Unix(_) => Err(io::Error::new(
            ErrorKind::Unsupported,
            "Unix socket paths are not supported on this platform",
        )),
    }
}

/// Bind `addr`, or the next free port after it if it is in use
pub fn bind_available(addr: SocketAddr) -> io::Result<(TcpListener, Option<PortConflict>)> {
    match create_listener(addr) {
        Ok(listener) => return Ok((listener, None)),
        Err(e) if e.kind() == ErrorKind::AddrInUse && addr.port() != 0 => {}
        Err(e) => return Err(e),
    }

    let candidates = (1..=PORT_PROBE_LIMIT)
        .filter_map(|offset| addr.port().checked_add(offset))
        .chain(std::iter::once(0));

    for port in candidates {
        match create_listener(SocketAddr::new(addr.ip(), port)) {
            Ok(listener) => {
                let open = listener.local_addr()?.port();
                let conflict = PortConflict {
                    old: addr.port(),
                    open,
                };
                return Ok((listener, Some(conflict)));
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => {}
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        ErrorKind::AddrInUse,
        format!("No free port found from {}", addr.port()),
    ))
}

/// Create a `TcpListener` with `SO_REUSEADDR`.
///
/// `SO_REUSEPORT` is deliberately left off: it would let us bind a port
/// another server is already listening on.
pub fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Allows rebinding a port in TIME_WAIT after a restart
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn test_free_port_no_conflict() {
        let (listener, conflict) = bind_available(loopback(0)).unwrap();
        assert!(listener.local_addr().unwrap().port() != 0);
        assert_eq!(conflict, None);
    }

    #[tokio::test]
    async fn test_taken_port_reports_conflict() {
        let taken = create_listener(loopback(0)).unwrap();
        let port = taken.local_addr().unwrap().port();

        let (listener, conflict) = bind_available(loopback(port)).unwrap();
        let open = listener.local_addr().unwrap().port();
        assert_ne!(open, port);
        assert_eq!(conflict, Some(PortConflict { old: port, open }));
    }

    #[tokio::test]
    async fn test_local_url() {
        let (listener, _) = bind(&Binding::Tcp(loopback(0))).unwrap();
        let url = listener.local_url(false).unwrap();
        assert!(url.starts_with("http://localhost:"));
        assert!(listener.local_url(true).unwrap().starts_with("https://"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unix_socket_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serve.sock");
        let (listener, conflict) = bind(&Binding::Unix(path.clone())).unwrap();
        assert!(conflict.is_none());
        assert!(path.exists());
        listener.cleanup();
        assert!(!path.exists());
    }
}
