// TLS module
// Builds the rustls acceptor from PEM files or a freshly generated self-signed pair

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;

use crate::config::TlsConfig;
use crate::error::StartupError;

/// Names the self-signed certificate is valid for
const SELF_SIGNED_NAMES: &[&str] = &["localhost", "127.0.0.1", "::1"];

type CertifiedPair = (Vec<CertificateDer<'static>>, PrivateKeyDer<'static>);

/// Create the TLS acceptor for `--ssl`.
///
/// Uses `tls.cert`/`tls.key` when both are configured, otherwise a
/// self-signed certificate generated for this process only.
pub fn build_acceptor(tls: &TlsConfig) -> Result<TlsAcceptor, StartupError> {
    let (certs, key) = match (&tls.cert, &tls.key) {
        (Some(cert), Some(key)) => (load_certs(cert)?, load_key(key)?),
        _ => self_signed()?,
    };

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, StartupError> {
    let mut reader = BufReader::new(File::open(path)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        return Err(StartupError::InvalidPem(format!(
            "no certificate found in '{}'",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, StartupError> {
    let mut reader = BufReader::new(File::open(path)?);
    rustls_pemfile::private_key(&mut reader)?.ok_or_else(|| {
        StartupError::InvalidPem(format!("no private key found in '{}'", path.display()))
    })
}

fn self_signed() -> Result<CertifiedPair, StartupError> {
    let names: Vec<String> = SELF_SIGNED_NAMES.iter().map(ToString::to_string).collect();
    let rcgen::CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(names)?;
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
    Ok((vec![cert.der().clone()], key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_signed_acceptor() {
        assert!(build_acceptor(&TlsConfig::default()).is_ok());
    }

    #[test]
    fn test_pem_files() {
        let dir = tempfile::tempdir().unwrap();
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");
        std::fs::write(&cert_path, cert.pem()).unwrap();
        std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();

        let tls = TlsConfig {
            cert: Some(cert_path),
            key: Some(key_path),
        };
        assert!(build_acceptor(&tls).is_ok());
    }

    #[test]
    fn test_empty_pem_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.pem");
        std::fs::write(&empty, "").unwrap();
        let tls = TlsConfig {
            cert: Some(empty.clone()),
            key: Some(empty),
        };
        assert!(matches!(build_acceptor(&tls), Err(StartupError::InvalidPem(_))));
    }

    #[test]
    fn test_missing_file() {
        let tls = TlsConfig {
            cert: Some("/nonexistent/cert.pem".into()),
            key: Some("/nonexistent/key.pem".into()),
        };
        assert!(matches!(build_acceptor(&tls), Err(StartupError::Io(_))));
    }
}
