//! Transport stream establishment.
//!
//! The engine is handed a bidirectional byte stream; this module builds
//! one from a [`Config`]: plain TCP, or TLS with optional extra CA roots
//! and a client certificate loaded from PEM files.

use std::fs::File;
use std::io::{self, BufReader};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::{Config, Error, Result};

/// A stream that is either plaintext TCP or TLS.
pub enum ImapStream {
    /// Plaintext TCP stream.
    Plain(TcpStream),
    /// TLS stream (boxed to keep the enum small).
    Tls(Box<TlsStream<TcpStream>>),
}

impl ImapStream {
    /// Returns true if the stream is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

impl AsyncRead for ImapStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ImapStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Connects to the configured endpoint.
pub async fn connect(config: &Config) -> Result<ImapStream> {
    let addr = format!("{}:{}", config.host, config.port);
    let tcp = TcpStream::connect(&addr).await?;

    if !config.tls {
        return Ok(ImapStream::Plain(tcp));
    }

    let connector = tls_connector(config)?;
    let server_name = ServerName::try_from(config.host.clone())?;
    let tls = connector.connect(server_name, tcp).await?;
    Ok(ImapStream::Tls(Box::new(tls)))
}

/// Builds a TLS connector from the configured trust material.
fn tls_connector(config: &Config) -> Result<TlsConnector> {
    let mut roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    if let Some(path) = &config.ca_cert_path {
        for cert in load_certs(path)? {
            roots.add(cert).map_err(Error::Tls)?;
        }
    }

    let builder = rustls::ClientConfig::builder().with_root_certificates(roots);

    let tls_config = match (&config.cert_path, &config.key_path) {
        (Some(cert_path), Some(key_path)) => {
            let certs = load_certs(cert_path)?;
            let key = load_key(key_path)?;
            builder.with_client_auth_cert(certs, key)?
        }
        _ => builder.with_no_client_auth(),
    };

    Ok(TlsConnector::from(Arc::new(tls_config)))
}

/// Loads a PEM certificate chain.
fn load_certs(path: &std::path::Path) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = BufReader::new(File::open(path)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<io::Result<Vec<_>>>()?;
    if certs.is_empty() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no certificates in {}", path.display()),
        )));
    }
    Ok(certs)
}

/// Loads a PEM private key.
fn load_key(path: &std::path::Path) -> Result<PrivateKeyDer<'static>> {
    let mut reader = BufReader::new(File::open(path)?);
    rustls_pemfile::private_key(&mut reader)?.ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no private key in {}", path.display()),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_connector_builds() {
        let config = Config::builder("imap.example.com").tls(true).build();
        assert!(tls_connector(&config).is_ok());
    }

    #[test]
    fn test_missing_ca_file_is_reported() {
        let config = Config::builder("imap.example.com")
            .tls(true)
            .ca_cert_path("/nonexistent/ca.pem")
            .build();
        assert!(matches!(tls_connector(&config), Err(Error::Io(_))));
    }
}
