//! Transport abstraction (plain stream vs TLS-wrapped stream)

use super::tls::TlsConfig;
use crate::{Error, Result};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

/// Transport layer over a dialed stream
#[allow(clippy::large_enum_variant)]
pub enum Transport<S> {
    /// Plain connection
    Plain(S),
    /// TLS-encrypted connection (implicit TLS or after StartTLS)
    Tls(TlsStream<S>),
}

impl<S> std::fmt::Debug for Transport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Plain(_) => f.write_str("Transport::Plain"),
            Transport::Tls(_) => f.write_str("Transport::Tls"),
        }
    }
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a freshly dialed stream in TLS from the first byte (implicit TLS)
    pub async fn connect_tls(stream: S, tls_config: &TlsConfig) -> Result<Self> {
        let tls_stream = handshake(stream, tls_config).await?;
        Ok(Transport::Tls(tls_stream))
    }

    /// Whether the transport is encrypted
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }

    /// Upgrade a plain transport to TLS after a successful StartTLS exchange.
    ///
    /// Consumes `self`; on failure the underlying stream is dropped (closed).
    pub async fn upgrade_to_tls(self, tls_config: &TlsConfig) -> Result<Self> {
        match self {
            Transport::Plain(stream) => {
                let tls_stream = handshake(stream, tls_config).await?;
                Ok(Transport::Tls(tls_stream))
            }
            Transport::Tls(_) => Err(Error::Tls("transport is already TLS-encrypted".into())),
        }
    }
}

impl<S> AsyncRead for Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Transport::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl<S> AsyncWrite for Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Transport::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Transport::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Transport::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

async fn handshake<S>(stream: S, tls_config: &TlsConfig) -> Result<TlsStream<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let connector = TlsConnector::from(tls_config.client_config());
    connector
        .connect(tls_config.server_name().clone(), stream)
        .await
        .map_err(|e| Error::Tls(format!("TLS handshake failed: {}", e)))
}
