//! Core connection type

use super::state::ConnectionState;
use super::tls::TlsConfig;
use super::transport::Transport;
use crate::protocol::{
    describe_result, start_tls_request, unbind_request, LdapCodec, LdapMsg, LdapOp,
    LdapResultCode, UNSOLICITED_MESSAGE_ID,
};
use crate::{Error, Result};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Framed;

/// Open connection to a directory server.
///
/// Produced by [`Connector`](crate::client::Connector). The caller owns it and
/// must [`close`](LdapConnection::close) it when done; every dial is a fresh
/// connection.
pub struct LdapConnection<S> {
    framed: Option<Framed<Transport<S>, LdapCodec>>,
    state: ConnectionState,
    next_message_id: i32,
}

impl<S> std::fmt::Debug for LdapConnection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConnection")
            .field("transport", &self.framed.as_ref().map(Framed::get_ref))
            .field("state", &self.state)
            .finish()
    }
}

impl<S> LdapConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create connection from transport
    pub fn new(transport: Transport<S>) -> Self {
        Self {
            framed: Some(Framed::new(transport, LdapCodec)),
            state: ConnectionState::Initial,
            next_message_id: 1,
        }
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the connection is encrypted
    pub fn is_tls(&self) -> bool {
        self.framed
            .as_ref()
            .is_some_and(|framed| framed.get_ref().is_tls())
    }

    /// Hand the connection to the caller
    pub(crate) fn mark_open(&mut self) -> Result<()> {
        self.state.transition(ConnectionState::Open)
    }

    /// Upgrade the plain connection in-band via the StartTLS extended operation.
    ///
    /// Sends the ExtendedRequest, waits for the ExtendedResponse and performs the
    /// TLS handshake if the server accepted. There is no fallback to plaintext:
    /// any refusal is an error.
    pub async fn start_tls(&mut self, tls_config: &TlsConfig) -> Result<()> {
        if self.is_tls() {
            return Err(Error::Tls("transport is already TLS-encrypted".into()));
        }
        self.state.transition(ConnectionState::NegotiatingTls)?;

        let message_id = self.next_message_id();
        self.send_message(start_tls_request(message_id)).await?;

        let msg = self.receive_message().await?;
        if msg.msgid == UNSOLICITED_MESSAGE_ID {
            return Err(Error::Protocol(format!(
                "server sent notice of disconnection: {:?}",
                msg.op
            )));
        }
        if msg.msgid != message_id {
            return Err(Error::Protocol(format!(
                "StartTLS response for message {} (expected {})",
                msg.msgid, message_id
            )));
        }
        let response = match msg.op {
            LdapOp::ExtendedResponse(response) => response,
            other => {
                return Err(Error::Protocol(format!(
                    "expected ExtendedResponse to StartTLS, got {:?}",
                    other
                )))
            }
        };
        if response.res.code != LdapResultCode::Success {
            tracing::debug!(result_code = ?response.res.code, "server refused StartTLS");
            return Err(Error::Tls(format!(
                "server refused StartTLS: {}",
                describe_result(&response)
            )));
        }

        let parts = self.framed.take().ok_or(Error::ConnectionClosed)?.into_parts();
        if !parts.read_buf.is_empty() {
            // Plaintext after the response would be spliced into the TLS session
            return Err(Error::Protocol(
                "unexpected data after StartTLS response".into(),
            ));
        }

        tracing::debug!("server accepted StartTLS, upgrading connection");
        let transport = parts.io.upgrade_to_tls(tls_config).await?;
        self.framed = Some(Framed::new(transport, LdapCodec));
        tracing::info!("TLS connection established via StartTLS");

        self.state.transition(ConnectionState::Open)
    }

    /// Close the connection.
    ///
    /// Sends an UnbindRequest (best effort) and shuts the stream down.
    pub async fn close(mut self) -> Result<()> {
        self.state.transition(ConnectionState::Closed)?;
        let message_id = self.next_message_id();
        if let Err(e) = self.send_message(unbind_request(message_id)).await {
            tracing::debug!(error = %e, "failed to send UnbindRequest");
        }
        let framed = self.framed.as_mut().ok_or(Error::ConnectionClosed)?;
        framed.get_mut().shutdown().await?;
        Ok(())
    }

    /// Tear down a connection that failed during establishment.
    pub(crate) async fn abort(mut self) {
        self.state = ConnectionState::Closed;
        if let Some(framed) = self.framed.as_mut() {
            if let Err(e) = framed.get_mut().shutdown().await {
                tracing::debug!(error = %e, "error shutting down aborted connection");
            }
        }
    }

    fn next_message_id(&mut self) -> i32 {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.checked_add(1).unwrap_or(1);
        id
    }

    /// Send a request message
    async fn send_message(&mut self, msg: LdapMsg) -> Result<()> {
        let framed = self.framed.as_mut().ok_or(Error::ConnectionClosed)?;
        framed
            .send(msg)
            .await
            .map_err(|e| Error::Protocol(e.to_string()))
    }

    /// Receive the next complete message
    async fn receive_message(&mut self) -> Result<LdapMsg> {
        let framed = self.framed.as_mut().ok_or(Error::ConnectionClosed)?;
        match framed.next().await {
            Some(Ok(msg)) => Ok(msg),
            Some(Err(e)) => Err(Error::Protocol(e.to_string())),
            None => Err(Error::ConnectionClosed),
        }
    }
}
