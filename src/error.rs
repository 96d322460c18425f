//! Error types for ldap-config-wire

use std::io;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// The server URL could not be parsed
    #[error("malformed LDAP URL: {0}")]
    MalformedUrl(String),

    /// Scheme other than `ldap` or `ldaps`
    #[error("invalid LDAP scheme '{0}': expected ldap or ldaps")]
    UnsupportedScheme(String),

    /// CA certificate PEM yielded no usable certificate
    #[error("invalid CA certificate material: {0}")]
    InvalidTlsMaterial(String),

    /// Dial, TLS handshake or StartTLS upgrade failed
    #[error("cannot connect to directory server: {0}")]
    ConnectionFailed(String),

    /// Storage collaborator failed on get/put
    #[error("storage error: {0}")]
    Storage(String),

    /// Stored record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TLS handshake or configuration error below the connector
    #[error("TLS error: {0}")]
    Tls(String),

    /// Unexpected bytes from the server
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Server closed the connection mid-exchange
    #[error("connection closed by server")]
    ConnectionClosed,

    /// Operation not valid in the current connection state
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap any lower-level failure as a connection failure.
    ///
    /// Errors that are already user-facing validation failures pass through
    /// unchanged so callers never have to dig into nested causes.
    pub fn connection_failed(err: Error) -> Self {
        match err {
            Error::ConnectionFailed(_)
            | Error::MalformedUrl(_)
            | Error::UnsupportedScheme(_)
            | Error::InvalidTlsMaterial(_) => err,
            other => Error::ConnectionFailed(other.to_string()),
        }
    }

    /// Whether this error means "the submitted configuration is not usable".
    ///
    /// Validation failures are reported back to the writer; everything else
    /// is an internal fault of the host.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedUrl(_)
                | Error::UnsupportedScheme(_)
                | Error::InvalidTlsMaterial(_)
                | Error::ConnectionFailed(_)
        )
    }

    /// Stable label for metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::MalformedUrl(_) => "malformed_url",
            Error::UnsupportedScheme(_) => "unsupported_scheme",
            Error::InvalidTlsMaterial(_) => "invalid_tls_material",
            Error::ConnectionFailed(_) => "connection_failed",
            Error::Storage(_) => "storage",
            Error::Serialization(_) => "serialization",
            Error::Tls(_) => "tls",
            Error::Protocol(_) => "protocol",
            Error::ConnectionClosed => "connection_closed",
            Error::InvalidState { .. } => "invalid_state",
            Error::Io(_) => "io",
        }
    }
}
