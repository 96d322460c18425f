//! ldap-config-wire: validated LDAP server configuration and connection establishment
//!
//! A configuration record names a directory server (`ldap://` or `ldaps://`),
//! its TLS trust policy and a few schema hints. Writes are only persisted after
//! a real dial against the candidate succeeds; reads hand the stored record back.
//!
//! * `ldap://` connects in plaintext, optionally upgraded in-band with StartTLS
//! * `ldaps://` performs the TLS handshake immediately
//! * Trust comes from a pinned CA PEM, the platform store, or (insecurely) nothing
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> ldap_config_wire::Result<()> {
//! use ldap_config_wire::{ConfigBackend, ConfigPatch, MemoryStorage, WriteResponse};
//!
//! let backend = ConfigBackend::new(MemoryStorage::new());
//! let patch = ConfigPatch::new()
//!     .url("ldap://ldap.example.org")
//!     .start_tls(true)
//!     .user_attr("uid");
//!
//! if let WriteResponse::Rejected { message } = backend.write(patch).await? {
//!     eprintln!("configuration rejected: {}", message);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod protocol;

pub use client::{Connector, ConnectorBuilder, LdapScheme, ServerUrl, TransportStrategy};
pub use config::{ConfigBackend, ConfigEntry, ConfigPatch, ConfigStore, MemoryStorage, Storage, WriteResponse};
pub use connection::{Dialer, LdapConnection, TcpDialer, TlsConfig};
pub use error::{Error, Result};
