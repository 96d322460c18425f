//! Connection management
//!
//! This module handles:
//! * Dialing raw streams (TCP, or injected test streams)
//! * Transport abstraction (plain vs TLS)
//! * StartTLS negotiation and connection teardown
//! * State machine enforcement
//! * TLS trust configuration

mod conn;
mod dialer;
mod state;
mod tls;
mod transport;

pub use conn::LdapConnection;
pub use dialer::{Dialer, TcpDialer};
pub use state::ConnectionState;
pub use tls::{parse_server_name, TlsConfig, TlsConfigBuilder, TrustRoots};
pub use transport::Transport;
