//! High-level connection establishment
//!
//! * Server URL resolution (scheme, host, port)
//! * Transport strategy selection and dialing

mod connector;
mod server_url;

pub use connector::{
    Connector, ConnectorBuilder, ConnectorOptions, TransportStrategy, DEFAULT_CONNECT_TIMEOUT,
};
pub use server_url::{LdapScheme, ServerUrl, LDAPS_DEFAULT_PORT, LDAP_DEFAULT_PORT};
