//! LDAP messages used to establish and tear down a connection
//!
//! BER encoding and framing come from `ldap3_proto`'s [`LdapCodec`]. This
//! module only builds the two requests the connector sends, StartTLS and
//! Unbind, and summarizes the server's answer.

mod message;

pub use ldap3_proto::proto::{LdapMsg, LdapOp};
pub use ldap3_proto::{LdapCodec, LdapResultCode};
pub use message::{
    describe_result, start_tls_request, unbind_request, START_TLS_OID, UNSOLICITED_MESSAGE_ID,
};
