//! Request builders

use ldap3_proto::proto::{LdapExtendedRequest, LdapExtendedResponse, LdapMsg, LdapOp};

/// StartTLS extended operation OID (RFC 4511 §4.14.1)
pub const START_TLS_OID: &str = "1.3.6.1.4.1.1466.20037";

/// Message ID of unsolicited notifications such as a notice of disconnection
pub const UNSOLICITED_MESSAGE_ID: i32 = 0;

/// StartTLS ExtendedRequest
pub fn start_tls_request(msgid: i32) -> LdapMsg {
    LdapMsg {
        msgid,
        op: LdapOp::ExtendedRequest(LdapExtendedRequest {
            name: START_TLS_OID.to_string(),
            value: None,
        }),
        ctrl: vec![],
    }
}

/// UnbindRequest
pub fn unbind_request(msgid: i32) -> LdapMsg {
    LdapMsg {
        msgid,
        op: LdapOp::UnbindRequest,
        ctrl: vec![],
    }
}

/// Result code of an ExtendedResponse, followed by the server's diagnostic
/// message when there is one
pub fn describe_result(response: &LdapExtendedResponse) -> String {
    if response.res.message.is_empty() {
        format!("{:?}", response.res.code)
    } else {
        format!("{:?}: {}", response.res.code, response.res.message)
    }
}
