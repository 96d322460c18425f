//! Configuration record

use crate::client::ServerUrl;
use crate::connection::TlsConfig;
use crate::Result;
use serde::{Deserialize, Serialize};

/// URL used when none has been written
pub const DEFAULT_URL: &str = "ldap://127.0.0.1";

/// User attribute used when none has been written
pub const DEFAULT_USER_ATTR: &str = "cn";

/// The directory server configuration.
///
/// Serialized with the external field names; this is both the persisted shape
/// and what a read returns. Fields missing from stored data keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigEntry {
    /// Server URL (`ldap://` or `ldaps://`)
    #[serde(rename = "url")]
    pub url: String,
    /// Base DN for users
    #[serde(rename = "userdn")]
    pub user_dn: String,
    /// Base DN for groups
    #[serde(rename = "groupdn")]
    pub group_dn: String,
    /// userPrincipalName domain for `user@domain` logins
    #[serde(rename = "upndomain")]
    pub upn_domain: String,
    /// Attribute holding the user name
    #[serde(rename = "userattr")]
    pub user_attr: String,
    /// PEM encoded CA certificate(s); empty means platform trust store
    #[serde(rename = "certificate")]
    pub certificate: String,
    /// Skip server certificate verification
    #[serde(rename = "insecure_tls")]
    pub insecure_tls: bool,
    /// Issue StartTLS on `ldap://` connections
    #[serde(rename = "starttls")]
    pub start_tls: bool,
}

impl Default for ConfigEntry {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            user_dn: String::new(),
            group_dn: String::new(),
            upn_domain: String::new(),
            user_attr: DEFAULT_USER_ATTR.to_string(),
            certificate: String::new(),
            insecure_tls: false,
            start_tls: false,
        }
    }
}

impl ConfigEntry {
    /// Resolve the server URL
    pub fn server_url(&self) -> Result<ServerUrl> {
        ServerUrl::parse(&self.url)
    }

    /// Build the TLS trust configuration for `host`
    pub fn tls_config(&self, host: &str) -> Result<TlsConfig> {
        TlsConfig::builder(host)
            .ca_certificate_pem(self.certificate.as_str())
            .danger_insecure_skip_verify(self.insecure_tls)
            .build()
    }
}
