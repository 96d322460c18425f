//! Write patch: the field values a configuration write supplies

use super::entry::ConfigEntry;
use serde::{Deserialize, Deserializer};

/// Field values supplied by a write.
///
/// `None` means "not supplied"; empty strings are treated the same way. Boolean
/// fields are tri-state so `false` can be written explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigPatch {
    /// Server URL (lower-cased on apply)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub url: Option<String>,
    /// Base DN for users
    #[serde(default, rename = "userdn", deserialize_with = "empty_as_none")]
    pub user_dn: Option<String>,
    /// Base DN for groups
    #[serde(default, rename = "groupdn", deserialize_with = "empty_as_none")]
    pub group_dn: Option<String>,
    /// userPrincipalName domain
    #[serde(default, rename = "upndomain", deserialize_with = "empty_as_none")]
    pub upn_domain: Option<String>,
    /// User attribute (lower-cased on apply)
    #[serde(default, rename = "userattr", deserialize_with = "empty_as_none")]
    pub user_attr: Option<String>,
    /// PEM encoded CA certificate(s)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub certificate: Option<String>,
    /// Skip server certificate verification
    #[serde(default)]
    pub insecure_tls: Option<bool>,
    /// Issue StartTLS on `ldap://` connections
    #[serde(default, rename = "starttls")]
    pub start_tls: Option<bool>,
}

impl ConfigPatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = non_empty(url.into());
        self
    }

    /// Set the user base DN
    pub fn user_dn(mut self, dn: impl Into<String>) -> Self {
        self.user_dn = non_empty(dn.into());
        self
    }

    /// Set the group base DN
    pub fn group_dn(mut self, dn: impl Into<String>) -> Self {
        self.group_dn = non_empty(dn.into());
        self
    }

    /// Set the UPN domain
    pub fn upn_domain(mut self, domain: impl Into<String>) -> Self {
        self.upn_domain = non_empty(domain.into());
        self
    }

    /// Set the user attribute
    pub fn user_attr(mut self, attr: impl Into<String>) -> Self {
        self.user_attr = non_empty(attr.into());
        self
    }

    /// Set the CA certificate PEM
    pub fn certificate(mut self, pem: impl Into<String>) -> Self {
        self.certificate = non_empty(pem.into());
        self
    }

    /// Set or clear certificate verification skipping
    pub fn insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_tls = Some(insecure);
        self
    }

    /// Set or clear StartTLS
    pub fn start_tls(mut self, start_tls: bool) -> Self {
        self.start_tls = Some(start_tls);
        self
    }

    /// Materialize the candidate record.
    ///
    /// Starts from the defaults, not from the stored record: a write replaces the
    /// whole configuration.
    pub fn into_candidate(self) -> ConfigEntry {
        let mut entry = ConfigEntry::default();

        if let Some(url) = self.url {
            entry.url = url.to_lowercase();
        }
        if let Some(user_attr) = self.user_attr {
            entry.user_attr = user_attr.to_lowercase();
        }
        if let Some(user_dn) = self.user_dn {
            entry.user_dn = user_dn;
        }
        if let Some(group_dn) = self.group_dn {
            entry.group_dn = group_dn;
        }
        if let Some(upn_domain) = self.upn_domain {
            entry.upn_domain = upn_domain;
        }
        if let Some(certificate) = self.certificate {
            entry.certificate = certificate;
        }
        if let Some(insecure_tls) = self.insecure_tls {
            entry.insecure_tls = insecure_tls;
        }
        if let Some(start_tls) = self.start_tls {
            entry.start_tls = start_tls;
        }

        entry
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(non_empty))
}
