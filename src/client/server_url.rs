//! Server URL resolution
//!
//! Supports formats:
//! * ldap://host[:port][/...]   (plain, default port 389)
//! * ldaps://host[:port][/...]  (implicit TLS, default port 636)
//!
//! Pure: no I/O happens here, so a bad URL or scheme is rejected before any
//! socket is opened.

use crate::{Error, Result};
use url::{Host, Url};

/// Default port for `ldap://`
pub const LDAP_DEFAULT_PORT: u16 = 389;

/// Default port for `ldaps://`
pub const LDAPS_DEFAULT_PORT: u16 = 636;

/// URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdapScheme {
    /// Plaintext, optionally upgraded with StartTLS
    Ldap,
    /// TLS from the first byte
    Ldaps,
}

impl LdapScheme {
    /// Port used when the URL has none
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Ldap => LDAP_DEFAULT_PORT,
            Self::Ldaps => LDAPS_DEFAULT_PORT,
        }
    }

    /// Scheme as written in a URL
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ldap => "ldap",
            Self::Ldaps => "ldaps",
        }
    }
}

impl std::fmt::Display for LdapScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LdapScheme {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ldap" => Ok(Self::Ldap),
            "ldaps" => Ok(Self::Ldaps),
            other => Err(Error::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Parsed server URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl {
    /// Scheme
    pub scheme: LdapScheme,
    /// Host name or IP address (IPv6 without brackets)
    pub host: String,
    /// Explicit port, or the scheme default
    pub port: u16,
}

impl ServerUrl {
    /// Parse a server URL into (scheme, host, port).
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedUrl`] if the string is not a URL or has no host
    /// - [`Error::UnsupportedScheme`] for anything but `ldap` / `ldaps`
    pub fn parse(s: &str) -> Result<Self> {
        let url = Url::parse(s).map_err(|e| Error::MalformedUrl(format!("'{}': {}", s, e)))?;

        let scheme: LdapScheme = url.scheme().parse()?;

        // ldap is not a special scheme, so `url` leaves domains percent-encoded
        let host = match url.host() {
            Some(Host::Domain(domain)) => urlencoding::decode(domain)
                .map_err(|e| Error::MalformedUrl(format!("'{}': invalid host: {}", s, e)))?
                .into_owned(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => String::new(),
        };
        if host.is_empty() {
            return Err(Error::MalformedUrl(format!("'{}': missing host", s)));
        }

        let port = match url.port() {
            Some(0) => return Err(Error::MalformedUrl(format!("'{}': port 0", s))),
            Some(port) => port,
            None => scheme.default_port(),
        };

        Ok(Self { scheme, host, port })
    }
}

impl std::fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}
