//! TLS trust configuration for directory server connections.
//!
//! A [`TlsConfig`] is derived on demand from a configuration record's CA
//! certificate PEM and `insecure_tls` flag, scoped to one target hostname.
//! It is never persisted.

use crate::{Error, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pemfile::Item;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::sync::{Arc, OnceLock};

/// Where server certificates are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustRoots {
    /// Platform trust store (bundled webpki roots if the platform has none)
    Platform,
    /// Only the CA certificates supplied in the configuration
    Pinned {
        /// Number of usable certificates in the pool
        certificates: usize,
    },
}

/// TLS configuration for one directory server.
///
/// # Examples
///
/// ```ignore
/// use ldap_config_wire::connection::TlsConfig;
///
/// // Platform trust store
/// let tls = TlsConfig::builder("ldap.example.org").build()?;
///
/// // Pinned CA
/// let tls = TlsConfig::builder("ldap.example.org")
///     .ca_certificate_pem(pem)
///     .build()?;
///
/// // Development only: no chain or hostname verification
/// let tls = TlsConfig::builder("ldap.example.org")
///     .danger_insecure_skip_verify(true)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct TlsConfig {
    server_name: ServerName<'static>,
    trust_roots: TrustRoots,
    danger_insecure_skip_verify: bool,
    client_config: Arc<ClientConfig>,
}

impl TlsConfig {
    /// Create a builder for the given target hostname.
    pub fn builder(server_name: impl Into<String>) -> TlsConfigBuilder {
        TlsConfigBuilder {
            server_name: server_name.into(),
            ca_certificate_pem: None,
            danger_insecure_skip_verify: false,
        }
    }

    /// Name used for SNI and certificate hostname verification
    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    /// Get the rustls ClientConfig for this TLS configuration.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_config.clone()
    }

    /// Trust anchors in effect when verification is enabled
    pub fn trust_roots(&self) -> TrustRoots {
        self.trust_roots
    }

    /// Whether chain and hostname verification are disabled.
    pub fn danger_insecure_skip_verify(&self) -> bool {
        self.danger_insecure_skip_verify
    }
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("server_name", &self.server_name)
            .field("trust_roots", &self.trust_roots)
            .field(
                "danger_insecure_skip_verify",
                &self.danger_insecure_skip_verify,
            )
            .field("client_config", &"<ClientConfig>")
            .finish()
    }
}

/// Builder for TLS configuration.
#[derive(Debug, Clone)]
pub struct TlsConfigBuilder {
    server_name: String,
    ca_certificate_pem: Option<String>,
    danger_insecure_skip_verify: bool,
}

impl TlsConfigBuilder {
    /// Restrict trust to the CA certificates in this PEM blob.
    ///
    /// An empty string is the same as not calling this method.
    pub fn ca_certificate_pem(mut self, pem: impl Into<String>) -> Self {
        let pem = pem.into();
        self.ca_certificate_pem = if pem.is_empty() { None } else { Some(pem) };
        self
    }

    /// ⚠️ **DANGER**: Skip certificate chain and hostname verification.
    ///
    /// **NEVER use in production.** The connection is encrypted but the
    /// server is not authenticated. Takes precedence over a pinned CA.
    pub fn danger_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.danger_insecure_skip_verify = skip;
        self
    }

    /// Build the TLS configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTlsMaterial`] if the CA PEM holds no usable certificate
    /// - [`Error::Tls`] if the hostname cannot be used as a TLS server name
    pub fn build(self) -> Result<TlsConfig> {
        let server_name = parse_server_name(&self.server_name)?;

        // Material is validated even when verification is skipped
        let pinned = match &self.ca_certificate_pem {
            Some(pem) => Some(parse_ca_pem(pem)?),
            None => None,
        };
        let trust_roots = match &pinned {
            Some(store) => TrustRoots::Pinned {
                certificates: store.len(),
            },
            None => TrustRoots::Platform,
        };

        let provider = crypto_provider();
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Tls(format!("unsupported protocol versions: {}", e)))?;

        let client_config = if self.danger_insecure_skip_verify {
            if pinned.is_some() {
                tracing::warn!(
                    server_name = %self.server_name,
                    "insecure_tls is set together with a CA certificate; certificate verification is skipped and the CA is ignored"
                );
            } else {
                tracing::warn!(
                    server_name = %self.server_name,
                    "insecure_tls is set; server certificates will not be verified"
                );
            }

            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(SkipServerVerification(provider)))
                .with_no_client_auth()
        } else {
            let roots = match pinned {
                Some(store) => store,
                None => platform_roots(),
            };
            builder.with_root_certificates(roots).with_no_client_auth()
        };

        Ok(TlsConfig {
            server_name,
            trust_roots,
            danger_insecure_skip_verify: self.danger_insecure_skip_verify,
            client_config: Arc::new(client_config),
        })
    }
}

/// Parse a CA certificate PEM blob into a root store.
///
/// Non-certificate PEM items are skipped. Zero usable certificates is an error.
fn parse_ca_pem(pem: &str) -> Result<RootCertStore> {
    let mut reader = std::io::Cursor::new(pem.as_bytes());
    let mut root_store = RootCertStore::empty();

    loop {
        match rustls_pemfile::read_one(&mut reader) {
            Ok(Some(Item::X509Certificate(cert))) => {
                let (_added, ignored) = root_store.add_parsable_certificates(std::iter::once(cert));
                if ignored > 0 {
                    tracing::debug!("skipping unparsable CA certificate");
                }
            }
            Ok(Some(_)) => {
                // Private keys, CRLs and the like
            }
            Ok(None) => break,
            Err(e) => {
                return Err(Error::InvalidTlsMaterial(format!(
                    "failed to parse PEM data: {}",
                    e
                )));
            }
        }
    }

    if root_store.is_empty() {
        return Err(Error::InvalidTlsMaterial(
            "no valid certificates found in PEM data".into(),
        ));
    }

    Ok(root_store)
}

fn platform_roots() -> RootCertStore {
    static PLATFORM_ROOTS: OnceLock<RootCertStore> = OnceLock::new();

    PLATFORM_ROOTS
        .get_or_init(|| {
            let result = rustls_native_certs::load_native_certs();
            if !result.errors.is_empty() {
                tracing::debug!(
                    errors = result.errors.len(),
                    "some platform root certificates could not be loaded"
                );
            }

            let mut store = RootCertStore::empty();
            store.add_parsable_certificates(result.certs);

            if store.is_empty() {
                tracing::warn!("no platform root certificates available, using bundled webpki roots");
                store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            }

            store
        })
        .clone()
}

fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Parse a hostname or IP address for TLS SNI and verification.
///
/// # Errors
///
/// Returns an error if the name is empty or not a valid DNS name / IP address.
pub fn parse_server_name(hostname: &str) -> Result<ServerName<'static>> {
    // Remove trailing dot if present
    let hostname = hostname.trim_end_matches('.');

    if hostname.is_empty() || hostname.len() > 253 {
        return Err(Error::Tls(format!(
            "invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::Tls(format!("invalid hostname for TLS: '{}'", hostname)))
}

/// Accepts any certificate chain and hostname; handshake signatures are
/// still checked so the session keys belong to whoever holds the presented key.
#[derive(Debug)]
struct SkipServerVerification(Arc<CryptoProvider>);

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    fn test_ca_pem() -> String {
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
            .expect("generate certificate")
            .cert
            .pem()
    }

    #[test]
    fn test_builder_defaults() {
        let tls = TlsConfig::builder("ldap.example.org");
        assert!(tls.ca_certificate_pem.is_none());
        assert!(!tls.danger_insecure_skip_verify);
    }

    #[test]
    fn test_build_platform_roots() {
        let tls = TlsConfig::builder("ldap.example.org")
            .build()
            .expect("Failed to build TLS config");

        assert_eq!(tls.trust_roots(), TrustRoots::Platform);
        assert!(!tls.danger_insecure_skip_verify());
        assert_eq!(
            tls.server_name(),
            &ServerName::try_from("ldap.example.org").unwrap()
        );
    }

    #[test]
    fn test_build_pinned_ca() {
        let tls = TlsConfig::builder("localhost")
            .ca_certificate_pem(test_ca_pem())
            .build()
            .expect("Failed to build TLS config");

        assert_eq!(tls.trust_roots(), TrustRoots::Pinned { certificates: 1 });
    }

    #[test]
    fn test_build_pinned_ca_bundle() {
        let bundle = format!("{}\n{}", test_ca_pem(), test_ca_pem());
        let tls = TlsConfig::builder("localhost")
            .ca_certificate_pem(bundle)
            .build()
            .unwrap();

        assert_eq!(tls.trust_roots(), TrustRoots::Pinned { certificates: 2 });
    }

    #[test]
    fn test_garbage_pem_is_invalid_material() {
        let err = TlsConfig::builder("localhost")
            .ca_certificate_pem("this is not a certificate")
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::InvalidTlsMaterial(_)));
    }

    #[test]
    fn test_corrupt_certificate_block_is_invalid_material() {
        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        let err = TlsConfig::builder("localhost")
            .ca_certificate_pem(pem)
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::InvalidTlsMaterial(_)));
    }

    #[test]
    fn test_key_only_pem_is_invalid_material() {
        let key_pem = rcgen::KeyPair::generate().unwrap().serialize_pem();
        let err = TlsConfig::builder("localhost")
            .ca_certificate_pem(key_pem)
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::InvalidTlsMaterial(_)));
    }

    #[test]
    fn test_empty_pem_means_platform() {
        let tls = TlsConfig::builder("localhost")
            .ca_certificate_pem("")
            .build()
            .unwrap();

        assert_eq!(tls.trust_roots(), TrustRoots::Platform);
    }

    #[test]
    fn test_insecure_with_ca_still_validates_material() {
        let err = TlsConfig::builder("localhost")
            .ca_certificate_pem("garbage")
            .danger_insecure_skip_verify(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTlsMaterial(_)));

        let tls = TlsConfig::builder("localhost")
            .ca_certificate_pem(test_ca_pem())
            .danger_insecure_skip_verify(true)
            .build()
            .unwrap();
        assert!(tls.danger_insecure_skip_verify());
        assert_eq!(tls.trust_roots(), TrustRoots::Pinned { certificates: 1 });
    }

    /// Formatted log output shared with a test subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Run `f` with warnings captured, returning the captured output
    fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs.contents())
    }

    #[test]
    fn test_insecure_with_ca_logs_warning() {
        let pem = test_ca_pem();
        let (tls, logs) = capture_warnings(|| {
            TlsConfig::builder("localhost")
                .ca_certificate_pem(pem)
                .danger_insecure_skip_verify(true)
                .build()
        });

        assert!(tls.unwrap().danger_insecure_skip_verify());
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(
            logs.contains("insecure_tls is set together with a CA certificate"),
            "{}",
            logs
        );
        assert!(logs.contains("server_name=localhost"), "{}", logs);
    }

    #[test]
    fn test_insecure_without_ca_logs_warning() {
        let (tls, logs) = capture_warnings(|| {
            TlsConfig::builder("localhost")
                .danger_insecure_skip_verify(true)
                .build()
        });

        assert!(tls.is_ok());
        assert!(
            logs.contains("insecure_tls is set; server certificates will not be verified"),
            "{}",
            logs
        );
        assert!(!logs.contains("together with a CA certificate"), "{}", logs);
    }

    #[test]
    fn test_verified_config_logs_nothing() {
        let pem = test_ca_pem();
        let (tls, logs) =
            capture_warnings(|| TlsConfig::builder("localhost").ca_certificate_pem(pem).build());

        assert!(tls.is_ok());
        assert!(logs.is_empty(), "{}", logs);
    }

    #[test]
    fn test_parse_server_name_valid() {
        assert!(parse_server_name("localhost").is_ok());
        assert!(parse_server_name("example.com").is_ok());
        assert!(parse_server_name("ldap.internal.example.com").is_ok());
        assert!(parse_server_name("127.0.0.1").is_ok());
        assert!(parse_server_name("::1").is_ok());
    }

    #[test]
    fn test_parse_server_name_trailing_dot() {
        let name = parse_server_name("example.com.").unwrap();
        assert_eq!(name, ServerName::try_from("example.com").unwrap());
    }

    #[test]
    fn test_parse_server_name_invalid() {
        assert!(parse_server_name("").is_err());
        assert!(parse_server_name("bad host name").is_err());
    }

    #[test]
    fn test_tls_config_debug() {
        let tls = TlsConfig::builder("localhost")
            .danger_insecure_skip_verify(true)
            .build()
            .unwrap();

        let debug_str = format!("{:?}", tls);
        assert!(debug_str.contains("TlsConfig"));
        assert!(debug_str.contains("danger_insecure_skip_verify: true"));
    }
}
