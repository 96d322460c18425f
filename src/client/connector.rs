//! Connector: turns a configuration record into an open connection

use super::server_url::{LdapScheme, ServerUrl};
use crate::config::ConfigEntry;
use crate::connection::{Dialer, LdapConnection, TcpDialer, TlsConfig, Transport};
use crate::metrics::{counters, histograms, labels};
use crate::{Error, Result};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Default bound on a whole dial (TCP connect, StartTLS and TLS handshake)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the transport is established for a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStrategy {
    /// `ldap://`: plain TCP, upgraded in-band when `start_tls` is set
    PlainThenOptionalUpgrade {
        /// Issue StartTLS right after connecting
        start_tls: bool,
    },
    /// `ldaps://`: TLS from the first byte
    ImplicitTls,
}

impl TransportStrategy {
    /// Select the strategy for a scheme.
    ///
    /// `start_tls` has no effect on `ldaps://`, which is already encrypted.
    pub fn select(scheme: LdapScheme, start_tls: bool) -> Self {
        match scheme {
            LdapScheme::Ldap => Self::PlainThenOptionalUpgrade { start_tls },
            LdapScheme::Ldaps => Self::ImplicitTls,
        }
    }

    /// Whether a TLS trust configuration is needed before dialing
    pub fn requires_tls(&self) -> bool {
        matches!(
            self,
            Self::PlainThenOptionalUpgrade { start_tls: true } | Self::ImplicitTls
        )
    }
}

/// Strategy with its trust configuration resolved
enum DialPlan {
    Plain,
    StartTls(TlsConfig),
    ImplicitTls(TlsConfig),
}

/// Connector options
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    /// Bound on the whole dial
    pub connect_timeout: Duration,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Opens connections to the directory server named by a [`ConfigEntry`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> ldap_config_wire::Result<()> {
/// use ldap_config_wire::{ConfigEntry, Connector};
/// use std::time::Duration;
///
/// let connector = Connector::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .build();
///
/// let mut entry = ConfigEntry::default();
/// entry.url = "ldaps://ldap.example.org".into();
///
/// let conn = connector.connect(&entry).await?;
/// conn.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Connector<D = TcpDialer> {
    dialer: D,
    options: ConnectorOptions,
}

impl Connector<TcpDialer> {
    /// Connector over TCP with default options
    pub fn new() -> Self {
        Self::with_dialer(TcpDialer)
    }

    /// Create a builder for advanced configuration
    pub fn builder() -> ConnectorBuilder {
        ConnectorBuilder {
            options: ConnectorOptions::default(),
        }
    }
}

impl Default for Connector<TcpDialer> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Connector`]
#[derive(Debug, Clone)]
pub struct ConnectorBuilder {
    options: ConnectorOptions,
}

impl ConnectorBuilder {
    /// Set the dial timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.options.connect_timeout = duration;
        self
    }

    /// Build a TCP connector
    pub fn build(self) -> Connector<TcpDialer> {
        self.build_with_dialer(TcpDialer)
    }

    /// Build a connector over a custom dialer
    pub fn build_with_dialer<D: Dialer>(self, dialer: D) -> Connector<D> {
        Connector {
            dialer,
            options: self.options,
        }
    }
}

impl<D: Dialer> Connector<D> {
    /// Connector over a custom dialer with default options
    pub fn with_dialer(dialer: D) -> Self {
        Self {
            dialer,
            options: ConnectorOptions::default(),
        }
    }

    /// Options in effect
    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }

    /// Dial the server named by `entry` under its TLS policy.
    ///
    /// URL, scheme and CA material problems are reported before any socket is
    /// opened. Every other failure is reported as [`Error::ConnectionFailed`].
    /// The caller owns the returned connection and must close it.
    pub async fn connect(&self, entry: &ConfigEntry) -> Result<LdapConnection<D::Stream>> {
        let url = entry.server_url()?;
        let strategy = TransportStrategy::select(url.scheme, entry.start_tls);
        let plan = resolve_plan(entry, &url, strategy).map_err(Error::connection_failed)?;

        let scheme = url.scheme.as_str();
        let span = tracing::info_span!(
            "dial",
            scheme = scheme,
            host = %url.host,
            port = url.port,
        );

        async {
            counters::dial_attempted(scheme);
            let start = Instant::now();

            let timeout = self.options.connect_timeout;
            let result = match tokio::time::timeout(timeout, self.establish(&url, plan)).await {
                Ok(Ok(conn)) => {
                    counters::dial_succeeded(scheme);
                    Ok(conn)
                }
                Ok(Err(e)) => {
                    counters::dial_failed(scheme, e.category());
                    Err(Error::connection_failed(e))
                }
                Err(_) => {
                    counters::dial_failed(scheme, labels::REASON_TIMEOUT);
                    Err(Error::ConnectionFailed(format!(
                        "timed out after {}ms",
                        timeout.as_millis()
                    )))
                }
            };
            histograms::dial_duration(scheme, start.elapsed().as_millis() as u64);

            match &result {
                Ok(_) => tracing::debug!("directory server connection established"),
                Err(e) => tracing::debug!(error = %e, "dial failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Check that `entry` is currently dialable; the connection is closed
    /// right after it opens.
    pub async fn validate(&self, entry: &ConfigEntry) -> Result<()> {
        let conn = self.connect(entry).await?;
        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "error closing validation connection");
        }
        Ok(())
    }

    async fn establish(&self, url: &ServerUrl, plan: DialPlan) -> Result<LdapConnection<D::Stream>> {
        let stream = self.dialer.dial(&url.host, url.port).await?;
        tracing::debug!("transport connected");

        match plan {
            DialPlan::Plain => {
                let mut conn = LdapConnection::new(Transport::Plain(stream));
                conn.mark_open()?;
                Ok(conn)
            }
            DialPlan::StartTls(tls_config) => {
                let mut conn = LdapConnection::new(Transport::Plain(stream));
                if let Err(e) = conn.start_tls(&tls_config).await {
                    // No fallback to plaintext
                    conn.abort().await;
                    return Err(e);
                }
                Ok(conn)
            }
            DialPlan::ImplicitTls(tls_config) => {
                let transport = Transport::connect_tls(stream, &tls_config).await?;
                tracing::info!("TLS connection established");
                let mut conn = LdapConnection::new(transport);
                conn.mark_open()?;
                Ok(conn)
            }
        }
    }
}

fn resolve_plan(entry: &ConfigEntry, url: &ServerUrl, strategy: TransportStrategy) -> Result<DialPlan> {
    if !strategy.requires_tls() {
        return Ok(DialPlan::Plain);
    }

    // Trust is settled before any socket is opened
    let tls_config = entry.tls_config(&url.host)?;
    let plan = match strategy {
        TransportStrategy::ImplicitTls => {
            if entry.start_tls {
                tracing::debug!("starttls is ignored for ldaps:// URLs");
            }
            DialPlan::ImplicitTls(tls_config)
        }
        TransportStrategy::PlainThenOptionalUpgrade { .. } => DialPlan::StartTls(tls_config),
    };
    Ok(plan)
}
