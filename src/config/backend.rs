//! Read and write paths for the configuration record

use super::entry::ConfigEntry;
use super::patch::ConfigPatch;
use super::store::{ConfigStore, Storage};
use crate::client::Connector;
use crate::connection::{Dialer, TcpDialer};
use crate::metrics::{counters, labels};
use crate::Result;
use tracing::Instrument;

/// Outcome of a write that did not hit an internal fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResponse {
    /// Candidate validated and persisted; no content
    Stored,
    /// Candidate failed validation; storage untouched
    Rejected {
        /// User-facing reason
        message: String,
    },
}

impl WriteResponse {
    /// Whether the write was persisted
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }
}

/// Configuration endpoint: validates candidates by dialing before they are
/// persisted and serves the stored record back.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> ldap_config_wire::Result<()> {
/// use ldap_config_wire::config::{ConfigBackend, ConfigPatch, MemoryStorage, WriteResponse};
///
/// let backend = ConfigBackend::new(MemoryStorage::new());
///
/// let patch = ConfigPatch::new()
///     .url("ldaps://ldap.example.org")
///     .user_dn("ou=People,dc=example,dc=org");
///
/// match backend.write(patch).await? {
///     WriteResponse::Stored => {}
///     WriteResponse::Rejected { message } => eprintln!("rejected: {}", message),
/// }
///
/// let current = backend.read().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBackend<S, D = TcpDialer> {
    store: ConfigStore<S>,
    connector: Connector<D>,
}

impl<S: Storage> ConfigBackend<S, TcpDialer> {
    /// Backend that validates over TCP with default connector options
    pub fn new(storage: S) -> Self {
        Self::with_connector(storage, Connector::new())
    }
}

impl<S: Storage, D: Dialer> ConfigBackend<S, D> {
    /// Backend with a custom connector
    pub fn with_connector(storage: S, connector: Connector<D>) -> Self {
        Self {
            store: ConfigStore::new(storage),
            connector,
        }
    }

    /// Current configuration, `None` if nothing was ever written.
    ///
    /// Fields are returned verbatim, including the CA certificate and
    /// security flags.
    pub async fn read(&self) -> Result<Option<ConfigEntry>> {
        let result = self.store.load().await;
        let outcome = match &result {
            Ok(Some(_)) => labels::OUTCOME_FOUND,
            Ok(None) => labels::OUTCOME_NOT_CONFIGURED,
            Err(_) => labels::OUTCOME_ERROR,
        };
        counters::config_read(outcome);
        result
    }

    /// Validate and persist a configuration.
    ///
    /// The candidate is built from `patch` and dialed. A dial failure yields
    /// [`WriteResponse::Rejected`] and storage is left alone. On success the
    /// validation connection is closed and the candidate replaces the stored
    /// record. Storage and serialization faults are returned as `Err`.
    pub async fn write(&self, patch: ConfigPatch) -> Result<WriteResponse> {
        let candidate = patch.into_candidate();
        let span = tracing::info_span!("config_write", url = %candidate.url);

        async {
            if let Err(e) = self.connector.validate(&candidate).await {
                if !e.is_validation_error() {
                    counters::config_write(labels::OUTCOME_ERROR);
                    return Err(e);
                }
                tracing::warn!(error = %e, "configuration rejected");
                counters::config_write(labels::OUTCOME_REJECTED);
                return Ok(WriteResponse::Rejected {
                    message: e.to_string(),
                });
            }

            if let Err(e) = self.store.save(&candidate).await {
                tracing::error!(error = %e, "failed to persist configuration");
                counters::config_write(labels::OUTCOME_ERROR);
                return Err(e);
            }

            tracing::info!("configuration stored");
            counters::config_write(labels::OUTCOME_STORED);
            Ok(WriteResponse::Stored)
        }
        .instrument(span)
        .await
    }
}
