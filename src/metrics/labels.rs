//! Metric names and label values

/// Dial attempts, by scheme
pub const DIAL_ATTEMPTS_TOTAL: &str = "ldap_dial_attempts_total";
/// Successful dials, by scheme
pub const DIAL_SUCCESS_TOTAL: &str = "ldap_dial_success_total";
/// Failed dials, by scheme and reason
pub const DIAL_FAILURES_TOTAL: &str = "ldap_dial_failures_total";
/// Dial duration in milliseconds, by scheme
pub const DIAL_DURATION_MS: &str = "ldap_dial_duration_ms";
/// Configuration writes, by outcome
pub const CONFIG_WRITES_TOTAL: &str = "ldap_config_writes_total";
/// Configuration reads, by outcome
pub const CONFIG_READS_TOTAL: &str = "ldap_config_reads_total";

/// Write persisted the candidate
pub const OUTCOME_STORED: &str = "stored";
/// Write rejected by validation
pub const OUTCOME_REJECTED: &str = "rejected";
/// Read found a record
pub const OUTCOME_FOUND: &str = "found";
/// Read found nothing
pub const OUTCOME_NOT_CONFIGURED: &str = "not_configured";
/// Internal failure (storage, serialization)
pub const OUTCOME_ERROR: &str = "error";

/// Dial timed out
pub const REASON_TIMEOUT: &str = "timeout";
