//! Counter helpers

use super::labels;

/// A dial was started
pub fn dial_attempted(scheme: &'static str) {
    metrics::counter!(labels::DIAL_ATTEMPTS_TOTAL, "scheme" => scheme).increment(1);
}

/// A dial produced an open connection
pub fn dial_succeeded(scheme: &'static str) {
    metrics::counter!(labels::DIAL_SUCCESS_TOTAL, "scheme" => scheme).increment(1);
}

/// A dial failed
pub fn dial_failed(scheme: &'static str, reason: &'static str) {
    metrics::counter!(labels::DIAL_FAILURES_TOTAL, "scheme" => scheme, "reason" => reason)
        .increment(1);
}

/// A configuration write finished
pub fn config_write(outcome: &'static str) {
    metrics::counter!(labels::CONFIG_WRITES_TOTAL, "outcome" => outcome).increment(1);
}

/// A configuration read finished
pub fn config_read(outcome: &'static str) {
    metrics::counter!(labels::CONFIG_READS_TOTAL, "outcome" => outcome).increment(1);
}
