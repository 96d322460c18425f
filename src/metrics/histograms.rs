//! Histogram helpers

use super::labels;

/// Time from dial start to open connection (or failure)
pub fn dial_duration(scheme: &'static str, duration_ms: u64) {
    metrics::histogram!(labels::DIAL_DURATION_MS, "scheme" => scheme).record(duration_ms as f64);
}
