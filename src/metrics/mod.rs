//! Metrics for dials and configuration writes
//!
//! Recorded through the `metrics` facade; installing an exporter is up to the
//! host process.

pub mod counters;
pub mod histograms;
pub mod labels;
