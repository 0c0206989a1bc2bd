//! Metric engine: pure derivations over product rows.
//!
//! Nothing in here touches the filesystem or the metrics store; every
//! function takes rows (already filtered) and returns a serialisable view
//! whose field names match the dashboard's JSON contract.

pub mod aggregate;
pub mod comparison;
pub mod quality;

use chrono::{DateTime, Utc};

/// Timestamp layout used in every JSON view.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp for a JSON view.
pub fn display_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
