//! Shared helper functions for SQL dialect implementations.

use chrono::{DateTime, SecondsFormat, Utc};

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Timestamp Bounds
// =============================================================================

/// Earliest instant stored as a finite timestamp (4700-01-01 BC, UTC).
pub const MIN_TIMESTAMP_SECS: i64 = -210_453_379_200;

/// Latest instant stored as a finite timestamp (3000-01-01T00:00:00Z).
pub const MAX_TIMESTAMP_SECS: i64 = 32_503_680_000;

/// Format a range bound, clamping out-of-range instants to `-infinity` /
/// `infinity` and truncating to whole seconds.
pub fn format_timestamp_bound(instant: &DateTime<Utc>) -> String {
    let secs = instant.timestamp();
    if secs < MIN_TIMESTAMP_SECS {
        "-infinity".to_string()
    } else if secs > MAX_TIMESTAMP_SECS {
        "infinity".to_string()
    } else {
        instant.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

// =============================================================================
// Pattern Matching
// =============================================================================

/// Turn a `*` wildcard pattern into a SQL `LIKE` pattern.
///
/// Returns `None` when the value has no wildcard and can be compared with `=`.
pub fn wildcard_to_like(value: &str) -> Option<String> {
    if value.contains('*') {
        Some(value.replace('*', "%"))
    } else {
        None
    }
}
