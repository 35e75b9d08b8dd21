//! Timestamp rendering in named timezones.
//!
//! Every timestamp the engine stores is UTC; conversion into the configured
//! zone happens only at display boundaries - replies, display names, and
//! file-prefix patterns.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Render format used by display names and reply timestamps.
pub const DEFAULT_FORMAT: &str = "%Y-%m-%dT%H:%M%z";

/// Parse a zone name, falling back to UTC when it is unknown.
pub fn zone_or_utc(zone: &str) -> Tz {
    zone.parse::<Tz>().unwrap_or_else(|_| {
        warn!(zone = %zone, "Unknown timezone, rendering in UTC");
        Tz::UTC
    })
}

/// Format a UTC timestamp in the named zone.
pub fn format_timestamp(timestamp: &DateTime<Utc>, zone: &str, fmt: &str) -> String {
    timestamp
        .with_timezone(&zone_or_utc(zone))
        .format(fmt)
        .to_string()
}

/// Format a UTC timestamp with [`DEFAULT_FORMAT`], in UTC.
pub fn format_default(timestamp: &DateTime<Utc>) -> String {
    format_timestamp(timestamp, "UTC", DEFAULT_FORMAT)
}
