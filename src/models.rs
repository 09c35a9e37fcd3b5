//! Data models for the seat availability API.
//!
//! These structures match the JSON served by `/api/seats` and `/api/status`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Top-level response from `/api/seats`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchResult {
    /// Events and their totals
    pub data: SeatData,

    /// When the backend last refreshed its cache
    #[serde(default)]
    pub cached_at: Option<String>,

    /// When the backend cache goes stale
    #[serde(default)]
    pub cache_expires_at: Option<String>,
}

impl FetchResult {
    /// Get the cache timestamp, if present and parseable.
    #[must_use]
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.cached_at.as_deref().and_then(parse_timestamp)
    }

    /// Get the cache expiry timestamp, if present and parseable.
    #[must_use]
    pub fn cache_expires_at(&self) -> Option<DateTime<Utc>> {
        self.cache_expires_at.as_deref().and_then(parse_timestamp)
    }
}

/// The `data` object of a successful response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeatData {
    /// Events in display order
    pub events: Vec<EventAvailability>,

    /// Totals across all events
    pub summary: Summary,
}

/// Seat counts for a single performance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventAvailability {
    /// Performance date (`YYYY-MM-DD` or ISO-8601 date-time)
    pub date: String,

    /// Seats still available
    pub free: u64,

    /// Seats already sold or blocked
    pub taken: u64,

    /// All seats; authoritative for percentages
    pub total: u64,

    /// Ticket purchase page
    pub url: String,

    /// Backend's own rounded percentage (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_percent: Option<f64>,
}

impl EventAvailability {
    /// Get the performance date, if it can be parsed.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_timestamp(&self.date).map(|t| t.with_timezone(&Local).date_naive()))
    }

    /// Percentage of seats still free, rounded.
    ///
    /// An event with no seats at all reports 0.
    #[must_use]
    pub fn availability_percent(&self) -> u64 {
        percent_of(self.free, self.total)
    }
}

/// Totals across all events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Summary {
    pub free_total: u64,
    pub taken_total: u64,
    pub all_total: u64,
    /// Free share of all seats, 0-100
    pub total_percent: f64,
}

impl Summary {
    /// Percentage as shown in the summary panel, e.g. `33.3%` or `50%`.
    #[must_use]
    pub fn percent_label(&self) -> String {
        format!("{}%", self.total_percent)
    }
}

/// Response from `/api/status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheStatus {
    /// Whether the backend cache is still fresh
    pub cache_valid: bool,

    #[serde(default)]
    pub cached_at: Option<String>,

    #[serde(default)]
    pub cache_expires_at: Option<String>,
}

/// Rounded `part / whole` percentage; 0 when `whole` is 0.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn percent_of(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    let ratio = part as f64 / whole as f64 * 100.0;
    if ratio.is_finite() { ratio.round() as u64 } else { 0 }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, naive date-times (local time, as the backend writes
/// them without an offset) and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }

    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
