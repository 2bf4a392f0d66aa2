//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, the only time representation that appears inside a
//! canary. Every instant is UTC and truncated to whole seconds, and the
//! textual form is fixed: `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! ## Invariant
//!
//! Parsing is strict. Offsets other than `Z`, fractional seconds, and
//! date-only strings are rejected with [`DocumentError::MalformedTime`], so
//! that a signed document has exactly one textual form for each instant and
//! serialize → parse reproduces the same value.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DocumentError;

/// Textual format used in canary documents.
pub const CANARY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Compact format used in proof file names; must sort lexicographically
/// in chronological order.
pub const FILE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: from the canonical string, strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse the canonical `YYYY-MM-DDTHH:MM:SSZ` form.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MalformedTime`] for any other shape,
    /// including RFC 3339 strings with offsets or fractional seconds.
    pub fn parse(s: &str) -> Result<Self, DocumentError> {
        // Fixed width: 4+1+2+1+2+1+2+1+2+1+2+1
        if s.len() != 20 {
            return Err(DocumentError::MalformedTime(s.to_string()));
        }
        let naive = NaiveDateTime::parse_from_str(s, CANARY_TIME_FORMAT)
            .map_err(|_| DocumentError::MalformedTime(s.to_string()))?;
        let ts = Self::from_utc(naive.and_utc());
        // chrono tolerates signs, padding spaces and short fields.
        if ts.to_canonical() != s {
            return Err(DocumentError::MalformedTime(s.to_string()));
        }
        Ok(ts)
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, DocumentError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| DocumentError::MalformedTime(format!("@{secs}")))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render in the canonical canary form (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_canonical(&self) -> String {
        self.0.format(CANARY_TIME_FORMAT).to_string()
    }

    /// Render in the compact, sortable form used for proof file names.
    pub fn to_file_stamp(&self) -> String {
        self.0.format(FILE_TIME_FORMAT).to_string()
    }

    /// Shift forward by whole seconds. `None` on overflow.
    pub fn checked_add_secs(&self, secs: u64) -> Option<Self> {
        let secs = i64::try_from(secs).ok()?;
        self.0
            .checked_add_signed(chrono::Duration::try_seconds(secs)?)
            .map(Self)
    }

    /// Time left until `later`, or zero if `later` is not in the future.
    pub fn duration_until(&self, later: &Timestamp) -> Duration {
        (later.0 - self.0).to_std().unwrap_or(Duration::ZERO)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
