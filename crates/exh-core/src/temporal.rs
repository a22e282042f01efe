//! # Time Handling
//!
//! All stored timestamps are UTC. The protocol exchanges date-times as
//! naive local strings (`YYYY-MM-DDTHH:MM:SS`) and each deployment renders
//! its own timestamps in a fixed local offset, so this module provides:
//!
//! - [`Clock`], an injectable wall-clock source ([`SystemClock`] in
//!   production, [`FixedClock`] in tests).
//! - [`LocalZone`], the configured presentation offset.
//! - [`parse_protocol_datetime`], strict parsing of inbound date-times.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, Utc};
use parking_lot::Mutex;

use crate::error::ValidationError;

/// The exact date-time format the protocol exchanges.
pub const PROTOCOL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const PROTOCOL_DATETIME_HUMAN: &str = "YYYY-MM-DDTHH:MM:SS";

/// A UTC wall-clock source.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The operating-system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Presentation timezone, a fixed UTC offset such as `-06:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalZone(FixedOffset);

impl LocalZone {
    /// Parse a `+HH:MM` / `-HH:MM` offset.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUtcOffset`] for anything else,
    /// including offsets of 24 hours or more.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidUtcOffset(value.to_string());
        let trimmed = value.trim();
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        let (hh, mm) = rest.split_once(':').ok_or_else(invalid)?;
        let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(hh) || !two_digits(mm) {
            return Err(invalid());
        }
        let hours: i32 = hh.parse().map_err(|_| invalid())?;
        let minutes: i32 = mm.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        let seconds = sign * (hours * 3600 + minutes * 60);
        FixedOffset::east_opt(seconds).map(Self).ok_or_else(invalid)
    }

    /// UTC, used when no offset is configured.
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    /// The underlying offset.
    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Convert a stored UTC instant to this zone.
    pub fn localize(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.0)
    }

    /// Render a stored UTC instant in protocol format, in this zone.
    pub fn render(&self, at: DateTime<Utc>) -> String {
        self.localize(at).format(PROTOCOL_DATETIME_FORMAT).to_string()
    }

    /// Interpret a naive protocol date-time as local to this zone.
    pub fn to_utc(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        naive
            .and_local_timezone(self.0)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl std::fmt::Display for LocalZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a date-time in the exact protocol format.
///
/// Fractional seconds, offsets and the space separator are all rejected.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDateTime`] on any deviation.
pub fn parse_protocol_datetime(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let invalid = || ValidationError::InvalidDateTime {
        value: value.to_string(),
        expected: PROTOCOL_DATETIME_HUMAN,
    };
    // chrono tolerates some padding variations; the protocol does not.
    if value.len() != 19 {
        return Err(invalid());
    }
    NaiveDateTime::parse_from_str(value, PROTOCOL_DATETIME_FORMAT).map_err(|_| invalid())
}
