use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{
    error::{ListingError, Result},
    listing::parse_timestamp,
};

/// Anything younger than this is "just now".
pub const DEFAULT_JUST_NOW: Duration = Duration::from_secs(600);

/// Formats how long ago a timestamp was, relative to a given "now".
///
/// The output is not cached. Callers format again on every render.
#[derive(Debug, Clone, Copy)]
pub struct RelativeTime {
    just_now_secs: i64,
}

impl Default for RelativeTime {
    fn default() -> Self {
        Self::new(DEFAULT_JUST_NOW)
    }
}

impl RelativeTime {
    pub fn new(just_now: Duration) -> Self {
        Self {
            just_now_secs: i64::try_from(just_now.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Format against the current wall clock, in UTC.
    pub fn format_now(&self, timestamp: Option<&DateTime<Utc>>) -> Result<String> {
        self.format(timestamp, &Utc::now())
    }

    /// Format against the current wall clock, with calendar labels in the
    /// system's local time zone.
    pub fn format_local(&self, timestamp: Option<&DateTime<Utc>>) -> Result<String> {
        self.format(timestamp, &Local::now())
    }

    /// Format an RFC 3339 string against `now`.
    pub fn format_str<Tz: TimeZone>(&self, raw: &str, now: &DateTime<Tz>) -> Result<String> {
        let timestamp = parse_timestamp(raw)?;
        self.format(Some(&timestamp), now)
    }

    /// Format `timestamp` relative to `now`.
    ///
    /// Calendar decisions ("today", "yesterday", the absolute date) are made
    /// in the time zone of `now`. A missing timestamp is an error.
    pub fn format<Tz: TimeZone>(
        &self,
        timestamp: Option<&DateTime<Utc>>,
        now: &DateTime<Tz>,
    ) -> Result<String> {
        let timestamp = timestamp.ok_or_else(|| ListingError::invalid_timestamp("<missing>"))?;
        let local = timestamp.with_timezone(&now.timezone());

        let elapsed = now.clone().signed_duration_since(local.clone()).num_seconds();
        if elapsed < self.just_now_secs {
            return Ok("just now".to_string());
        }

        let minutes = elapsed / 60;
        let hours = minutes / 60;
        let days = hours / 24;
        let weeks = days / 7;

        let text = if minutes < 60 {
            if minutes == 1 {
                "a minute ago".to_string()
            } else {
                format!("{} minutes ago", minutes)
            }
        } else if hours < 12 {
            if hours == 1 {
                "an hour ago".to_string()
            } else {
                format!("{} hours ago", hours)
            }
        } else if hours < 24 {
            // Full calendar date, not just day-of-month
            if local.date_naive() == now.date_naive() {
                "today".to_string()
            } else {
                "yesterday".to_string()
            }
        } else if days <= 30 {
            if weeks <= 1 {
                if days == 1 {
                    "yesterday".to_string()
                } else {
                    format!("{} days ago", days)
                }
            } else {
                format!("{} weeks ago", weeks)
            }
        } else {
            local.date_naive().format("%b %-d, %Y").to_string()
        };

        Ok(text)
    }
}

/// Format with the default thresholds against the current wall clock.
pub fn relative_time(timestamp: Option<&DateTime<Utc>>) -> Result<String> {
    RelativeTime::default().format_now(timestamp)
}
