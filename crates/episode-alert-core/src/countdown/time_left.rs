use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::pad2;

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = MS_PER_SECOND * 60.0;
const MS_PER_HOUR: f64 = MS_PER_MINUTE * 60.0;
const MS_PER_DAY: f64 = MS_PER_HOUR * 24.0;

/// Remaining time until an air date.
///
/// Each component is floored independently: `hours` is the hour-of-day part
/// (`floor((diff / 1h) mod 24)`), not the total number of hours. Once the
/// target has passed every component goes negative and `is_aired` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub is_aired: bool,
}

impl TimeLeft {
    /// Compact form, e.g. `2d 04:05:06`, or `05:06:07` when under a day.
    pub fn compact(&self) -> String {
        if self.is_aired {
            return "Aired".to_string();
        }
        let prefix = if self.days > 0 {
            format!("{}d ", self.days)
        } else {
            String::new()
        };
        format!(
            "{}{}:{}:{}",
            prefix,
            pad2(self.hours),
            pad2(self.minutes),
            pad2(self.seconds)
        )
    }

    /// Long form, e.g. `2 days 04:05:06`.
    pub fn long_display(&self) -> String {
        if self.is_aired {
            return "Aired".to_string();
        }
        let unit = if self.days == 1 { "day" } else { "days" };
        format!(
            "{} {} {}:{}:{}",
            self.days,
            unit,
            pad2(self.hours),
            pad2(self.minutes),
            pad2(self.seconds)
        )
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// Parse an air date as published by the metadata API.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps and
/// bare `YYYY-MM-DD` dates. Anything without an offset is read as UTC.
pub fn parse_air_date(air_date: &str) -> Option<DateTime<Utc>> {
    let air_date = air_date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(air_date) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(air_date, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(air_date, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Breakdown of `target - now`.
pub fn time_left_between(target: DateTime<Utc>, now: DateTime<Utc>) -> TimeLeft {
    let difference = (target - now).num_milliseconds() as f64;

    // `%` on f64 keeps the sign of the dividend, so past dates floor to
    // negative components rather than wrapping.
    TimeLeft {
        days: (difference / MS_PER_DAY).floor() as i64,
        hours: ((difference / MS_PER_HOUR) % 24.0).floor() as i64,
        minutes: ((difference / MS_PER_MINUTE) % 60.0).floor() as i64,
        seconds: ((difference / MS_PER_SECOND) % 60.0).floor() as i64,
        is_aired: difference <= 0.0,
    }
}

/// Time left until `air_date`, or `None` when the date cannot be parsed.
pub fn calculate_time_left(air_date: &str, now: DateTime<Utc>) -> Option<TimeLeft> {
    parse_air_date(air_date).map(|target| time_left_between(target, now))
}
