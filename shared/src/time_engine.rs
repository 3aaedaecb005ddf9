//! Time Engine - timezone resolution and clock-face formatting
//!
//! Provides timezone parsing, local readings for a city at an instant, and
//! the two supported clock styles.

use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Zone used when nothing better can be determined
pub const FALLBACK_TZ: Tz = chrono_tz::UTC;

/// Clock style used for every time label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockFormat {
    /// 1-12 with AM/PM
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    /// 00-23
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl ClockFormat {
    pub fn toggled(self) -> Self {
        match self {
            ClockFormat::TwelveHour => ClockFormat::TwentyFourHour,
            ClockFormat::TwentyFourHour => ClockFormat::TwelveHour,
        }
    }
}

/// AM/PM indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    AM,
    PM,
}

impl std::fmt::Display for Meridiem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Meridiem::AM => write!(f, "AM"),
            Meridiem::PM => write!(f, "PM"),
        }
    }
}

/// Error returned when a zone identifier is not in the tz database
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown timezone: {0}")]
pub struct TimezoneError(pub String);

/// Wall-clock reading of an instant in one zone
#[derive(Debug, Clone)]
pub struct LocalReading {
    /// Hour in 24-hour format (0-23)
    pub hour24: u32,
    /// Minute (0-59)
    pub minute: u32,
    /// Month (1-12)
    pub month: u32,
    /// Day of month (1-31)
    pub day: u32,
    /// UTC offset in minutes (e.g., -480 for UTC-8)
    pub utc_offset_minutes: i32,
}

impl LocalReading {
    /// Read the wall clock of `tz` at `instant`
    pub fn at(tz: Tz, instant: DateTime<Utc>) -> Self {
        let local = instant.with_timezone(&tz);
        Self {
            hour24: local.hour(),
            minute: local.minute(),
            month: local.month(),
            day: local.day(),
            utc_offset_minutes: local.offset().fix().local_minus_utc() / 60,
        }
    }

    /// Format the time in the requested clock style
    pub fn format_time(&self, format: ClockFormat) -> String {
        match format {
            ClockFormat::TwelveHour => {
                let (hour12, meridiem) = to_twelve_hour(self.hour24);
                format!("{}:{:02} {}", hour12, self.minute, meridiem)
            }
            ClockFormat::TwentyFourHour => format!("{:02}:{:02}", self.hour24, self.minute),
        }
    }

    /// Format the date as "Mar 14"
    pub fn format_month_day(&self) -> String {
        format!("{} {}", month_abbrev(self.month), self.day)
    }

    /// Format the UTC offset as "UTC±hh:mm"
    pub fn format_utc_offset(&self) -> String {
        let sign = if self.utc_offset_minutes >= 0 { "+" } else { "-" };
        let abs_minutes = self.utc_offset_minutes.abs();
        format!("UTC{}{:02}:{:02}", sign, abs_minutes / 60, abs_minutes % 60)
    }
}

fn to_twelve_hour(hour24: u32) -> (u32, Meridiem) {
    let hour12 = match hour24 {
        0 => 12,
        1..=12 => hour24,
        _ => hour24 - 12,
    };
    let meridiem = if hour24 < 12 { Meridiem::AM } else { Meridiem::PM };
    (hour12, meridiem)
}

fn month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "???",
    }
}

/// Label for an hour tick: "3 PM" or "15:00"
pub fn format_hour_label<T: TimeZone>(local: &DateTime<T>, format: ClockFormat) -> String {
    match format {
        ClockFormat::TwelveHour => {
            let (hour12, meridiem) = to_twelve_hour(local.hour());
            format!("{} {}", hour12, meridiem)
        }
        ClockFormat::TwentyFourHour => format!("{:02}:00", local.hour()),
    }
}

/// Short date label such as "Mar 14"
pub fn format_month_day<T: TimeZone>(local: &DateTime<T>) -> String {
    format!("{} {}", month_abbrev(local.month()), local.day())
}

/// Wall-clock hour of `instant` in `tz` as a fraction (e.g. 13.5 for 13:30)
pub fn local_fractional_hour(tz: Tz, instant: DateTime<Utc>) -> f64 {
    let local = instant.with_timezone(&tz);
    local.hour() as f64
        + local.minute() as f64 / 60.0
        + (local.second() as f64 + local.nanosecond() as f64 / 1e9) / 3600.0
}

/// Parse a timezone string into a Tz
pub fn parse_timezone(tz_str: &str) -> Result<Tz, TimezoneError> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| TimezoneError(tz_str.to_string()))
}

/// Best-effort guess of the runtime's local timezone
pub fn system_timezone() -> Option<Tz> {
    if let Some(tz) = std::env::var("TZ").ok().as_deref().and_then(zone_from_name) {
        return Some(tz);
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => zone_from_name(&name),
        Err(e) => {
            tracing::warn!(error = %e, "could not determine the system timezone");
            None
        }
    }
}

/// Zone id from a `TZ`-style value: `Asia/Tokyo`, `:Asia/Tokyo` or a zoneinfo path
fn zone_from_name(name: &str) -> Option<Tz> {
    let name = name.trim().trim_start_matches(':');
    let id = name
        .split_once("zoneinfo/")
        .map_or(name, |(_, id)| id);
    parse_timezone(id).ok()
}

/// City name implied by a zone id: "America/New_York" becomes "New York"
pub fn default_city_name(tz: Tz) -> String {
    tz.name()
        .rsplit('/')
        .next()
        .unwrap_or_else(|| tz.name())
        .replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_local_reading_formats() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let reading = LocalReading::at(tz, instant("2024-03-14T06:05:00Z"));
        assert_eq!(reading.format_time(ClockFormat::TwelveHour), "3:05 PM");
        assert_eq!(reading.format_time(ClockFormat::TwentyFourHour), "15:05");
        assert_eq!(reading.format_month_day(), "Mar 14");
        assert_eq!(reading.format_utc_offset(), "UTC+09:00");
    }

    #[test]
    fn test_negative_offset() {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let reading = LocalReading::at(tz, instant("2024-01-10T20:00:00Z"));
        assert_eq!(reading.format_utc_offset(), "UTC-08:00");
    }

    #[test]
    fn test_hour_labels() {
        let midnight = instant("2024-03-14T00:00:00Z");
        assert_eq!(format_hour_label(&midnight, ClockFormat::TwelveHour), "12 AM");
        assert_eq!(format_hour_label(&midnight, ClockFormat::TwentyFourHour), "00:00");
        let noon = instant("2024-03-14T12:00:00Z");
        assert_eq!(format_hour_label(&noon, ClockFormat::TwelveHour), "12 PM");
    }

    #[test]
    fn test_fractional_hour() {
        let tz: Tz = "Asia/Kolkata".parse().unwrap();
        let hour = local_fractional_hour(tz, instant("2024-03-14T00:00:00Z"));
        assert!((hour - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Europe/London").is_ok());
        assert_eq!(
            parse_timezone("Mars/Olympus"),
            Err(TimezoneError("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn test_zone_from_name() {
        assert_eq!(zone_from_name("Asia/Tokyo"), Some(chrono_tz::Asia::Tokyo));
        assert_eq!(zone_from_name(":Europe/Paris"), Some(chrono_tz::Europe::Paris));
        assert_eq!(
            zone_from_name("/usr/share/zoneinfo/America/New_York"),
            Some(chrono_tz::America::New_York)
        );
        // Numeric offsets are not zone ids
        assert_eq!(zone_from_name("+09:00"), None);
        assert_eq!(zone_from_name(""), None);
    }

    #[test]
    fn test_default_city_name() {
        assert_eq!(default_city_name(chrono_tz::America::New_York), "New York");
        assert_eq!(default_city_name(chrono_tz::UTC), "UTC");
    }
}
