//! Markers module - hour labels, date boundaries, sun events and the now line
//!
//! Every marker is positioned in strip coordinates (0 = left edge of the
//! 48-hour window around the gradient base). The renderer applies the focus
//! translation afterwards.

use chrono::{DateTime, Days, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use shared::{format_hour_label, format_month_day, ClockFormat, Coordinates, LocalReading, SolarProvider};

use crate::timeline::{window_end, window_start, FocusTracker, TimelineScale};

/// Spacing between hour labels, in local hours
pub const HOUR_LABEL_STEP: u32 = 3;

/// Distance from the viewport center (in hours) within which a label is emphasized
pub const EMPHASIS_HOURS: f64 = 1.5;

/// Opacity of labels away from the viewport center
pub const DIMMED_OPACITY: f32 = 0.35;

/// Extra pixels either side of the strip where sun markers are still kept
pub const SUN_MARKER_OVERSCAN: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HourLabel {
    pub x: f64,
    pub text: String,
    pub emphasized: bool,
}

/// Font weight of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelWeight {
    Regular,
    Bold,
}

impl HourLabel {
    pub fn weight(&self) -> LabelWeight {
        if self.emphasized {
            LabelWeight::Bold
        } else {
            LabelWeight::Regular
        }
    }

    pub fn opacity(&self) -> f32 {
        if self.emphasized {
            1.0
        } else {
            DIMMED_OPACITY
        }
    }
}

/// Local midnight boundary
#[derive(Debug, Clone, PartialEq)]
pub struct DateMarker {
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunEvent {
    Sunrise,
    Sunset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunMarker {
    pub x: f64,
    pub event: SunEvent,
    /// Local time of the event in the chosen clock style
    pub time_text: String,
}

/// Hour labels on every third local hour of the window
pub fn hour_labels(
    tz: Tz,
    tracker: &FocusTracker,
    scale: &TimelineScale,
    format: ClockFormat,
) -> Vec<HourLabel> {
    let base = tracker.base();
    let start = window_start(base);
    let end = window_end(base);
    let center = tracker.center_strip_x(scale);
    let emphasis_px = scale.hours_to_pixels(EMPHASIS_HOURS);

    let mut labels = Vec::new();
    let mut instant = first_full_local_hour(start, tz);
    while instant <= end {
        let local = instant.with_timezone(&tz);
        if local.minute() == 0 && local.hour() % HOUR_LABEL_STEP == 0 {
            let x = scale.strip_x(instant, base);
            labels.push(HourLabel {
                x,
                text: format_hour_label(&local, format),
                emphasized: (x - center).abs() <= emphasis_px,
            });
        }
        instant += Duration::hours(1);
    }
    labels
}

/// First instant at or after `start` where the local clock reads a whole hour
fn first_full_local_hour(start: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = start.with_timezone(&tz);
    let into_hour = Duration::minutes(local.minute() as i64)
        + Duration::seconds(local.second() as i64)
        + Duration::nanoseconds(local.nanosecond() as i64);
    if into_hour == Duration::zero() {
        start
    } else {
        start - into_hour + Duration::hours(1)
    }
}

/// Local midnights inside the window
///
/// Days whose midnight falls in a DST gap have no marker.
pub fn date_markers(tz: Tz, base: DateTime<Utc>, scale: &TimelineScale) -> Vec<DateMarker> {
    let start = window_start(base);
    let end = window_end(base);
    let first_date = start.with_timezone(&tz).date_naive();
    let last_date = end.with_timezone(&tz).date_naive();

    first_date
        .iter_days()
        .take_while(|date| *date <= last_date)
        .filter_map(|date| {
            let midnight = tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()?;
            let instant = midnight.with_timezone(&Utc);
            (instant >= start && instant <= end).then(|| DateMarker {
                x: scale.strip_x(instant, base),
                label: format_month_day(&midnight),
            })
        })
        .collect()
}

/// Sunrise and sunset markers for the local days around the gradient base
///
/// Cities without coordinates get none.
pub fn sun_markers<P: SolarProvider>(
    tz: Tz,
    coordinates: Option<Coordinates>,
    base: DateTime<Utc>,
    scale: &TimelineScale,
    format: ClockFormat,
    provider: &P,
) -> Vec<SunMarker> {
    let Some(at) = coordinates else {
        return Vec::new();
    };
    let base_date = base.with_timezone(&tz).date_naive();

    let mut markers = Vec::new();
    for offset in -1i64..=1 {
        let Some(midday) = local_midday(tz, base_date, offset) else {
            continue;
        };
        let times = provider.solar_times(midday, at);
        let events = [(SunEvent::Sunrise, times.sunrise), (SunEvent::Sunset, times.sunset)];
        for (event, instant) in events {
            let Some(instant) = instant else {
                continue;
            };
            let x = scale.strip_x(instant, base);
            if scale.contains(x, SUN_MARKER_OVERSCAN) {
                markers.push(SunMarker {
                    x,
                    event,
                    time_text: LocalReading::at(tz, instant).format_time(format),
                });
            }
        }
    }
    markers.sort_by(|a, b| a.x.total_cmp(&b.x));
    markers
}

fn local_midday(tz: Tz, date: NaiveDate, offset_days: i64) -> Option<DateTime<Utc>> {
    let date = if offset_days < 0 {
        date.checked_sub_days(Days::new(offset_days.unsigned_abs()))?
    } else {
        date.checked_add_days(Days::new(offset_days as u64))?
    };
    let midday = tz.from_local_datetime(&date.and_hms_opt(12, 0, 0)?).earliest()?;
    Some(midday.with_timezone(&Utc))
}

/// Strip position of the live instant, if it lies on the strip
pub fn now_marker(now: DateTime<Utc>, base: DateTime<Utc>, scale: &TimelineScale) -> Option<f64> {
    let x = scale.strip_x(now, base);
    scale.contains(x, 0.0).then_some(x)
}
