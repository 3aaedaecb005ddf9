//! Gradient module - sky color stops for a 48-hour strip
//!
//! Two generators share one output shape. Without coordinates the sky follows
//! a fixed hour-of-day table; with coordinates it follows the sun's altitude,
//! using separate rising and setting palettes so dawn passes through red and
//! indigo instead of blending orange straight into blue.

use std::collections::HashMap;

use chrono::{DateTime, Days, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use shared::{local_fractional_hour, Coordinates, SolarProvider};

use crate::cities::{City, CityId};
use crate::color::{lerp, palette, smoothstep, Rgb};
use crate::timeline::{window_start, HOUR_MS, VISIBLE_HOURS};

/// Intervals sampled across the window in fixed-table mode
pub const FIXED_INTERVALS: usize = 96;

/// Intervals sampled across the window in altitude mode
pub const SOLAR_INTERVALS: usize = 384;

/// Hour-of-day anchors for cities without coordinates
const FIXED_STOPS: &[(f64, Rgb)] = &[
    (0.0, palette::DEEP_NIGHT),
    (4.5, palette::DEEP_NIGHT),
    (6.0, palette::DAWN_ORANGE),
    (7.5, palette::DAWN_GOLD),
    (10.0, palette::SKY_BLUE),
    (15.0, palette::SKY_BLUE),
    (17.0, palette::AFTERNOON_GOLD),
    (18.5, palette::DUSK_ORANGE),
    (19.75, palette::DUSK_PURPLE),
    (21.0, palette::DEEP_NIGHT),
    (24.0, palette::DEEP_NIGHT),
];

/// Which half of the solar day a sample falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunPhase {
    Morning,
    Afternoon,
}

/// One color stop, positioned in percent of the strip width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Rgb,
    pub percent: f64,
}

/// Left-to-right gradient spanning a whole strip
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkyGradient {
    pub stops: Vec<GradientStop>,
}

/// Fixed-table sky color for a wall-clock hour (any real value, taken mod 24)
pub fn color_for_hour(hour: f64) -> Rgb {
    let hour = hour.rem_euclid(24.0);
    for pair in FIXED_STOPS.windows(2) {
        let (h0, c0) = pair[0];
        let (h1, c1) = pair[1];
        if hour <= h1 {
            return lerp(c0, c1, (hour - h0) / (h1 - h0));
        }
    }
    palette::DEEP_NIGHT
}

/// Sky color while the sun is setting
pub fn afternoon_color(altitude: f64) -> Rgb {
    if altitude > 20.0 {
        palette::SKY_BLUE
    } else if altitude > 6.0 {
        let t = smoothstep((20.0 - altitude) / 14.0);
        lerp(palette::SKY_BLUE, palette::AFTERNOON_GOLD, t)
    } else if altitude > 0.0 {
        lerp(palette::AFTERNOON_GOLD, palette::DUSK_ORANGE, (6.0 - altitude) / 6.0)
    } else if altitude > -4.0 {
        lerp(palette::DUSK_ORANGE, palette::DUSK_PURPLE, -altitude / 4.0)
    } else if altitude > -8.0 {
        lerp(palette::DUSK_PURPLE, palette::DEEP_NIGHT, (-4.0 - altitude) / 4.0)
    } else {
        palette::DEEP_NIGHT
    }
}

/// Sky color while the sun is rising
pub fn morning_color(altitude: f64) -> Rgb {
    if altitude > 20.0 {
        palette::SKY_BLUE
    } else if altitude > 6.0 {
        lerp(palette::DAWN_GOLD, palette::SKY_BLUE, (altitude - 6.0) / 14.0)
    } else if altitude > 0.0 {
        lerp(palette::DAWN_ORANGE, palette::DAWN_GOLD, altitude / 6.0)
    } else if altitude > -2.0 {
        lerp(palette::DAWN_RED, palette::DAWN_ORANGE, (altitude + 2.0) / 2.0)
    } else if altitude > -6.0 {
        lerp(palette::TWILIGHT_INDIGO, palette::DAWN_RED, (altitude + 6.0) / 4.0)
    } else if altitude > -10.0 {
        lerp(palette::DEEP_NIGHT, palette::TWILIGHT_INDIGO, (altitude + 10.0) / 4.0)
    } else {
        palette::DEEP_NIGHT
    }
}

pub fn sky_color(altitude: f64, phase: SunPhase) -> Rgb {
    match phase {
        SunPhase::Morning => morning_color(altitude),
        SunPhase::Afternoon => afternoon_color(altitude),
    }
}

/// Gradient for a strip anchored at `base`, picking the mode from coordinate availability
pub fn sky_gradient<P: SolarProvider>(
    base: DateTime<Utc>,
    tz: Tz,
    coordinates: Option<Coordinates>,
    provider: &P,
) -> SkyGradient {
    match coordinates {
        Some(at) => solar_gradient(base, tz, at, provider),
        None => fixed_gradient(base, tz),
    }
}

/// Fixed-table gradient keyed by the city's wall-clock hour
pub fn fixed_gradient(base: DateTime<Utc>, tz: Tz) -> SkyGradient {
    let start_hour = local_fractional_hour(tz, window_start(base));
    let step = VISIBLE_HOURS / FIXED_INTERVALS as f64;

    let stops = (0..=FIXED_INTERVALS)
        .map(|i| GradientStop {
            color: color_for_hour(start_hour + i as f64 * step),
            percent: percent_at(i, FIXED_INTERVALS),
        })
        .collect();

    SkyGradient { stops }
}

/// Altitude-driven gradient; samples with an undefined altitude are dropped
pub fn solar_gradient<P: SolarProvider>(
    base: DateTime<Utc>,
    tz: Tz,
    at: Coordinates,
    provider: &P,
) -> SkyGradient {
    let start = window_start(base);
    let noons = covered_solar_noons(start, tz, at, provider);
    let window_ms = (VISIBLE_HOURS * HOUR_MS as f64) as i64;

    let stops = (0..=SOLAR_INTERVALS)
        .filter_map(|i| {
            let instant = start + Duration::milliseconds(window_ms * i as i64 / SOLAR_INTERVALS as i64);
            let altitude = provider.altitude_degrees(instant, at);
            if altitude.is_nan() {
                return None;
            }
            Some(GradientStop {
                color: sky_color(altitude, phase_at(instant, &noons)),
                percent: percent_at(i, SOLAR_INTERVALS),
            })
        })
        .collect();

    SkyGradient { stops }
}

/// Morning unless the instant is past the nearest solar noon
pub fn phase_at(instant: DateTime<Utc>, noons: &[DateTime<Utc>]) -> SunPhase {
    let nearest = noons
        .iter()
        .min_by_key(|noon| (instant - **noon).num_milliseconds().abs());
    match nearest {
        Some(noon) if instant > *noon => SunPhase::Afternoon,
        _ => SunPhase::Morning,
    }
}

/// Solar noons for the local days from one before to two after the window start
pub fn covered_solar_noons<P: SolarProvider>(
    start: DateTime<Utc>,
    tz: Tz,
    at: Coordinates,
    provider: &P,
) -> Vec<DateTime<Utc>> {
    let start_date = start.with_timezone(&tz).date_naive();

    (-1i64..=2)
        .filter_map(|offset| {
            let date = if offset < 0 {
                start_date.checked_sub_days(Days::new(offset.unsigned_abs()))
            } else {
                start_date.checked_add_days(Days::new(offset as u64))
            }?;
            let midday = tz.from_local_datetime(&date.and_hms_opt(12, 0, 0)?).earliest()?;
            provider.solar_times(midday.with_timezone(&Utc), at).solar_noon
        })
        .collect()
}

fn percent_at(index: usize, intervals: usize) -> f64 {
    (index as f64 / intervals as f64 * 10_000.0).round() / 100.0
}

/// Per-city gradients valid for a single gradient base
#[derive(Debug, Default)]
pub struct GradientCache {
    base: Option<DateTime<Utc>>,
    entries: HashMap<CityId, SkyGradient>,
}

impl GradientCache {
    /// Gradient for `city`, regenerating everything when the base has moved
    pub fn gradient_for<P: SolarProvider>(
        &mut self,
        city: &City,
        base: DateTime<Utc>,
        provider: &P,
    ) -> &SkyGradient {
        if self.base != Some(base) {
            tracing::debug!(%base, "gradient base moved; regenerating strips");
            self.entries.clear();
            self.base = Some(base);
        }
        self.entries
            .entry(city.id())
            .or_insert_with(|| sky_gradient(base, city.timezone, city.coordinates, provider))
    }

    /// Previously generated gradient, if still valid for `base`
    pub fn get(&self, id: CityId, base: DateTime<Utc>) -> Option<&SkyGradient> {
        if self.base == Some(base) {
            self.entries.get(&id)
        } else {
            None
        }
    }

    /// Drop the gradient for a city that left the list
    pub fn forget(&mut self, id: CityId) {
        self.entries.remove(&id);
    }
}
