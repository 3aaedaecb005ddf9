//! Solar position - sun altitude and daily sun times
//!
//! Backed by the NREL SPA implementation in `solar_positioning`.
//! Polar days and nights keep their transit but have no sunrise or sunset.

use chrono::{DateTime, Datelike, Duration, Utc};
use solar_positioning::{spa, time::DeltaT, Horizon, RefractionCorrection, SunriseResult};

/// Apparent altitude of the sun's upper limb at sunrise/sunset (degrees)
pub const SUNRISE_ALTITUDE: f64 = -0.833;

/// ΔT used when no estimate is available for a date
const FALLBACK_DELTA_T: f64 = 69.0;

/// Standard atmosphere for refraction
const PRESSURE_HPA: f64 = 1013.25;
const TEMPERATURE_C: f64 = 15.0;

/// Observer position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Sun events for one day; any may be unavailable
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolarTimes {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub solar_noon: Option<DateTime<Utc>>,
}

impl From<SunriseResult<DateTime<Utc>>> for SolarTimes {
    fn from(result: SunriseResult<DateTime<Utc>>) -> Self {
        match result {
            SunriseResult::RegularDay {
                sunrise,
                transit,
                sunset,
            } => SolarTimes {
                sunrise: Some(sunrise),
                sunset: Some(sunset),
                solar_noon: Some(transit),
            },
            SunriseResult::AllDay { transit } | SunriseResult::AllNight { transit } => {
                SolarTimes {
                    sunrise: None,
                    sunset: None,
                    solar_noon: Some(transit),
                }
            }
        }
    }
}

/// Source of solar geometry
pub trait SolarProvider {
    /// Altitude of the sun above the horizon in degrees (NaN if undefined)
    fn altitude_degrees(&self, instant: DateTime<Utc>, at: Coordinates) -> f64;

    /// Sunrise, sunset and solar noon for the day containing `date_at_noon`
    fn solar_times(&self, date_at_noon: DateTime<Utc>, at: Coordinates) -> SolarTimes;
}

/// SPA-backed provider
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaSun;

impl SpaSun {
    fn sun_times_for_utc_day(&self, day: DateTime<Utc>, at: Coordinates) -> Option<SolarTimes> {
        match spa::sunrise_sunset_for_horizon(
            day,
            at.latitude,
            at.longitude,
            delta_t(day),
            Horizon::SunriseSunset,
        ) {
            Ok(result) => Some(result.into()),
            Err(e) => {
                tracing::debug!(?at, error = ?e, "sun times unavailable");
                None
            }
        }
    }
}

impl SolarProvider for SpaSun {
    fn altitude_degrees(&self, instant: DateTime<Utc>, at: Coordinates) -> f64 {
        spa::solar_position(
            instant,
            at.latitude,
            at.longitude,
            0.0,
            delta_t(instant),
            RefractionCorrection::new(PRESSURE_HPA, TEMPERATURE_C).ok(),
        )
        .map(|position| position.elevation_angle())
        .unwrap_or(f64::NAN)
    }

    fn solar_times(&self, date_at_noon: DateTime<Utc>, at: Coordinates) -> SolarTimes {
        // SPA works per UTC day; keep the transit closest to the requested midday
        let Some(times) = self.sun_times_for_utc_day(date_at_noon, at) else {
            return SolarTimes::default();
        };
        let shift = match times.solar_noon {
            Some(noon) if noon - date_at_noon > Duration::hours(12) => Duration::days(-1),
            Some(noon) if date_at_noon - noon > Duration::hours(12) => Duration::days(1),
            _ => return times,
        };
        self.sun_times_for_utc_day(date_at_noon + shift, at)
            .unwrap_or(times)
    }
}

fn delta_t(instant: DateTime<Utc>) -> f64 {
    DeltaT::estimate_from_date(instant.year(), instant.month()).unwrap_or(FALLBACK_DELTA_T)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn minutes_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
        (a - b).num_minutes().abs()
    }

    #[test]
    fn test_equinox_noon_on_equator_is_overhead() {
        let alt = SpaSun.altitude_degrees(instant("2024-03-20T12:07:00Z"), Coordinates::new(0.0, 0.0));
        assert!(alt > 85.0, "altitude was {alt}");
    }

    #[test]
    fn test_equinox_midnight_on_equator_is_below_horizon() {
        let alt = SpaSun.altitude_degrees(instant("2024-03-20T00:07:00Z"), Coordinates::new(0.0, 0.0));
        assert!(alt < -85.0, "altitude was {alt}");
    }

    #[test]
    fn test_invalid_coordinates_give_nan() {
        let alt = SpaSun.altitude_degrees(instant("2024-03-20T12:00:00Z"), Coordinates::new(95.0, 0.0));
        assert!(alt.is_nan());
        let times = SpaSun.solar_times(instant("2024-03-20T12:00:00Z"), Coordinates::new(95.0, 0.0));
        assert_eq!(times, SolarTimes::default());
    }

    #[test]
    fn test_equator_sun_times() {
        let times = SpaSun.solar_times(instant("2024-03-20T12:00:00Z"), Coordinates::new(0.0, 0.0));

        let noon = times.solar_noon.unwrap();
        assert!(minutes_between(noon, instant("2024-03-20T12:07:00Z")) < 10);

        let sunrise = times.sunrise.unwrap();
        let sunset = times.sunset.unwrap();
        assert!(minutes_between(sunrise, instant("2024-03-20T06:04:00Z")) < 15);
        assert!(minutes_between(sunset, instant("2024-03-20T18:10:00Z")) < 15);
    }

    #[test]
    fn test_noon_follows_requested_midday_across_utc_dates() {
        // Auckland local noon on Mar 14 (NZDT) is 23:00 UTC on Mar 13
        let auckland = Coordinates::new(-36.8485, 174.7633);
        let midday = instant("2024-03-13T23:00:00Z");
        let noon = SpaSun.solar_times(midday, auckland).solar_noon.unwrap();
        assert!(minutes_between(noon, midday) < 120, "noon was {noon}");
    }

    #[test]
    fn test_altitude_at_sunrise_is_near_horizon() {
        let london = Coordinates::new(51.5074, -0.1278);
        let times = SpaSun.solar_times(instant("2024-06-21T12:00:00Z"), london);
        let alt = SpaSun.altitude_degrees(times.sunrise.unwrap(), london);
        assert!((alt - SUNRISE_ALTITUDE).abs() < 1.0, "altitude was {alt}");
    }

    #[test]
    fn test_polar_night_has_no_sunrise() {
        let times = SpaSun.solar_times(instant("2024-12-21T12:00:00Z"), Coordinates::new(80.0, 15.0));
        assert!(times.sunrise.is_none());
        assert!(times.sunset.is_none());
        assert!(times.solar_noon.is_some());
    }
}
