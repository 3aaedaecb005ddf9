//! Persistence module - saved preferences, startup resolution and timers
//!
//! Preferences are written through `shared::config` a short while after the
//! last change. At startup, shared tokens win over saved cities, and a single
//! city in the local zone is used when neither is usable.

use std::time::{Duration, Instant};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::ClockFormat;

use crate::cities::{CityList, CityRecord};
use crate::reorder::DisplayMode;
use crate::tokens;

/// Config file stem under the platform config dir
pub const APP_NAME: &str = "sky_strips";

/// Quiet period before a change is written
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Refresh cadence of the live "now" instant
pub const NOW_REFRESH: Duration = Duration::from_secs(30);

/// Everything written to disk
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub clock_format: ClockFormat,
    // Array of tables; must stay last for TOML output
    #[serde(default)]
    pub cities: Vec<CityRecord>,
}

/// Where the initial city list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupSource {
    Tokens,
    Saved,
    LocalDefault,
}

#[derive(Debug, Clone)]
pub struct Startup {
    pub cities: CityList,
    pub display_mode: DisplayMode,
    pub clock_format: ClockFormat,
    pub source: StartupSource,
}

/// Pick the initial state; never fails
pub fn resolve_startup(
    shared_tokens: Option<&str>,
    saved: Option<Preferences>,
    local_tz: Tz,
) -> Startup {
    let saved = saved.unwrap_or_default();

    let from_tokens = shared_tokens.and_then(|input| match tokens::decode(input) {
        Ok(records) => CityList::from_records(&records),
        Err(e) => {
            tracing::warn!("ignoring shared cities: {}", e);
            None
        }
    });

    let (cities, source) = match from_tokens {
        Some(cities) => (cities, StartupSource::Tokens),
        None => match CityList::from_records(&saved.cities) {
            Some(cities) => (cities, StartupSource::Saved),
            None => (CityList::with_default(local_tz), StartupSource::LocalDefault),
        },
    };

    Startup {
        cities,
        display_mode: saved.display_mode,
        clock_format: saved.clock_format,
        source,
    }
}

/// Read saved preferences, treating any failure as "nothing saved"
pub fn load_preferences() -> Option<Preferences> {
    match shared::load_config::<Preferences>(APP_NAME) {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!("discarding saved preferences: {}", e);
            None
        }
    }
}

pub fn save_preferences(prefs: &Preferences) {
    match shared::save_config(APP_NAME, prefs) {
        Ok(()) => tracing::info!(cities = prefs.cities.len(), "saved preferences"),
        Err(e) => tracing::warn!("failed to save preferences: {}", e),
    }
}

/// Trailing-edge debounce: fires once, `delay` after the last `schedule`
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)arm; any earlier pending deadline is replaced
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once when the deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Fixed-cadence tick for the live "now" instant
#[derive(Debug, Clone)]
pub struct NowTicker {
    interval: Duration,
    last: Instant,
}

impl NowTicker {
    pub fn new(interval: Duration, started: Instant) -> Self {
        Self {
            interval,
            last: started,
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::tests::record;

    fn names(list: &CityList) -> Vec<String> {
        list.iter().map(|c| c.name.clone()).collect()
    }

    fn saved() -> Preferences {
        Preferences {
            display_mode: DisplayMode::Compact,
            clock_format: ClockFormat::TwentyFourHour,
            cities: vec![record("Osaka", "Asia/Tokyo"), record("Lagos", "Africa/Lagos")],
        }
    }

    #[test]
    fn test_tokens_win_over_saved_cities() {
        let startup = resolve_startup(Some("Europe/Paris"), Some(saved()), chrono_tz::UTC);
        assert_eq!(startup.source, StartupSource::Tokens);
        assert_eq!(names(&startup.cities), vec!["Paris"]);
        // Preferences other than cities still come from disk
        assert_eq!(startup.display_mode, DisplayMode::Compact);
    }

    #[test]
    fn test_bad_tokens_fall_back_to_saved() {
        let startup = resolve_startup(Some("Nowhere@Mars/Base"), Some(saved()), chrono_tz::UTC);
        assert_eq!(startup.source, StartupSource::Saved);
        assert_eq!(names(&startup.cities), vec!["Osaka", "Lagos"]);
    }

    #[test]
    fn test_nothing_usable_gives_local_default() {
        let mut broken = saved();
        broken.cities = vec![record("Nowhere", "Mars/Base")];
        let startup = resolve_startup(None, Some(broken), chrono_tz::Asia::Tokyo);
        assert_eq!(startup.source, StartupSource::LocalDefault);
        assert_eq!(names(&startup.cities), vec!["Tokyo"]);

        let startup = resolve_startup(None, None, chrono_tz::Asia::Tokyo);
        assert_eq!(startup.clock_format, ClockFormat::TwelveHour);
        assert_eq!(startup.display_mode, DisplayMode::Comfortable);
    }

    #[test]
    fn test_preferences_toml_shape() {
        let text = shared::config::render_config(&saved()).unwrap();
        assert!(text.contains("display_mode = \"compact\""));
        assert!(text.contains("clock_format = \"24h\""));
        assert!(text.contains("[[cities]]"));

        let parsed: Preferences = shared::config::parse_config(&text).unwrap();
        assert_eq!(parsed, saved());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Preferences = shared::config::parse_config("clock_format = \"24h\"").unwrap();
        assert_eq!(parsed.clock_format, ClockFormat::TwentyFourHour);
        assert_eq!(parsed.display_mode, DisplayMode::Comfortable);
        assert!(parsed.cities.is_empty());
    }

    #[test]
    fn test_debounce_fires_after_last_change() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SAVE_DEBOUNCE);
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));

        assert!(!debouncer.poll(start + Duration::from_millis(350)));
        assert!(debouncer.is_pending());
        assert!(debouncer.poll(start + Duration::from_millis(500)));
        assert!(!debouncer.poll(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_now_ticker_cadence() {
        let start = Instant::now();
        let mut ticker = NowTicker::new(NOW_REFRESH, start);
        assert!(!ticker.poll(start + Duration::from_secs(29)));
        assert!(ticker.poll(start + Duration::from_secs(30)));
        assert!(!ticker.poll(start + Duration::from_secs(45)));
        assert!(ticker.poll(start + Duration::from_secs(61)));
    }
}
