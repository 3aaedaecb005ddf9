//! Shared library for the sky strips workspace
//!
//! Timezone handling, clock formatting, the city catalog, solar geometry and
//! preference persistence.

pub mod catalog;
pub mod config;
pub mod solar;
pub mod time_engine;

pub use catalog::{display_name, lookup, search, CatalogEntry};
pub use config::{load_config, save_config, ConfigError};
pub use solar::{Coordinates, SolarProvider, SolarTimes, SpaSun};
pub use time_engine::{
    default_city_name, format_hour_label, format_month_day, local_fractional_hour,
    parse_timezone, system_timezone, ClockFormat, LocalReading, TimezoneError, FALLBACK_TZ,
};
