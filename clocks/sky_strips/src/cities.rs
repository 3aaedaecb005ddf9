//! Cities module - the ordered list of tracked locations
//!
//! The list is never empty; ids are stable across reorders.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::{parse_timezone, CatalogEntry, Coordinates, TimezoneError};

/// Opaque city identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(u64);

/// City as exchanged with persistence, tokens and the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl CityRecord {
    /// Record for a bare zone, named and located from the catalog when possible
    pub fn for_timezone(tz: Tz) -> Self {
        match shared::lookup(tz, None) {
            Some(entry) => Self::from_catalog(&entry),
            None => Self {
                name: shared::default_city_name(tz),
                timezone: tz.name().to_string(),
                latitude: None,
                longitude: None,
            },
        }
    }

    pub fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.city.clone(),
            timezone: entry.timezone.name().to_string(),
            latitude: entry.latitude,
            longitude: entry.longitude,
        }
    }

    fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Coordinates::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// A tracked location
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    id: CityId,
    pub name: String,
    pub timezone: Tz,
    pub coordinates: Option<Coordinates>,
}

impl City {
    pub fn id(&self) -> CityId {
        self.id
    }

    pub fn to_record(&self) -> CityRecord {
        CityRecord {
            name: self.name.clone(),
            timezone: self.timezone.name().to_string(),
            latitude: self.coordinates.map(|c| c.latitude),
            longitude: self.coordinates.map(|c| c.longitude),
        }
    }
}

/// Ordered, non-empty list of cities
#[derive(Debug, Clone)]
pub struct CityList {
    cities: Vec<City>,
    next_id: u64,
}

impl CityList {
    /// Build from records, skipping any with an unknown zone
    ///
    /// Returns `None` when no record survives.
    pub fn from_records(records: &[CityRecord]) -> Option<Self> {
        let mut list = Self {
            cities: Vec::with_capacity(records.len()),
            next_id: 0,
        };
        for record in records {
            if let Err(e) = list.add(record) {
                tracing::warn!(city = %record.name, "skipping city: {}", e);
            }
        }
        (!list.cities.is_empty()).then_some(list)
    }

    /// Single-city list for a zone
    pub fn with_default(tz: Tz) -> Self {
        let record = CityRecord::for_timezone(tz);
        let id = CityId(0);
        Self {
            cities: vec![City {
                id,
                name: record.name.clone(),
                timezone: tz,
                coordinates: record.coordinates(),
            }],
            next_id: 1,
        }
    }

    /// Append a city
    pub fn add(&mut self, record: &CityRecord) -> Result<CityId, TimezoneError> {
        let timezone = parse_timezone(&record.timezone)?;
        let id = CityId(self.next_id);
        self.next_id += 1;
        self.cities.push(City {
            id,
            name: record.name.clone(),
            timezone,
            coordinates: record.coordinates(),
        });
        Ok(id)
    }

    /// Remove a city; refuses to remove the last one
    pub fn remove(&mut self, id: CityId) -> bool {
        if self.cities.len() <= 1 {
            return false;
        }
        match self.index_of(id) {
            Some(index) => {
                self.cities.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move the city at `from` to `to`, keeping everyone else in order
    pub fn move_city(&mut self, from: usize, to: usize) -> bool {
        let len = self.cities.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let city = self.cities.remove(from);
        self.cities.insert(to, city);
        true
    }

    pub fn index_of(&self, id: CityId) -> Option<usize> {
        self.cities.iter().position(|c| c.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&City> {
        self.cities.get(index)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn records(&self) -> Vec<CityRecord> {
        self.cities.iter().map(City::to_record).collect()
    }
}
