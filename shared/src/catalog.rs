//! Timezone catalog - well-known cities with coordinates
//!
//! Supplies search candidates for the city picker and resolves bare zone ids
//! to display names and coordinates.

use chrono_tz::{Africa, America, Asia, Atlantic, Australia, Europe, Pacific, Tz};

use crate::time_engine::default_city_name;

/// A searchable city entry
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub city: String,
    pub country: String,
    pub timezone: Tz,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

struct KnownCity {
    city: &'static str,
    country: &'static str,
    timezone: Tz,
    latitude: f64,
    longitude: f64,
}

impl KnownCity {
    fn entry(&self) -> CatalogEntry {
        CatalogEntry {
            city: self.city.to_string(),
            country: self.country.to_string(),
            timezone: self.timezone,
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
        }
    }
}

const KNOWN_CITIES: &[KnownCity] = &[
    KnownCity { city: "Los Angeles", country: "United States", timezone: America::Los_Angeles, latitude: 34.0522, longitude: -118.2437 },
    KnownCity { city: "San Francisco", country: "United States", timezone: America::Los_Angeles, latitude: 37.7749, longitude: -122.4194 },
    KnownCity { city: "Denver", country: "United States", timezone: America::Denver, latitude: 39.7392, longitude: -104.9903 },
    KnownCity { city: "Chicago", country: "United States", timezone: America::Chicago, latitude: 41.8781, longitude: -87.6298 },
    KnownCity { city: "New York", country: "United States", timezone: America::New_York, latitude: 40.7128, longitude: -74.0060 },
    KnownCity { city: "Toronto", country: "Canada", timezone: America::Toronto, latitude: 43.6532, longitude: -79.3832 },
    KnownCity { city: "Mexico City", country: "Mexico", timezone: America::Mexico_City, latitude: 19.4326, longitude: -99.1332 },
    KnownCity { city: "Sao Paulo", country: "Brazil", timezone: America::Sao_Paulo, latitude: -23.5505, longitude: -46.6333 },
    KnownCity { city: "Buenos Aires", country: "Argentina", timezone: America::Argentina::Buenos_Aires, latitude: -34.6037, longitude: -58.3816 },
    KnownCity { city: "Honolulu", country: "United States", timezone: Pacific::Honolulu, latitude: 21.3069, longitude: -157.8583 },
    KnownCity { city: "Anchorage", country: "United States", timezone: America::Anchorage, latitude: 61.2181, longitude: -149.9003 },
    KnownCity { city: "Reykjavik", country: "Iceland", timezone: Atlantic::Reykjavik, latitude: 64.1466, longitude: -21.9426 },
    KnownCity { city: "London", country: "United Kingdom", timezone: Europe::London, latitude: 51.5074, longitude: -0.1278 },
    KnownCity { city: "Paris", country: "France", timezone: Europe::Paris, latitude: 48.8566, longitude: 2.3522 },
    KnownCity { city: "Berlin", country: "Germany", timezone: Europe::Berlin, latitude: 52.5200, longitude: 13.4050 },
    KnownCity { city: "Madrid", country: "Spain", timezone: Europe::Madrid, latitude: 40.4168, longitude: -3.7038 },
    KnownCity { city: "Stockholm", country: "Sweden", timezone: Europe::Stockholm, latitude: 59.3293, longitude: 18.0686 },
    KnownCity { city: "Athens", country: "Greece", timezone: Europe::Athens, latitude: 37.9838, longitude: 23.7275 },
    KnownCity { city: "Istanbul", country: "Turkey", timezone: Europe::Istanbul, latitude: 41.0082, longitude: 28.9784 },
    KnownCity { city: "Moscow", country: "Russia", timezone: Europe::Moscow, latitude: 55.7558, longitude: 37.6173 },
    KnownCity { city: "Cairo", country: "Egypt", timezone: Africa::Cairo, latitude: 30.0444, longitude: 31.2357 },
    KnownCity { city: "Lagos", country: "Nigeria", timezone: Africa::Lagos, latitude: 6.5244, longitude: 3.3792 },
    KnownCity { city: "Nairobi", country: "Kenya", timezone: Africa::Nairobi, latitude: -1.2921, longitude: 36.8219 },
    KnownCity { city: "Johannesburg", country: "South Africa", timezone: Africa::Johannesburg, latitude: -26.2041, longitude: 28.0473 },
    KnownCity { city: "Dubai", country: "United Arab Emirates", timezone: Asia::Dubai, latitude: 25.2048, longitude: 55.2708 },
    KnownCity { city: "Mumbai", country: "India", timezone: Asia::Kolkata, latitude: 19.0760, longitude: 72.8777 },
    KnownCity { city: "Kolkata", country: "India", timezone: Asia::Kolkata, latitude: 22.5726, longitude: 88.3639 },
    KnownCity { city: "Kathmandu", country: "Nepal", timezone: Asia::Kathmandu, latitude: 27.7172, longitude: 85.3240 },
    KnownCity { city: "Bangkok", country: "Thailand", timezone: Asia::Bangkok, latitude: 13.7563, longitude: 100.5018 },
    KnownCity { city: "Singapore", country: "Singapore", timezone: Asia::Singapore, latitude: 1.3521, longitude: 103.8198 },
    KnownCity { city: "Shanghai", country: "China", timezone: Asia::Shanghai, latitude: 31.2304, longitude: 121.4737 },
    KnownCity { city: "Hong Kong", country: "China", timezone: Asia::Hong_Kong, latitude: 22.3193, longitude: 114.1694 },
    KnownCity { city: "Seoul", country: "South Korea", timezone: Asia::Seoul, latitude: 37.5665, longitude: 126.9780 },
    KnownCity { city: "Tokyo", country: "Japan", timezone: Asia::Tokyo, latitude: 35.6762, longitude: 139.6503 },
    KnownCity { city: "Sydney", country: "Australia", timezone: Australia::Sydney, latitude: -33.8688, longitude: 151.2093 },
    KnownCity { city: "Perth", country: "Australia", timezone: Australia::Perth, latitude: -31.9505, longitude: 115.8605 },
    KnownCity { city: "Auckland", country: "New Zealand", timezone: Pacific::Auckland, latitude: -36.8485, longitude: 174.7633 },
];

/// Find the catalog entry for a zone id, preferring a city with a matching name
pub fn lookup(timezone: Tz, name: Option<&str>) -> Option<CatalogEntry> {
    KNOWN_CITIES
        .iter()
        .filter(|c| c.timezone == timezone)
        .find(|c| name.map_or(true, |name| c.city.eq_ignore_ascii_case(name)))
        .map(KnownCity::entry)
}

/// Display name for a bare zone id
pub fn display_name(timezone: Tz) -> String {
    lookup(timezone, None)
        .map(|entry| entry.city)
        .unwrap_or_else(|| default_city_name(timezone))
}

/// Search by name, country or zone id (case-insensitive partial match)
///
/// Known cities come first, followed by every tz database zone that matches.
pub fn search(query: &str) -> Vec<CatalogEntry> {
    let query_lower = query.trim().to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&query_lower);

    let mut results: Vec<CatalogEntry> = KNOWN_CITIES
        .iter()
        .filter(|c| matches(c.city) || matches(c.country) || matches(c.timezone.name()))
        .map(KnownCity::entry)
        .collect();

    results.extend(
        chrono_tz::TZ_VARIANTS
            .iter()
            .filter(|tz| matches(tz.name()))
            .filter(|tz| !KNOWN_CITIES.iter().any(|c| c.timezone == **tz))
            .map(|&tz| CatalogEntry {
                city: default_city_name(tz),
                country: String::new(),
                timezone: tz,
                latitude: None,
                longitude: None,
            }),
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_zone() {
        let entry = lookup(Asia::Tokyo, None).unwrap();
        assert_eq!(entry.city, "Tokyo");
        assert!(entry.latitude.is_some());
    }

    #[test]
    fn test_lookup_prefers_matching_name() {
        let entry = lookup(America::Los_Angeles, Some("san francisco")).unwrap();
        assert_eq!(entry.city, "San Francisco");
        assert!(lookup(America::Los_Angeles, Some("Gotham")).is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_zone_id() {
        assert_eq!(display_name(Asia::Tokyo), "Tokyo");
        assert_eq!(display_name(chrono_tz::America::Argentina::Cordoba), "Cordoba");
    }

    #[test]
    fn test_search_matches_country_and_zone() {
        let by_country = search("japan");
        assert!(by_country.iter().any(|e| e.city == "Tokyo"));

        let by_zone = search("New_York");
        assert!(by_zone.iter().any(|e| e.timezone == America::New_York));

        let uncatalogued = search("Cordoba");
        assert!(uncatalogued.iter().any(|e| e.latitude.is_none()));
    }
}
