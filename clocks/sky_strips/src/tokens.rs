//! Tokens module - compact, shareable encoding of the city list
//!
//! A list is written as comma-separated `name@Zone/Id` tokens. The name is
//! left out when it equals the zone's display name, so `Asia/Tokyo` alone
//! decodes to "Tokyo". Names escape `%`, `,` and `@` as `%25`, `%2C`, `%40`.

use shared::{display_name, lookup, parse_timezone};
use thiserror::Error;

use crate::cities::CityRecord;

/// Error returned when a token list cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token list is empty")]
    Empty,
    #[error("unknown timezone in token {token:?}")]
    UnknownTimezone { token: String },
}

/// Encode cities in list order
pub fn encode(records: &[CityRecord]) -> String {
    records
        .iter()
        .map(encode_one)
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_one(record: &CityRecord) -> String {
    let implied = parse_timezone(&record.timezone)
        .map(display_name)
        .is_ok_and(|name| name == record.name);
    if implied {
        record.timezone.clone()
    } else {
        format!("{}@{}", escape(&record.name), record.timezone)
    }
}

/// Decode a token list; any unknown zone rejects the whole list
pub fn decode(input: &str) -> Result<Vec<CityRecord>, TokenError> {
    let records = input
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(decode_one)
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(TokenError::Empty);
    }
    Ok(records)
}

fn decode_one(token: &str) -> Result<CityRecord, TokenError> {
    let (name, zone) = match token.rsplit_once('@') {
        Some((name, zone)) => (Some(unescape(name)), zone.trim()),
        None => (None, token.trim()),
    };
    let tz = parse_timezone(zone).map_err(|_| TokenError::UnknownTimezone {
        token: token.to_string(),
    })?;

    let name = name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| display_name(tz));
    let entry = lookup(tz, Some(&name)).or_else(|| lookup(tz, None));

    Ok(CityRecord {
        timezone: tz.name().to_string(),
        latitude: entry.as_ref().and_then(|e| e.latitude),
        longitude: entry.as_ref().and_then(|e| e.longitude),
        name,
    })
}

fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ',' => out.push_str("%2C"),
            '@' => out.push_str("%40"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3);
        let decoded = match code.map(str::to_ascii_uppercase).as_deref() {
            Some("25") => Some('%'),
            Some("2C") => Some(','),
            Some("40") => Some('@'),
            _ => None,
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[pos + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::tests::record;
    use proptest::prelude::*;

    #[test]
    fn test_default_names_are_omitted() {
        let records = vec![record("Tokyo", "Asia/Tokyo"), record("Home", "Europe/London")];
        assert_eq!(encode(&records), "Asia/Tokyo,Home@Europe/London");
    }

    #[test]
    fn test_decode_fills_name_and_coordinates() {
        let records = decode("Asia/Tokyo,Home@Europe/London").unwrap();
        assert_eq!(records[0].name, "Tokyo");
        assert!(records[0].latitude.is_some());
        assert_eq!(records[1].name, "Home");
        assert_eq!(records[1].timezone, "Europe/London");
        assert!(records[1].longitude.is_some());
    }

    #[test]
    fn test_uncatalogued_zone_has_derived_name() {
        let records = decode("America/Argentina/Ushuaia").unwrap();
        assert_eq!(records[0].name, "Ushuaia");
        assert!(records[0].latitude.is_none());
        assert_eq!(encode(&records), "America/Argentina/Ushuaia");
    }

    #[test]
    fn test_reserved_characters_round_trip() {
        let records = vec![record("R&D, 5th @ HQ 100%", "America/New_York")];
        let encoded = encode(&records);
        assert_eq!(encoded, "R&D%2C 5th %40 HQ 100%25@America/New_York");
        assert_eq!(decode(&encoded).unwrap()[0].name, "R&D, 5th @ HQ 100%");
    }

    #[test]
    fn test_stray_percent_is_literal() {
        assert_eq!(unescape("50%off"), "50%off");
        assert_eq!(unescape("a%2cb"), "a,b");
        assert_eq!(unescape("end%"), "end%");
    }

    #[test]
    fn test_malformed_lists_are_rejected() {
        assert_eq!(decode(""), Err(TokenError::Empty));
        assert_eq!(decode(" , ,"), Err(TokenError::Empty));
        assert!(matches!(
            decode("Asia/Tokyo,Moon@Luna/Base"),
            Err(TokenError::UnknownTimezone { .. })
        ));
    }

    fn zone_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "Asia/Tokyo",
            "Europe/London",
            "America/New_York",
            "Australia/Sydney",
            "America/Argentina/Ushuaia",
            "UTC",
        ])
    }

    proptest! {
        #[test]
        fn encode_decode_round_trip(
            cities in prop::collection::vec(("[A-Za-z0-9 %,@]{1,16}", zone_strategy()), 1..6)
        ) {
            let records: Vec<CityRecord> = cities
                .iter()
                .map(|(name, zone)| record(name, zone))
                .collect();
            let decoded = decode(&encode(&records)).unwrap();

            prop_assert_eq!(decoded.len(), records.len());
            for (original, restored) in records.iter().zip(&decoded) {
                prop_assert_eq!(&original.name, &restored.name);
                prop_assert_eq!(&original.timezone, &restored.timezone);
            }
        }
    }
}
