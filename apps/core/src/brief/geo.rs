//! Gazetteer matching and distance-based day inference.
//!
//! Places are matched on an ASCII-folded copy of the brief, measured against the home
//! city with the haversine formula and turned into city/away day boosts.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::region::DaySplit;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Trips within this distance of the home city are same-day city trips.
pub const CITY_TRIP_THRESHOLD_KM: f64 = 90.0;
/// Home city coordinate (Oslo).
pub const HOME: Coordinate = Coordinate {
    lat: 59.9139,
    lon: 10.7522,
};
/// Away boost from which scouting becomes mandatory.
pub const SCOUT_AWAY_BOOST: u32 = 2;

/// Distance tiers beyond the city threshold: (upper bound km, away boost).
const AWAY_TIERS: &[(f64, u32)] = &[(300.0, 1), (800.0, 2)];
const FARTHEST_AWAY_BOOST: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A static gazetteer entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerPlace {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub aliases: &'static [&'static str],
}

impl GazetteerPlace {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

const fn place(
    name: &'static str,
    lat: f64,
    lon: f64,
    aliases: &'static [&'static str],
) -> GazetteerPlace {
    GazetteerPlace {
        name,
        lat,
        lon,
        aliases,
    }
}

pub static GAZETTEER: &[GazetteerPlace] = &[
    place("Oslo", 59.9139, 10.7522, &["oslo", "kristiania"]),
    place("Holmenkollen", 59.9633, 10.6672, &["holmenkollen"]),
    place("Drøbak", 59.6633, 10.6300, &["drøbak", "drobak"]),
    place("Drammen", 59.7439, 10.2045, &["drammen"]),
    place("Fredrikstad", 59.2181, 10.9298, &["fredrikstad"]),
    place("Hamar", 60.7945, 11.0680, &["hamar"]),
    place("Lillehammer", 61.1153, 10.4662, &["lillehammer"]),
    place("Bergen", 60.3913, 5.3221, &["bergen"]),
    place("Stavanger", 58.9700, 5.7331, &["stavanger"]),
    place("Preikestolen", 58.9864, 6.1904, &["preikestolen", "pulpit rock"]),
    place("Ålesund", 62.4722, 6.1495, &["ålesund", "alesund", "aalesund"]),
    place("Geiranger", 62.1008, 7.2059, &["geiranger", "geirangerfjord", "geirangerfjorden"]),
    place("Trondheim", 63.4305, 10.3951, &["trondheim", "nidaros"]),
    place("Bodø", 67.2804, 14.4049, &["bodø", "bodo"]),
    place("Lofoten", 68.2000, 13.9000, &["lofoten", "lofotodden"]),
    place("Tromsø", 69.6492, 18.9553, &["tromsø", "tromso"]),
];

/// Folded aliases per gazetteer entry, computed once.
static FOLDED_ALIASES: LazyLock<Vec<Vec<String>>> = LazyLock::new(|| {
    GAZETTEER
        .iter()
        .map(|p| p.aliases.iter().map(|a| fold_for_match(a)).collect())
        .collect()
});

/// City/away day boost derived from one or more distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBoost {
    pub city: u32,
    pub away: u32,
}

impl GeoBoost {
    /// Combine by taking the larger boost of each kind.
    pub fn max(self, other: GeoBoost) -> GeoBoost {
        GeoBoost {
            city: self.city.max(other.city),
            away: self.away.max(other.away),
        }
    }

    pub fn requires_scout(&self) -> bool {
        self.away >= SCOUT_AWAY_BOOST
    }

    /// Apply both boosts as lower bounds.
    pub fn apply_floor(&self, split: DaySplit) -> DaySplit {
        DaySplit {
            city: split.city.max(self.city),
            away: split.away.max(self.away),
        }
    }
}

/// Trip classification relative to the 90 km threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TripKind {
    CityTrip,
    AwayTrip,
}

/// A gazetteer entry found in the brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
    pub kind: TripKind,
}

/// Fold text for alias matching: lower-case, map Norwegian letters to digraphs, strip
/// other diacritics and punctuation, collapse whitespace.
pub fn fold_for_match(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'æ' => folded.push_str("ae"),
            'ø' => folded.push_str("oe"),
            'å' => folded.push_str("aa"),
            'ß' => folded.push_str("ss"),
            'à' | 'á' | 'â' | 'ã' | 'ä' => folded.push('a'),
            'ç' => folded.push('c'),
            'è' | 'é' | 'ê' | 'ë' => folded.push('e'),
            'ì' | 'í' | 'î' | 'ï' => folded.push('i'),
            'ñ' => folded.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => folded.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => folded.push('u'),
            'ý' | 'ÿ' => folded.push('y'),
            c if c.is_alphanumeric() => folded.push(c),
            _ => folded.push(' '),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn trip_kind(distance_km: f64) -> TripKind {
    if distance_km <= CITY_TRIP_THRESHOLD_KM {
        TripKind::CityTrip
    } else {
        TripKind::AwayTrip
    }
}

/// Boost for a single place at `distance_km` from home.
pub fn boost_for_distance(distance_km: f64) -> GeoBoost {
    if distance_km <= CITY_TRIP_THRESHOLD_KM {
        return GeoBoost { city: 1, away: 0 };
    }
    let away = AWAY_TIERS
        .iter()
        .find(|(limit, _)| distance_km <= *limit)
        .map_or(FARTHEST_AWAY_BOOST, |(_, boost)| *boost);
    GeoBoost { city: 0, away }
}

/// Find gazetteer places mentioned in `text`, one match per canonical place.
pub fn match_places(text: &str) -> Vec<PlaceMatch> {
    let haystack = format!(" {} ", fold_for_match(text));

    GAZETTEER
        .iter()
        .zip(FOLDED_ALIASES.iter())
        .filter(|(_, aliases)| {
            aliases
                .iter()
                .any(|alias| haystack.contains(&format!(" {} ", alias)))
        })
        .map(|(place, _)| {
            let distance_km = haversine_km(HOME, place.coordinate());
            PlaceMatch {
                name: place.name.to_string(),
                lat: place.lat,
                lon: place.lon,
                distance_km,
                kind: trip_kind(distance_km),
            }
        })
        .collect()
}

/// Maximum boost of each kind across the matches.
pub fn combined_boost(matches: &[PlaceMatch]) -> GeoBoost {
    matches
        .iter()
        .map(|m| boost_for_distance(m.distance_km))
        .fold(GeoBoost::default(), GeoBoost::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_for_match() {
        assert_eq!(fold_for_match("Tromsø,  Ålesund!"), "tromsoe aalesund");
        assert_eq!(fold_for_match("Café Kjærlighet"), "cafe kjaerlighet");
    }

    #[test]
    fn test_haversine_known_distances() {
        let bergen = Coordinate { lat: 60.3913, lon: 5.3221 };
        let d = haversine_km(HOME, bergen);
        assert!((300.0..320.0).contains(&d), "Oslo-Bergen was {d}");
        assert!(haversine_km(HOME, HOME).abs() < 1e-9);
    }

    #[test]
    fn test_boost_tiers() {
        assert_eq!(boost_for_distance(36.0), GeoBoost { city: 1, away: 0 });
        assert_eq!(boost_for_distance(90.0), GeoBoost { city: 1, away: 0 });
        assert_eq!(boost_for_distance(135.0), GeoBoost { city: 0, away: 1 });
        assert_eq!(boost_for_distance(500.0), GeoBoost { city: 0, away: 2 });
        assert_eq!(boost_for_distance(1150.0), GeoBoost { city: 0, away: 3 });
    }

    #[test]
    fn test_match_places_dedupes_aliases() {
        let matches = match_places("tromsø and tromso again");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Tromsø");
        assert_eq!(matches[0].kind, TripKind::AwayTrip);
        assert!(matches[0].distance_km > 1000.0);
    }

    #[test]
    fn test_match_is_whole_token() {
        assert!(match_places("hamarøy").is_empty());
        assert_eq!(match_places("pulpit rock at dawn")[0].name, "Preikestolen");
    }

    #[test]
    fn test_combined_boost_takes_maximum() {
        let matches = match_places("drammen, lillehammer and tromsø");
        let boost = combined_boost(&matches);
        assert_eq!(boost, GeoBoost { city: 1, away: 3 });
        assert!(boost.requires_scout());
    }
}
