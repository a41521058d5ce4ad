//! Online geocoding: place-candidate extraction, an HTTP provider and day reconciliation.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::traits::{GeocodeHit, Geocoder};
use crate::brief::rules::compile;
use crate::brief::{DaySplit, GeoBoost};
use crate::error::{AppError, Result};

/// ISO country code of the home country. Hits elsewhere are ignored.
pub const HOME_COUNTRY_CODE: &str = "no";
/// Upper bound on candidates sent to the provider per brief.
pub const MAX_CANDIDATES: usize = 5;

/// Capitalized place phrase after a preposition ("in Tromsø", "til Ålesund").
static PREPOSITION_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?i:in|to|at|near|from|around|i|til|på|ved|fra|nær|rundt)\s+(\p{Lu}[\p{L}\-]+(?:\s+\p{Lu}[\p{L}\-]+)?)")
});

/// Any capitalized phrase.
static CAPITALIZED_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b\p{Lu}[\p{Ll}\-]+(?:\s+\p{Lu}[\p{Ll}\-]+)*"));

/// Capitalized words that are never places.
const NOT_PLACES: &[&str] = &[
    "the", "this", "that", "these", "our", "their", "we", "i", "it", "a", "an", "and", "or",
    "for", "with", "shoot", "shooting", "film", "commercial", "documentary", "client", "brand",
    "crew", "day", "days", "norway", "norge", "norwegian", "vi", "det", "den", "en", "et",
    "og", "kunden", "opptak", "dager", "dag", "reklame", "film", "studio", "january",
    "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday",
];

fn is_candidate(phrase: &str) -> bool {
    let lower = phrase.to_lowercase();
    phrase.chars().count() >= 3 && !NOT_PLACES.contains(&lower.as_str())
}

/// Extract up to five place-name candidates.
///
/// Preposition-anchored phrases are tried first; capitalized phrases anywhere in the text
/// are only used when that pass finds nothing.
pub fn extract_candidates(text: &str) -> Vec<String> {
    let collect = |phrases: Vec<String>| {
        let mut seen = HashSet::new();
        phrases
            .into_iter()
            .filter(|p| is_candidate(p))
            .filter(|p| seen.insert(p.to_lowercase()))
            .take(MAX_CANDIDATES)
            .collect::<Vec<_>>()
    };

    let anchored = collect(
        PREPOSITION_PHRASE
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect(),
    );
    if !anchored.is_empty() {
        return anchored;
    }

    collect(
        CAPITALIZED_PHRASE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    )
}

/// Fold online boosts into the current split.
///
/// With an explicit total the away share is raised to the boost but capped by the total,
/// and city days take the remainder. Otherwise boosts are lower bounds, except that an
/// all-city plan shifts days from city to away instead of growing.
pub fn reconcile(split: DaySplit, explicit_total: u32, boost: GeoBoost) -> DaySplit {
    if explicit_total > 0 {
        let away = split.away.max(boost.away).min(explicit_total);
        return DaySplit {
            city: explicit_total - away,
            away,
        };
    }

    if split.away == 0 && split.city > 0 && boost.away > 0 {
        let shift = boost.away.min(split.city);
        return DaySplit {
            city: (split.city - shift).max(boost.city),
            away: boost.away,
        };
    }

    boost.apply_floor(split)
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    name: Option<String>,
    display_name: String,
    lat: String,
    lon: String,
    address: Option<NominatimAddress>,
}

impl NominatimPlace {
    fn into_hit(self) -> Result<GeocodeHit> {
        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|e| AppError::InvalidResponse(format!("Bad coordinate {:?}: {}", v, e)))
        };
        Ok(GeocodeHit {
            lat: parse(&self.lat)?,
            lon: parse(&self.lon)?,
            name: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or(self.display_name),
            country_code: self
                .address
                .and_then(|a| a.country_code)
                .unwrap_or_default(),
        })
    }
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint, restricted to the home
/// country.
pub struct HttpGeocoder {
    client: Client,
    base_url: Url,
}

impl HttpGeocoder {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.base_url.join("search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "jsonv2")
            .append_pair("addressdetails", "1")
            .append_pair("limit", "1")
            .append_pair("countrycodes", HOME_COUNTRY_CODE);
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<GeocodeHit>> {
        let url = self.search_url(query)?;
        debug!("Geocoding {:?}", query);

        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Http(format!(
                "Geocode request failed with status {}: {}",
                status, body
            )));
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&res.text().await?)?;
        places.into_iter().next().map(NominatimPlace::into_hit).transpose()
    }
}
