//! Explicit day totals and location counting.

use std::sync::LazyLock;

use regex::Regex;

use super::region::{DaySplit, SceneHints};
use super::rules::{
    captured_count, compile, counted_units, day_count_fragment, Rule, ENGLISH_LOCATION_UNITS,
    NORWEGIAN_LOCATION_UNITS,
};

/// Location count implied by "multiple locations" phrasing.
const MULTI_LOCATION_COUNT: u32 = 3;
/// Larger stated counts are treated as noise (years, budgets) rather than shoot days.
const MAX_EXPLICIT_DAYS: u32 = 60;
const MAX_EXPLICIT_LOCATIONS: u32 = 20;

static DAY_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"\b{}\b", day_count_fragment()))
});

static DAYS_PER_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b{}\s*(?:per|pr\.?|each|hver)\s*(?:location|lokasjon|sted)\b",
        day_count_fragment()
    ))
});

static LOCATION_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b{}\b",
        counted_units(
            ENGLISH_LOCATION_UNITS,
            NORWEGIAN_LOCATION_UNITS,
            r"(?:different\s+|ulike\s+|forskjellige\s+)?",
        )
    ))
});

static MULTI_LOCATION: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "multiple locations", "several locations", "various locations", "many locations",
            "different locations", "flere lokasjoner", "flere steder", "ulike lokasjoner",
            "forskjellige lokasjoner", "mange steder",
        ],
    )
});

fn max_count(pattern: &Regex, text: &str, limit: u32) -> Option<u32> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| captured_count(&caps))
        .filter(|n| (1..=limit).contains(n))
        .max()
}

/// Largest stated day total ("5 dager", "three days", "2 days per location"), 0 if none.
pub fn detect_total_days(text: &str) -> u32 {
    let plain = max_count(&DAY_COUNT, text, MAX_EXPLICIT_DAYS);
    let per_location = max_count(&DAYS_PER_LOCATION, text, MAX_EXPLICIT_DAYS);
    plain.max(per_location).unwrap_or(0)
}

/// Spread an explicit total over the existing split, keeping its ratio.
///
/// Without a prior split the whole total goes to city days.
pub fn redistribute(split: DaySplit, total: u32) -> DaySplit {
    if total == 0 {
        return split;
    }
    let prior = split.total();
    if prior == 0 {
        return DaySplit {
            city: total,
            away: 0,
        };
    }
    let away = ((total as f64) * (split.away as f64) / (prior as f64)).round() as u32;
    let away = away.min(total);
    DaySplit {
        city: total - away,
        away,
    }
}

/// Location count from matched regions, multi-location phrasing, stated counts and scene
/// variety. Never below one.
pub fn count_locations(text: &str, region_count: usize, scene: &SceneHints) -> u32 {
    let mut locations = (region_count as u32).max(1);

    if MULTI_LOCATION.is_match(text) {
        locations = locations.max(MULTI_LOCATION_COUNT);
    }

    if let Some(stated) = max_count(&LOCATION_COUNT, text, MAX_EXPLICIT_LOCATIONS) {
        locations = locations.max(stated);
    }

    let scene_types = scene.scene_types.len() as u32;
    if scene_types >= 2 {
        locations = locations.max(scene_types);
    }

    locations
}
