//! Region templates and scene cues.
//!
//! Seven named macro-regions each carry a day template. Matched templates are summed
//! into a first city/away split, which the scene cues (interior, nature, "not in Oslo")
//! then adjust.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::rules::{Rule, RuleTable};

/// Day split used when no region template matches.
const DEFAULT_CITY_DAYS: u32 = 2;
/// Nature away-day hint bounds.
const NATURE_HINT_MIN: u32 = 1;
const NATURE_HINT_MAX: u32 = 3;

/// Named macro-region
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionId {
    /// The home city and its suburbs.
    Oslo,
    North,
    West,
    Central,
    /// South-central mountain plateaus.
    Mountains,
    Inland,
    South,
}

impl RegionId {
    pub fn label(&self) -> &'static str {
        match self {
            RegionId::Oslo => "oslo",
            RegionId::North => "north",
            RegionId::West => "west",
            RegionId::Central => "central",
            RegionId::Mountains => "mountains",
            RegionId::Inland => "inland",
            RegionId::South => "south",
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, RegionId::Oslo)
    }

    /// Far regions carry the highest domestic travel multiplier.
    pub fn is_far(&self) -> bool {
        matches!(self, RegionId::North)
    }
}

/// Day template carried by a region rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTemplate {
    pub days_in_city: u32,
    pub days_out_of_city: u32,
    pub include_scout: bool,
}

const fn template(days_in_city: u32, days_out_of_city: u32, include_scout: bool) -> DayTemplate {
    DayTemplate {
        days_in_city,
        days_out_of_city,
        include_scout,
    }
}

/// Scene category, used both for nature hints and for the location count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneType {
    Fjord,
    Mountain,
    City,
    Forest,
    Beach,
    River,
    Lake,
    Waterfall,
}

impl SceneType {
    pub fn is_nature(&self) -> bool {
        !matches!(self, SceneType::City)
    }
}

/// City/away day split. Both halves are unsigned, so neither can go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySplit {
    pub city: u32,
    pub away: u32,
}

impl DaySplit {
    pub fn total(&self) -> u32 {
        self.city + self.away
    }
}

static REGIONS: LazyLock<RuleTable<RegionId, DayTemplate>> = LazyLock::new(|| {
    RuleTable::new(vec![
        Rule::new(
            RegionId::Oslo,
            template(2, 0, false),
            &[
                "oslo", "bærum", "baerum", "asker", "lillestrøm", "nordmarka", "østmarka",
                "holmenkollen", "aker brygge", "bjørvika", "grünerløkka",
            ],
        ),
        Rule::new(
            RegionId::North,
            template(0, 4, true),
            &[
                "nord-norge", "northern norway", "lofoten", "tromsø", "tromso", "senja",
                "finnmark", "svalbard", "nordkapp", "north cape", "bodø", "bodo", "narvik",
                "arctic", "arktis\\w*", "nordlys\\w*", "northern lights", "midnight sun",
                "midnattssol\\w*",
            ],
        ),
        Rule::new(
            RegionId::West,
            template(0, 3, true),
            &[
                "vestland\\w*", "western norway", "bergen", "stavanger", "ålesund", "alesund",
                "geiranger\\w*", "hardangerfjord\\w*", "sognefjord\\w*", "preikestolen",
                "pulpit rock", "fjordane",
            ],
        ),
        Rule::new(
            RegionId::Central,
            template(0, 3, true),
            &[
                "trøndelag", "trondheim", "central norway", "midt-norge", "kristiansund",
                "molde", "atlanterhavsveien", "atlantic road",
            ],
        ),
        Rule::new(
            RegionId::Mountains,
            template(0, 2, true),
            &[
                "jotunheimen", "hardangervidda", "rondane", "dovre\\w*", "besseggen",
                "galdhøpiggen", "høyfjell\\w*", "mountain plateau",
            ],
        ),
        Rule::new(
            RegionId::Inland,
            template(0, 2, false),
            &[
                "innlandet", "lillehammer", "hamar", "gjøvik", "valdres", "hedmark", "oppland",
                "gudbrandsdal\\w*", "østerdal\\w*",
            ],
        ),
        Rule::new(
            RegionId::South,
            template(0, 2, false),
            &[
                "sørlandet", "southern norway", "kristiansand", "arendal", "grimstad", "mandal",
                "lindesnes", "skjærgård\\w*", "archipelago",
            ],
        ),
    ])
});

static SCENE_TYPES: LazyLock<RuleTable<SceneType, ()>> = LazyLock::new(|| {
    RuleTable::new(vec![
        Rule::new(SceneType::Fjord, (), &["fjord\\w*"]),
        Rule::new(SceneType::Mountain, (), &["mountains?", "fjell\\w*", "peaks?"]),
        Rule::new(
            SceneType::City,
            (),
            &["city", "urban", "bymiljø\\w*", "byen", "sentrum", "downtown", "streets?"],
        ),
        Rule::new(SceneType::Forest, (), &["forests?", "woods", "skog\\w*"]),
        Rule::new(SceneType::Beach, (), &["beach\\w*", "strand\\w*", "coast\\w*", "kyst\\w*"]),
        Rule::new(SceneType::River, (), &["rivers?", "elv\\w*"]),
        Rule::new(SceneType::Lake, (), &["lakes?", "innsjø\\w*", "tjern\\w*"]),
        Rule::new(SceneType::Waterfall, (), &["waterfalls?", "foss\\w*"]),
    ])
});

static INTERIOR_CUES: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "studio\\w*", "interior\\w*", "interiør\\w*", "indoors?", "innendørs", "office",
            "kontor\\w*", "apartment", "leilighet\\w*", "urban", "restaurant\\w*", "hotel\\w*",
            "hotell\\w*", "warehouse", "lagerhall",
        ],
    )
});

static OUTSIDE_CITY: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "not in oslo", "outside (?:of )?oslo", "away from oslo", "ikke i oslo",
            "utenfor oslo",
        ],
    )
});

/// First day allocation from the region templates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionInference {
    pub regions: Vec<RegionId>,
    pub split: DaySplit,
    pub include_scout: bool,
}

impl RegionInference {
    pub fn includes_home(&self) -> bool {
        self.regions.iter().any(RegionId::is_home)
    }

    pub fn has_far_region(&self) -> bool {
        self.regions.iter().any(RegionId::is_far)
    }

    /// Any matched region outside the home city.
    pub fn has_regional_match(&self) -> bool {
        self.regions.iter().any(|r| !r.is_home())
    }
}

/// Scene cues found in the brief.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneHints {
    pub interior: bool,
    pub outside_city: bool,
    pub scene_types: Vec<SceneType>,
}

impl SceneHints {
    pub fn nature_categories(&self) -> u32 {
        self.scene_types.iter().filter(|s| s.is_nature()).count() as u32
    }

    pub fn has_nature(&self) -> bool {
        self.nature_categories() > 0
    }
}

/// Sum the day templates of every matched region.
///
/// With more than one match the summed city days are replaced: clamped to at least one
/// when Oslo is among the matches, zeroed otherwise.
pub fn infer_regions(text: &str) -> RegionInference {
    let mut regions = Vec::new();
    let mut split = DaySplit::default();
    let mut include_scout = false;

    for rule in REGIONS.matched(text) {
        regions.push(rule.id);
        split.city += rule.weight.days_in_city;
        split.away += rule.weight.days_out_of_city;
        include_scout |= rule.weight.include_scout;
    }

    if regions.is_empty() {
        split = DaySplit {
            city: DEFAULT_CITY_DAYS,
            away: 0,
        };
    } else if regions.len() > 1 {
        if regions.iter().any(RegionId::is_home) {
            split.city = split.city.max(1);
        } else {
            split.city = 0;
        }
    }

    RegionInference {
        regions,
        split,
        include_scout,
    }
}

pub fn detect_scene(text: &str) -> SceneHints {
    SceneHints {
        interior: INTERIOR_CUES.is_match(text),
        outside_city: OUTSIDE_CITY.is_match(text),
        scene_types: SCENE_TYPES.matched_ids(text),
    }
}

/// Layer scene hints on top of the region split, recording each adjustment.
pub fn apply_scene(mut split: DaySplit, hints: &SceneHints, reasons: &mut Vec<String>) -> DaySplit {
    if hints.interior {
        if hints.outside_city {
            split.away += 1;
            split.city = split.city.saturating_sub(1);
            reasons.push("Interior cue outside Oslo: shifted one day away".to_string());
        } else {
            split.city += 1;
            reasons.push("Interior/studio cue: +1 city day".to_string());
        }
    }

    let nature = hints.nature_categories();
    if nature > 0 {
        let hint = nature.clamp(NATURE_HINT_MIN, NATURE_HINT_MAX);
        split.away += hint;
        reasons.push(format!(
            "Nature cues ({} categories): +{} away day(s)",
            nature, hint
        ));
    }

    if hints.outside_city && !hints.interior && nature == 0 {
        split.away = split.away.max(1);
        split.city = split.city.saturating_sub(1);
        reasons.push("Explicitly outside Oslo: at least one away day".to_string());
    }

    split
}
