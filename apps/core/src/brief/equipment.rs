//! Technical equipment detection with per-item day spans.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use regex::Regex;

use super::rules::{captured_count, compile, day_count_fragment, Rule, RuleTable};

/// Daily cost used when an equipment type is not in the table (NOK).
pub const DEFAULT_EQUIPMENT_COST: u64 = 30_000;

/// Equipment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentKind {
    Drone,
    RoadBlock,
    LowLoader,
    Steadicam,
    Jib,
    Underwater,
    Specialized,
}

impl EquipmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentKind::Drone => "drone",
            EquipmentKind::RoadBlock => "roadBlock",
            EquipmentKind::LowLoader => "lowLoader",
            EquipmentKind::Steadicam => "steadicam",
            EquipmentKind::Jib => "jib",
            EquipmentKind::Underwater => "underwater",
            EquipmentKind::Specialized => "specialized",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        EQUIPMENT.iter().map(|r| r.id).find(|k| k.as_str() == s)
    }
}

/// One equipment line of a suggestion.
///
/// `kind` stays a string so that types reported by a remote augmentation service survive
/// the merge even when this engine does not know them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub days: u32,
}

impl EquipmentItem {
    pub fn new(kind: EquipmentKind, days: u32) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            days,
        }
    }
}

/// Equipment rules; the weight is the daily cost in NOK.
static EQUIPMENT: LazyLock<RuleTable<EquipmentKind, u64>> = LazyLock::new(|| {
    RuleTable::new(vec![
        Rule::new(
            EquipmentKind::Drone,
            15_000,
            &["drone\\w*", "dronefoto\\w*", "fpv", "aerials?", "aerial shots?", "luftfoto\\w*"],
        ),
        Rule::new(
            EquipmentKind::RoadBlock,
            25_000,
            &[
                "road ?blocks?", "road closures?", "closed roads?", "veisperring\\w*",
                "stenge veien", "stengt vei", "trafikkdirigering", "traffic control",
            ],
        ),
        Rule::new(
            EquipmentKind::LowLoader,
            45_000,
            &[
                "low[- ]?loader", "lavlaster", "blokkvogn", "car rig", "process trailer",
                "camera car", "tracking vehicle", "biltralle",
            ],
        ),
        Rule::new(EquipmentKind::Steadicam, 20_000, &["steadicam", "gimbal", "ronin"]),
        Rule::new(
            EquipmentKind::Jib,
            18_000,
            &["jib", "jib arm", "technocrane", "crane", "kran"],
        ),
        Rule::new(
            EquipmentKind::Underwater,
            35_000,
            &["underwater", "undervanns\\w*", "under vann", "diving", "dykk\\w*"],
        ),
        Rule::new(
            EquipmentKind::Specialized,
            30_000,
            &[
                "helicopter", "helikopter\\w*", "stunt\\w*", "cable ?cam", "spidercam",
                "motion control", "high[- ]speed", "phantom",
            ],
        ),
    ])
});

static COUNT_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*(?:for\s+|i\s+|in\s+|x\s*)?{}\b",
        day_count_fragment()
    ))
});

static COUNT_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b{}\s*(?:of|with|med|using|på)?\s*$",
        day_count_fragment()
    ))
});

/// Daily cost for an equipment type string, falling back to [`DEFAULT_EQUIPMENT_COST`].
pub fn daily_cost(kind: &str) -> u64 {
    EquipmentKind::parse(kind)
        .and_then(|k| EQUIPMENT.get(k))
        .map_or(DEFAULT_EQUIPMENT_COST, |rule| rule.weight)
}

/// Day count stated right before or after a matched phrase.
fn adjacent_count(text: &str, start: usize, end: usize) -> Option<u32> {
    let after = COUNT_AFTER
        .captures(&text[end..])
        .and_then(|c| captured_count(&c));
    let before = COUNT_BEFORE
        .captures(&text[..start])
        .and_then(|c| captured_count(&c));
    after.max(before).filter(|n| *n > 0)
}

/// Planning context the drone default depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EquipmentContext {
    pub explicit_total_days: u32,
    pub away_days: u32,
    pub locations: u32,
}

/// Detect equipment in table order. Each category yields at most one item.
pub fn extract_equipment(text: &str, ctx: EquipmentContext) -> Vec<EquipmentItem> {
    EQUIPMENT
        .iter()
        .filter_map(|rule| {
            let spans = rule.spans(text);
            if spans.is_empty() {
                return None;
            }
            let explicit = spans
                .iter()
                .filter_map(|(start, end)| adjacent_count(text, *start, *end))
                .max();

            let days = match (explicit, rule.id) {
                (Some(n), _) => n,
                // Assume the drone flies on every away day and every location.
                (None, EquipmentKind::Drone) => 1
                    .max(ctx.explicit_total_days)
                    .max(ctx.away_days)
                    .max(ctx.locations),
                (None, _) => 1,
            };
            Some(EquipmentItem::new(rule.id, days))
        })
        .collect()
}

/// Placeholder rig line for creative-only briefs with no technical equipment.
pub fn creative_rig(total_days: u32) -> EquipmentItem {
    EquipmentItem::new(EquipmentKind::Specialized, total_days.max(1))
}
