//! Budget synthesis.
//!
//! A daily rate by production type, additive line items (equipment, scout, creatives,
//! travel, location switches, freight) and a chain of multipliers. All amounts are NOK.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::classifier::{CrewType, ProductionType};
use super::equipment::daily_cost;
use super::result::Suggestion;
use super::rules::{Rule, RuleTable};

const FIXER_RATE_FACTOR: f64 = 0.6;
const MAJOR_PRODUCTION_FLOOR: f64 = 300_000.0;
const SCOUT_COST: f64 = 50_000.0;
const CREATIVES_COST: f64 = 100_000.0;
const TRAVEL_PER_AWAY_DAY: f64 = 40_000.0;
const LOCATION_SWITCH_COST: f64 = 20_000.0;
const FREIGHT_PER_ITEM_DAY: f64 = 4_000.0;

const FAR_REGION_MULTIPLIER: f64 = 1.30;
const REGIONAL_MULTIPLIER: f64 = 1.15;
const EQUIPMENT_COMPLEXITY_PER_ITEM: f64 = 0.035;
const GLOBAL_UPLIFT: f64 = 1.18;
const AWAY_PREMIUM_BASE: f64 = 0.16;
const AWAY_PREMIUM_PER_EXTRA_DAY: f64 = 0.05;
const AWAY_PREMIUM_CAP: f64 = 0.30;
const NATURE_MULTIPLIER: f64 = 1.05;
const CONTINGENCY: f64 = 0.16;

/// Base daily rate for a production type.
pub fn base_daily_rate(production_type: ProductionType) -> f64 {
    match production_type {
        ProductionType::Film => 180_000.0,
        ProductionType::Commercial => 140_000.0,
        ProductionType::Stills => 80_000.0,
        ProductionType::Documentary => 85_000.0,
    }
}

/// Nationality of the commissioning production
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Nationality {
    American,
    Nordic,
    European,
}

static NATIONALITIES: LazyLock<RuleTable<Nationality, f64>> = LazyLock::new(|| {
    RuleTable::new(vec![
        Rule::new(
            Nationality::American,
            1.5,
            &[
                "american", "amerikansk\\w*", "usa", "us-based", "hollywood", "los angeles",
                "new york",
            ],
        ),
        Rule::new(
            Nationality::Nordic,
            1.2,
            &[
                "swedish", "danish", "finnish", "icelandic", "svensk\\w*", "dansk\\w*",
                "finsk\\w*", "islandsk\\w*", "nordic", "nordisk\\w*",
            ],
        ),
        Rule::new(
            Nationality::European,
            1.3,
            &[
                "german", "french", "british", "italian", "spanish", "dutch", "european", "uk",
                "tysk\\w*", "fransk\\w*", "britisk\\w*", "engelsk\\w*", "italiensk\\w*",
                "spansk\\w*", "nederlandsk\\w*", "europeisk\\w*",
            ],
        ),
    ])
});

static MAJOR_PRODUCTION: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "major production", "large[- ]scale", "big budget", "big[- ]budget", "blockbuster",
            "high[- ]end", "stor produksjon", "storproduksjon\\w*",
        ],
    )
});

/// Matched nationalities and the resulting international multiplier (max, default 1.0).
pub fn detect_nationality(text: &str) -> (Vec<Nationality>, f64) {
    let matched: Vec<_> = NATIONALITIES.matched(text).collect();
    let multiplier = matched.iter().map(|r| r.weight).fold(1.0_f64, f64::max);
    (matched.iter().map(|r| r.id).collect(), multiplier)
}

pub fn is_major_production(text: &str) -> bool {
    MAJOR_PRODUCTION.is_match(text)
}

/// Text-derived inputs to the budget that are not part of the suggestion itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSignals {
    pub far_region: bool,
    pub regional_match: bool,
    pub international_multiplier: f64,
    pub nature: bool,
    pub major_production: bool,
}

impl Default for BudgetSignals {
    fn default() -> Self {
        Self {
            far_region: false,
            regional_match: false,
            international_multiplier: 1.0,
            nature: false,
            major_production: false,
        }
    }
}

/// Intermediate figures, kept for the explanation trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub base_daily_rate: f64,
    pub total_days: u32,
    pub additive_total: f64,
    pub domestic_multiplier: f64,
    pub international_multiplier: f64,
    pub equipment_factor: f64,
    pub away_premium: f64,
    pub nature_multiplier: f64,
    pub total: u64,
}

/// Compose the final estimate for `suggestion`.
pub fn synthesize(suggestion: &Suggestion, signals: &BudgetSignals) -> BudgetBreakdown {
    let mut rate = base_daily_rate(suggestion.production_type);
    if suggestion.crew_type == CrewType::Fixer {
        rate *= FIXER_RATE_FACTOR;
    }
    if signals.major_production {
        rate = rate.max(MAJOR_PRODUCTION_FLOOR);
    }

    let away = suggestion.days_out_of_oslo;
    let total_days = suggestion.days_in_oslo + away;
    let equipment_count = suggestion.equipment.len() as f64;

    let mut budget = rate * total_days as f64;

    for item in &suggestion.equipment {
        budget += daily_cost(&item.kind) as f64 * item.days as f64;
    }
    if suggestion.include_scout {
        budget += SCOUT_COST;
    }
    if suggestion.include_creatives {
        budget += CREATIVES_COST;
    }
    budget += TRAVEL_PER_AWAY_DAY * away as f64;
    if suggestion.locations > 1 {
        budget += LOCATION_SWITCH_COST * (suggestion.locations - 1) as f64;
    }
    if away > 0 && !suggestion.equipment.is_empty() {
        budget += equipment_count * away as f64 * FREIGHT_PER_ITEM_DAY;
    }
    let additive_total = budget;

    let domestic_multiplier = if signals.far_region {
        FAR_REGION_MULTIPLIER
    } else if away > 0 || signals.regional_match {
        REGIONAL_MULTIPLIER
    } else {
        1.0
    };
    budget *= domestic_multiplier * signals.international_multiplier;

    let equipment_factor = (1.0 + EQUIPMENT_COMPLEXITY_PER_ITEM * equipment_count) * GLOBAL_UPLIFT;
    budget *= equipment_factor;

    let away_premium = if away > 0 {
        (AWAY_PREMIUM_BASE + AWAY_PREMIUM_PER_EXTRA_DAY * (away - 1) as f64).min(AWAY_PREMIUM_CAP)
    } else {
        0.0
    };
    budget *= 1.0 + away_premium;

    let nature_multiplier = if signals.nature { NATURE_MULTIPLIER } else { 1.0 };
    budget *= nature_multiplier;

    budget *= 1.0 + CONTINGENCY;

    BudgetBreakdown {
        base_daily_rate: rate,
        total_days,
        additive_total,
        domestic_multiplier,
        international_multiplier: signals.international_multiplier,
        equipment_factor,
        away_premium,
        nature_multiplier,
        total: budget.max(0.0).round() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::equipment::{EquipmentItem, EquipmentKind};

    fn suggestion() -> Suggestion {
        Suggestion {
            production_type: ProductionType::Commercial,
            crew_type: CrewType::FullCrew,
            include_scout: false,
            include_creatives: false,
            days_in_oslo: 1,
            days_out_of_oslo: 0,
            locations: 1,
            equipment: vec![],
            budget_nok: 0,
        }
    }

    #[test]
    fn test_plain_city_day() {
        let breakdown = synthesize(&suggestion(), &BudgetSignals::default());
        // 140000 * 1.18 * 1.16
        assert_eq!(breakdown.total, 191_632);
        assert_eq!(breakdown.domestic_multiplier, 1.0);
        assert_eq!(breakdown.away_premium, 0.0);
    }

    #[test]
    fn test_far_region_multiplier() {
        let signals = BudgetSignals {
            far_region: true,
            regional_match: true,
            ..BudgetSignals::default()
        };
        let breakdown = synthesize(&suggestion(), &signals);
        assert_eq!(breakdown.domestic_multiplier, 1.30);
        // 140000 * 1.30 * 1.18 * 1.16
        assert_eq!(breakdown.total, 249_122);
    }

    #[test]
    fn test_nature_multiplier() {
        let signals = BudgetSignals {
            nature: true,
            ..BudgetSignals::default()
        };
        let breakdown = synthesize(&suggestion(), &signals);
        assert_eq!(breakdown.nature_multiplier, 1.05);
        // 140000 * 1.18 * 1.05 * 1.16
        assert_eq!(breakdown.total, 201_214);
    }

    #[test]
    fn test_international_multiplier_applies() {
        let (_, international_multiplier) = detect_nationality("american feature, hollywood studio");
        let signals = BudgetSignals {
            international_multiplier,
            ..BudgetSignals::default()
        };
        let breakdown = synthesize(&suggestion(), &signals);
        assert_eq!(breakdown.international_multiplier, 1.5);
        // 140000 * 1.5 * 1.18 * 1.16
        assert_eq!(breakdown.total, 287_448);
    }

    #[test]
    fn test_location_switch_cost() {
        let mut s = suggestion();
        s.locations = 3;
        let breakdown = synthesize(&s, &BudgetSignals::default());
        assert_eq!(breakdown.additive_total, 140_000.0 + 2.0 * 20_000.0);
        // 180000 * 1.18 * 1.16
        assert_eq!(breakdown.total, 246_384);
    }

    #[test]
    fn test_multiplier_chain_order() {
        let mut s = suggestion();
        s.days_in_oslo = 0;
        s.days_out_of_oslo = 2;
        s.locations = 2;
        let signals = BudgetSignals {
            far_region: true,
            international_multiplier: 1.2,
            nature: true,
            ..BudgetSignals::default()
        };
        let breakdown = synthesize(&s, &signals);
        // (280000 + 80000 travel + 20000 switch) * 1.30 * 1.2 * 1.18 * 1.21 * 1.05 * 1.16
        assert_eq!(breakdown.additive_total, 380_000.0);
        assert!((breakdown.away_premium - 0.21).abs() < 1e-9);
        assert_eq!(breakdown.total, 1_030_915);
    }

    #[test]
    fn test_fixer_rate_and_major_floor() {
        let mut s = suggestion();
        s.crew_type = CrewType::Fixer;
        assert_eq!(synthesize(&s, &BudgetSignals::default()).base_daily_rate, 84_000.0);

        let signals = BudgetSignals {
            major_production: true,
            ..BudgetSignals::default()
        };
        assert_eq!(synthesize(&s, &signals).base_daily_rate, 300_000.0);
    }

    #[test]
    fn test_zero_days_still_costs_line_items() {
        let mut s = suggestion();
        s.days_in_oslo = 0;
        s.include_scout = true;
        let breakdown = synthesize(&s, &BudgetSignals::default());
        assert_eq!(breakdown.additive_total, 50_000.0);
    }

    #[test]
    fn test_away_days_add_travel_freight_and_premium() {
        let mut s = suggestion();
        s.days_in_oslo = 0;
        s.days_out_of_oslo = 3;
        s.equipment = vec![EquipmentItem::new(EquipmentKind::Drone, 3)];
        let breakdown = synthesize(&s, &BudgetSignals::default());
        // 140000*3 + 15000*3 + 40000*3 + 1*3*4000
        assert_eq!(breakdown.additive_total, 597_000.0);
        assert_eq!(breakdown.domestic_multiplier, REGIONAL_MULTIPLIER);
        assert!((breakdown.away_premium - 0.26).abs() < 1e-9);
    }

    #[test]
    fn test_away_premium_is_capped() {
        let mut s = suggestion();
        s.days_out_of_oslo = 10;
        let breakdown = synthesize(&s, &BudgetSignals::default());
        assert_eq!(breakdown.away_premium, AWAY_PREMIUM_CAP);
    }

    #[test]
    fn test_nationality_takes_maximum() {
        let (matched, multiplier) = detect_nationality("a swedish and american co-production");
        assert_eq!(matched, vec![Nationality::American, Nationality::Nordic]);
        assert_eq!(multiplier, 1.5);
        assert_eq!(detect_nationality("local brand").1, 1.0);
    }

    #[test]
    fn test_unknown_equipment_uses_default_cost() {
        let mut s = suggestion();
        s.equipment = vec![EquipmentItem {
            kind: "hovercraft".to_string(),
            days: 2,
        }];
        let breakdown = synthesize(&s, &BudgetSignals::default());
        assert_eq!(breakdown.additive_total, 140_000.0 + 60_000.0);
    }
}
