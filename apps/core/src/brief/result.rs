//! Analysis Result - output structure of the brief engine.
//!
//! Field names serialize in camelCase (`daysInOslo`, `budgetNOK`) to match the budgeting
//! form that consumes them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::budget::{BudgetBreakdown, BudgetSignals, Nationality};
use super::classifier::{CrewType, ProductionType};
use super::equipment::EquipmentItem;
use super::geo::{GeoBoost, PlaceMatch};
use super::language::Language;
use super::region::{RegionId, SceneHints};

/// Confidence reported for empty input.
pub const INVALID_INPUT_CONFIDENCE: f64 = 0.1;
/// Budget reported for empty input (NOK).
pub const INVALID_INPUT_BUDGET: u64 = 150_000;

/// Prefill values for the budgeting form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub production_type: ProductionType,
    pub crew_type: CrewType,
    pub include_scout: bool,
    pub include_creatives: bool,
    pub days_in_oslo: u32,
    pub days_out_of_oslo: u32,
    pub locations: u32,
    pub equipment: Vec<EquipmentItem>,
    #[serde(rename = "budgetNOK")]
    pub budget_nok: u64,
}

impl Suggestion {
    pub fn total_days(&self) -> u32 {
        self.days_in_oslo + self.days_out_of_oslo
    }
}

impl Default for Suggestion {
    /// The canned suggestion returned for empty input.
    fn default() -> Self {
        Self {
            production_type: ProductionType::Commercial,
            crew_type: CrewType::Fixer,
            include_scout: false,
            include_creatives: true,
            days_in_oslo: 1,
            days_out_of_oslo: 0,
            locations: 1,
            equipment: vec![],
            budget_nok: INVALID_INPUT_BUDGET,
        }
    }
}

/// Raw category scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub language: BTreeMap<String, u32>,
    pub production_type: BTreeMap<ProductionType, u32>,
    pub crew_type: BTreeMap<CrewType, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetBreakdown>,
}

/// Read-only facts derived from the brief.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    pub language: Option<Language>,
    pub regions: Vec<RegionId>,
    pub scene: SceneHints,
    pub explicit_days: u32,
    pub equipment_matches: Vec<String>,
    pub places: Vec<PlaceMatch>,
    /// Places resolved by the online geocoder, if it ran.
    pub online_places: Vec<PlaceMatch>,
    pub geo_boost: GeoBoost,
    pub nationalities: Vec<Nationality>,
    pub has_own_creatives: bool,
    pub text_length: usize,
    pub budget: BudgetSignals,
}

/// Explanation trail and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    /// Append-only, in stage order.
    pub reasons: Vec<String>,
    pub scores: Scores,
    pub signals: Signals,
}

/// Complete result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub suggestions: Suggestion,
    pub confidence: f64,
    pub details: Details,
}

impl AnalysisResult {
    /// The fixed result for empty or invalid input.
    pub fn invalid_input() -> Self {
        Self {
            suggestions: Suggestion::default(),
            confidence: INVALID_INPUT_CONFIDENCE,
            details: Details {
                reasons: vec!["No input text provided".to_string()],
                ..Details::default()
            },
        }
    }

    pub fn push_reason(&mut self, reason: impl Into<String>) {
        self.details.reasons.push(reason.into());
    }

    /// One-line summary for logging.
    pub fn summary(&self) -> String {
        let s = &self.suggestions;
        format!(
            "{} / {}, {}+{} days, {} location(s), {} equipment, {} NOK, confidence {:.2}",
            s.production_type,
            s.crew_type,
            s.days_in_oslo,
            s.days_out_of_oslo,
            s.locations,
            s.equipment.len(),
            s.budget_nok,
            self.confidence
        )
    }
}
