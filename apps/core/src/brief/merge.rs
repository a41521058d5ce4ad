//! Merging a remote augmentation result onto the local analysis.

use serde::{Deserialize, Serialize};

use super::classifier::{CrewType, ProductionType};
use super::confidence;
use super::equipment::EquipmentItem;
use super::result::AnalysisResult;

/// Prefix marking reasons that came from the augmentation backend.
pub const REMOTE_REASON_PREFIX: &str = "[backend] ";

/// Partial suggestion as returned by the augmentation backend. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSuggestion {
    pub production_type: Option<ProductionType>,
    pub crew_type: Option<CrewType>,
    pub days_in_oslo: Option<u32>,
    pub days_out_of_oslo: Option<u32>,
    pub locations: Option<u32>,
    pub equipment: Option<Vec<EquipmentItem>>,
    #[serde(rename = "budgetNOK")]
    pub budget_nok: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteDetails {
    pub reasons: Vec<String>,
}

/// Response body of the augmentation backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteAnalysis {
    pub suggestions: Option<RemoteSuggestion>,
    pub confidence: Option<f64>,
    pub details: Option<RemoteDetails>,
}

/// Union two equipment lists by type, keeping the larger day count per type.
/// Local order is preserved; remote-only types are appended in remote order.
fn merge_equipment(local: &mut Vec<EquipmentItem>, remote: Vec<EquipmentItem>) {
    for item in remote {
        match local.iter_mut().find(|existing| existing.kind == item.kind) {
            Some(existing) => existing.days = existing.days.max(item.days),
            None => local.push(item),
        }
    }
}

/// Merge `remote` onto `local`.
///
/// Remote production type and crew model win; numeric fields take the maximum of both
/// sides; confidence is the larger of the two, clamped to the reportable range.
pub fn merge_remote(mut local: AnalysisResult, remote: RemoteAnalysis) -> AnalysisResult {
    if let Some(remote_suggestion) = remote.suggestions {
        let s = &mut local.suggestions;
        if let Some(production_type) = remote_suggestion.production_type {
            s.production_type = production_type;
        }
        if let Some(crew_type) = remote_suggestion.crew_type {
            s.crew_type = crew_type;
        }
        if let Some(days) = remote_suggestion.days_in_oslo {
            s.days_in_oslo = s.days_in_oslo.max(days);
        }
        if let Some(days) = remote_suggestion.days_out_of_oslo {
            s.days_out_of_oslo = s.days_out_of_oslo.max(days);
        }
        if let Some(locations) = remote_suggestion.locations {
            s.locations = s.locations.max(locations);
        }
        if let Some(budget) = remote_suggestion.budget_nok {
            s.budget_nok = s.budget_nok.max(budget);
        }
        if let Some(equipment) = remote_suggestion.equipment {
            merge_equipment(&mut s.equipment, equipment);
        }
        s.locations = s.locations.max(1);
    }

    if let Some(remote_confidence) = remote.confidence {
        local.confidence = local.confidence.max(confidence::clamp(remote_confidence));
    }

    local.push_reason("Backend augmentation merged");
    if let Some(details) = remote.details {
        for reason in details.reasons {
            local.push_reason(format!("{}{}", REMOTE_REASON_PREFIX, reason));
        }
    }

    local
}
