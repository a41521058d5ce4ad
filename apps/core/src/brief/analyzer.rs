//! Brief Analyzer - main orchestrator for the brief module.
//!
//! Runs the synchronous stages in order, appending one or more reasons per stage:
//! normalize, language, classify, region/scene, gazetteer, creatives, explicit days and
//! locations, equipment, budget, confidence.
//!
//! The explicit day parser runs before equipment extraction because the drone default
//! depends on the stated total and the final location count.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::budget::{detect_nationality, is_major_production, synthesize, BudgetSignals};
use super::classifier::{classify_crew, classify_production_type, CrewType, ProductionType};
use super::confidence::{self, ConfidenceInputs};
use super::creatives::decide_creatives;
use super::days::{count_locations, detect_total_days, redistribute};
use super::equipment::{creative_rig, extract_equipment, EquipmentContext, EquipmentItem};
use super::geo::{combined_boost, match_places, TripKind};
use super::language::{detect_language, normalize};
use super::region::{apply_scene, detect_scene, infer_regions, RegionId};
use super::result::{AnalysisResult, Details, Suggestion};

/// Stage boundaries reported to a [`StageObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Normalize,
    Language,
    Classify,
    Region,
    Geo,
    Creatives,
    Days,
    Equipment,
    Budget,
    Confidence,
    OnlineGeocode,
    Augmentation,
}

/// Receives a callback after each stage with the details accumulated so far.
pub trait StageObserver: Send + Sync {
    fn on_stage(&self, stage: Stage, details: &Details);
}

/// Main brief analyzer. Holds no per-call state; one instance can serve any number of
/// concurrent callers.
#[derive(Clone, Default)]
pub struct BriefAnalyzer {
    observer: Option<Arc<dyn StageObserver>>,
}

impl BriefAnalyzer {
    pub fn new() -> Self {
        Self { observer: None }
    }

    pub fn with_observer(observer: Arc<dyn StageObserver>) -> Self {
        Self {
            observer: Some(observer),
        }
    }

    pub(crate) fn notify(&self, stage: Stage, details: &Details) {
        debug!(?stage, reasons = details.reasons.len(), "Brief stage complete");
        if let Some(observer) = &self.observer {
            observer.on_stage(stage, details);
        }
    }

    /// Analyze a brief and produce a suggestion, confidence and explanation trail.
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let Some(lower) = normalize(text) else {
            let result = AnalysisResult::invalid_input();
            self.notify(Stage::Normalize, &result.details);
            return result;
        };

        let mut details = Details::default();
        let text_length = lower.chars().count();
        details.signals.text_length = text_length;
        self.notify(Stage::Normalize, &details);

        // 1. Language
        let language = detect_language(&lower);
        details.signals.language = Some(language.label);
        details
            .scores
            .language
            .insert("no".to_string(), language.norwegian);
        details
            .scores
            .language
            .insert("en".to_string(), language.english);
        details.reasons.push(format!(
            "Language: {} (no {} / en {})",
            language.label.code(),
            language.norwegian,
            language.english
        ));
        self.notify(Stage::Language, &details);

        // 2. Production type and crew model
        let type_decision = classify_production_type(&lower);
        let production_type = type_decision.production_type;
        details.scores.production_type = type_decision.scores.clone();
        details.reasons.push(match type_decision.winning_score {
            Some(score) => format!("Production type: {} (score {})", production_type, score),
            None => format!("Production type: {} (default, no type cues)", production_type),
        });

        let crew = classify_crew(&lower, production_type, language.label);
        details
            .scores
            .crew_type
            .insert(CrewType::FullCrew, crew.full_crew_score);
        details.scores.crew_type.insert(CrewType::Fixer, crew.fixer_score);
        details.reasons.push(format!(
            "Crew model: {} (fullCrew {} vs fixer {})",
            crew.crew_type, crew.full_crew_score, crew.fixer_score
        ));
        self.notify(Stage::Classify, &details);

        // 3. Regions and scene cues
        let region = infer_regions(&lower);
        details.signals.regions = region.regions.clone();
        if region.regions.is_empty() {
            details
                .reasons
                .push("No region matched: defaulting to 2 city days".to_string());
        } else {
            let names: Vec<&str> = region.regions.iter().map(RegionId::label).collect();
            details.reasons.push(format!(
                "Regions matched: {} ({} city / {} away)",
                names.join(", "),
                region.split.city,
                region.split.away
            ));
        }

        let scene = detect_scene(&lower);
        let mut split = apply_scene(region.split, &scene, &mut details.reasons);
        details.signals.scene = scene.clone();

        let mut include_scout = region.include_scout;
        if include_scout {
            details
                .reasons
                .push("Scouting requested by region template".to_string());
        }
        self.notify(Stage::Region, &details);

        // 4. Gazetteer
        let places = match_places(&lower);
        for place in &places {
            let kind = match place.kind {
                TripKind::CityTrip => "city trip",
                TripKind::AwayTrip => "away trip",
            };
            details.reasons.push(format!(
                "Gazetteer: {} is {:.0} km from Oslo ({})",
                place.name, place.distance_km, kind
            ));
        }
        let boost = combined_boost(&places);
        if !places.is_empty() {
            split = boost.apply_floor(split);
            details.reasons.push(format!(
                "Geo boost: at least {} city / {} away day(s)",
                boost.city, boost.away
            ));
        }
        if boost.requires_scout() && !include_scout {
            include_scout = true;
            details
                .reasons
                .push("Scouting added for a distant location".to_string());
        }
        details.signals.places = places;
        details.signals.geo_boost = boost;
        self.notify(Stage::Geo, &details);

        // 5. Creatives
        let creatives = decide_creatives(&lower, crew.crew_type, language.label);
        details.signals.has_own_creatives = creatives.has_own_creatives;
        details.reasons.push(if creatives.has_own_creatives {
            "Creatives excluded: client brings own team".to_string()
        } else if creatives.storytelling {
            "Creatives included: storytelling cues".to_string()
        } else if creatives.language_nudge {
            format!(
                "Creatives {} by language ({})",
                if creatives.include_creatives { "included" } else { "excluded" },
                language.label.code()
            )
        } else {
            format!(
                "Creatives {} by crew model",
                if creatives.include_creatives { "included" } else { "excluded" }
            )
        });
        self.notify(Stage::Creatives, &details);

        // 6. Explicit days and locations
        let explicit_days = detect_total_days(&lower);
        details.signals.explicit_days = explicit_days;
        if explicit_days > 0 {
            split = redistribute(split, explicit_days);
            details.reasons.push(format!(
                "Explicit total of {} day(s): {} city / {} away",
                explicit_days, split.city, split.away
            ));
        }
        let locations = count_locations(&lower, region.regions.len(), &scene);
        details.reasons.push(format!("Locations: {}", locations));
        self.notify(Stage::Days, &details);

        // 7. Equipment
        let mut equipment = extract_equipment(
            &lower,
            EquipmentContext {
                explicit_total_days: explicit_days,
                away_days: split.away,
                locations,
            },
        );
        details.signals.equipment_matches = equipment.iter().map(|i| i.kind.clone()).collect();
        for item in &equipment {
            details
                .reasons
                .push(format!("Equipment: {} for {} day(s)", item.kind, item.days));
        }
        if creatives.include_creatives && equipment.is_empty() {
            let rig = creative_rig(split.total());
            details.reasons.push(format!(
                "Equipment: specialized creative rig for {} day(s)",
                rig.days
            ));
            equipment.push(rig);
        }
        self.notify(Stage::Equipment, &details);

        // 8. Budget
        let (nationalities, international_multiplier) = detect_nationality(&lower);
        let budget_signals = BudgetSignals {
            far_region: region.has_far_region(),
            regional_match: region.has_regional_match(),
            international_multiplier,
            nature: scene.has_nature(),
            major_production: is_major_production(&lower),
        };
        details.signals.nationalities = nationalities;
        details.signals.budget = budget_signals;

        let mut suggestion = Suggestion {
            production_type,
            crew_type: crew.crew_type,
            include_scout,
            include_creatives: creatives.include_creatives,
            days_in_oslo: split.city,
            days_out_of_oslo: split.away,
            locations,
            equipment,
            budget_nok: 0,
        };
        let breakdown = synthesize(&suggestion, &budget_signals);
        suggestion.budget_nok = breakdown.total;
        details.reasons.push(format!(
            "Budget: {} NOK ({} day(s) at {:.0} NOK/day)",
            breakdown.total, breakdown.total_days, breakdown.base_daily_rate
        ));
        details.scores.budget = Some(breakdown);
        self.notify(Stage::Budget, &details);

        // 9. Confidence
        let confidence = confidence::score(&ConfidenceInputs {
            production_type: true,
            region: !region.regions.is_empty(),
            equipment: !details.signals.equipment_matches.is_empty(),
            explicit_days: explicit_days > 0,
            text_length,
        });
        details
            .reasons
            .push(format!("Confidence: {:.2}", confidence));
        self.notify(Stage::Confidence, &details);

        let result = AnalysisResult {
            suggestions: suggestion,
            confidence,
            details,
        };
        info!("Brief analyzed: {}", result.summary());
        result
    }

    /// Production type only; same path as [`analyze`](Self::analyze).
    pub fn production_type(&self, text: &str) -> ProductionType {
        self.analyze(text).suggestions.production_type
    }

    /// Crew model only; same path as [`analyze`](Self::analyze).
    pub fn crew_type(&self, text: &str) -> CrewType {
        self.analyze(text).suggestions.crew_type
    }

    /// Location count only; same path as [`analyze`](Self::analyze).
    pub fn locations(&self, text: &str) -> u32 {
        self.analyze(text).suggestions.locations
    }

    /// Equipment list only; same path as [`analyze`](Self::analyze).
    pub fn equipment(&self, text: &str) -> Vec<EquipmentItem> {
        self.analyze(text).suggestions.equipment
    }
}

/// Recompute the budget after a refinement stage changed the suggestion.
pub fn rebudget(result: &mut AnalysisResult) {
    let breakdown = synthesize(&result.suggestions, &result.details.signals.budget);
    result.suggestions.budget_nok = breakdown.total;
    result.details.scores.budget = Some(breakdown);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<Stage>>,
    }

    impl StageObserver for Recorder {
        fn on_stage(&self, stage: Stage, _details: &Details) {
            self.stages.lock().unwrap().push(stage);
        }
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let result = BriefAnalyzer::new().analyze("   ");
        assert_eq!(result, AnalysisResult::invalid_input());
    }

    #[test]
    fn test_observer_sees_every_stage_in_order() {
        let recorder = Arc::new(Recorder::default());
        let analyzer = BriefAnalyzer::with_observer(recorder.clone());
        analyzer.analyze("reklamefilm i oslo");

        let stages = recorder.stages.lock().unwrap().clone();
        assert_eq!(
            stages,
            vec![
                Stage::Normalize,
                Stage::Language,
                Stage::Classify,
                Stage::Region,
                Stage::Geo,
                Stage::Creatives,
                Stage::Days,
                Stage::Equipment,
                Stage::Budget,
                Stage::Confidence,
            ]
        );
    }

    #[test]
    fn test_observer_on_invalid_input() {
        let recorder = Arc::new(Recorder::default());
        BriefAnalyzer::with_observer(recorder.clone()).analyze("");
        assert_eq!(*recorder.stages.lock().unwrap(), vec![Stage::Normalize]);
    }

    #[test]
    fn test_rebudget_tracks_day_changes() {
        let mut result = BriefAnalyzer::new().analyze("commercial shoot in oslo studio");
        let before = result.suggestions.budget_nok;
        result.suggestions.days_out_of_oslo += 2;
        rebudget(&mut result);
        assert!(result.suggestions.budget_nok > before);
    }
}
