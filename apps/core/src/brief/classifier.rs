//! Lexical classification of production type and crew model.
//!
//! Production type is weighted by match count; crew model is scored on presence only and
//! then nudged by the production type, the brief language and specialized-equipment cues.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use super::language::Language;
use super::rules::{Rule, RuleTable};

/// Points added per match of a production-type pattern.
const MATCH_POINTS: u32 = 5;
/// Crew bonus derived from the production type.
const TYPE_CREW_BONUS: u32 = 20;
/// Fixer bonus for English briefs without an explicit full-crew cue.
const ENGLISH_FIXER_BONUS: u32 = 6;
/// Full-crew bonus when underwater/stunt/helicopter/crane work is mentioned.
const SPECIALIZED_CREW_BONUS: u32 = 50;

/// Production category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductionType {
    Film,
    Commercial,
    Stills,
    Documentary,
}

impl ProductionType {
    pub fn label(&self) -> &'static str {
        match self {
            ProductionType::Film => "film",
            ProductionType::Commercial => "commercial",
            ProductionType::Stills => "stills",
            ProductionType::Documentary => "documentary",
        }
    }
}

impl fmt::Display for ProductionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Crew model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrewType {
    FullCrew,
    Fixer,
}

impl CrewType {
    pub fn label(&self) -> &'static str {
        match self {
            CrewType::FullCrew => "fullCrew",
            CrewType::Fixer => "fixer",
        }
    }
}

impl fmt::Display for CrewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static PRODUCTION_TYPES: LazyLock<RuleTable<ProductionType, u32>> = LazyLock::new(|| {
    RuleTable::new(vec![
        Rule::new(
            ProductionType::Film,
            30,
            &[
                "film", "spillefilm", "kortfilm", "feature", "short film", "movie", "series",
                "serie", "tv-serie", "drama", "music video", "musikkvideo",
            ],
        ),
        Rule::new(
            ProductionType::Commercial,
            25,
            &[
                "commercial", "reklame\\w*", "ad", "ads", "advert\\w*", "campaign", "kampanje\\w*",
                "brand\\w*", "tvc", "spot",
            ],
        ),
        Rule::new(
            ProductionType::Stills,
            20,
            &[
                "stills", "photo\\w*", "foto\\w*", "bilder", "lookbook", "editorial",
                "catalog\\w*", "katalog\\w*",
            ],
        ),
        Rule::new(
            ProductionType::Documentary,
            15,
            &[
                "documentar\\w*", "dokumentar\\w*", "doc", "docu\\w*", "reportage",
                "reportasje", "interview\\w*", "intervju\\w*",
            ],
        ),
    ])
});

static CREW_TYPES: LazyLock<RuleTable<CrewType, u32>> = LazyLock::new(|| {
    RuleTable::new(vec![
        Rule::new(
            CrewType::FullCrew,
            30,
            &[
                "full crew", "fullt crew", "full production", "full produksjon",
                "production company", "produksjonsselskap", "crew of \\d+", "hele crewet",
                "dop", "cinematographer", "gaffer", "grips?", "art department",
                "scenograf\\w*",
            ],
        ),
        Rule::new(
            CrewType::Fixer,
            15,
            &[
                "fixer", "local fixer", "lokal fixer", "permits?", "tillatelser?",
                "location manager", "logistics", "logistikk", "facilitation", "local support",
                "small team", "lite team",
            ],
        ),
    ])
});

static SPECIALIZED_CREW_CUES: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "underwater", "undervanns\\w*", "under vann", "stunt\\w*", "helicopter",
            "helikopter\\w*", "crane", "kran",
        ],
    )
});

/// Production type decision with per-category scores.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecision {
    pub production_type: ProductionType,
    /// `None` when no category matched and the default was used.
    pub winning_score: Option<u32>,
    pub scores: BTreeMap<ProductionType, u32>,
}

/// Crew model decision with final (post-modifier) scores.
#[derive(Debug, Clone, PartialEq)]
pub struct CrewDecision {
    pub crew_type: CrewType,
    pub full_crew_score: u32,
    pub fixer_score: u32,
    pub explicit_full_crew: bool,
    pub specialized_cues: bool,
}

/// Score production type: weight + 5 per match; highest wins, `commercial` if none match.
pub fn classify_production_type(text: &str) -> TypeDecision {
    let mut scores = BTreeMap::new();
    let mut best: Option<(ProductionType, u32)> = None;

    for rule in PRODUCTION_TYPES.iter() {
        let count = rule.count(text) as u32;
        if count == 0 {
            continue;
        }
        let score = rule.weight + MATCH_POINTS * count;
        scores.insert(rule.id, score);
        // Table order breaks ties.
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((rule.id, score));
        }
    }

    TypeDecision {
        production_type: best.map_or(ProductionType::Commercial, |(t, _)| t),
        winning_score: best.map(|(_, s)| s),
        scores,
    }
}

/// Whether the brief mentions underwater, stunt, helicopter or crane work.
pub fn has_specialized_cues(text: &str) -> bool {
    SPECIALIZED_CREW_CUES.is_match(text)
}

/// Score crew model. Ties resolve to fixer.
pub fn classify_crew(text: &str, production_type: ProductionType, language: Language) -> CrewDecision {
    let weight_if = |id: CrewType| {
        CREW_TYPES
            .get(id)
            .filter(|rule| rule.is_match(text))
            .map_or(0, |rule| rule.weight)
    };

    let mut full_crew = weight_if(CrewType::FullCrew);
    let mut fixer = weight_if(CrewType::Fixer);
    let explicit_full_crew = full_crew > 0;

    match production_type {
        ProductionType::Film | ProductionType::Commercial => full_crew += TYPE_CREW_BONUS,
        ProductionType::Documentary | ProductionType::Stills => fixer += TYPE_CREW_BONUS,
    }

    if language == Language::En && !explicit_full_crew {
        fixer += ENGLISH_FIXER_BONUS;
    }

    let specialized_cues = has_specialized_cues(text);
    if specialized_cues {
        full_crew += SPECIALIZED_CREW_BONUS;
    }

    let crew_type = if full_crew > fixer {
        CrewType::FullCrew
    } else {
        CrewType::Fixer
    };

    CrewDecision {
        crew_type,
        full_crew_score: full_crew,
        fixer_score: fixer,
        explicit_full_crew,
        specialized_cues,
    }
}
