//! Creatives line-item decision.

use std::sync::LazyLock;

use super::classifier::CrewType;
use super::language::Language;
use super::rules::Rule;

static OWN_CREATIVES: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "own director", "own team", "own photographer", "own creatives",
            "(?:bring|brings|bringing) (?:our|their|its) own", "we have our own",
            "client brings", "egen regissør", "eget team", "egen fotograf", "egne kreative",
            "vi har egen", "kunden har med",
        ],
    )
});

static STORYTELLING: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "narrative", "narrativ\\w*", "storytelling", "historiefortelling", "mood\\w*",
            "stemning\\w*", "tone", "tonalitet", "symbolism", "symbolikk", "characters?",
            "karakter\\w*",
        ],
    )
});

static SERVICE_PRODUCTION: LazyLock<Rule<(), ()>> = LazyLock::new(|| {
    Rule::new(
        (),
        (),
        &[
            "service production", "production services?", "serviceproduksjon",
            "line produc\\w*",
        ],
    )
});

/// Outcome of the creatives decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreativesDecision {
    pub include_creatives: bool,
    pub has_own_creatives: bool,
    pub storytelling: bool,
    pub language_nudge: bool,
}

/// Decide the creatives line item.
///
/// Starts from the crew model (fixer only), then: the client bringing its own team wins,
/// storytelling cues force creatives on, and only an undecided brief gets the language
/// nudge (Norwegian on, English off when service-production cues co-occur).
pub fn decide_creatives(text: &str, crew: CrewType, language: Language) -> CreativesDecision {
    let mut include = crew == CrewType::Fixer;
    let mut decided = false;

    let has_own_creatives = OWN_CREATIVES.is_match(text);
    if has_own_creatives {
        include = false;
        decided = true;
    }

    let storytelling = STORYTELLING.is_match(text);
    if storytelling && !has_own_creatives {
        include = true;
        decided = true;
    }

    let mut language_nudge = false;
    if !decided {
        match language {
            Language::No => {
                include = true;
                language_nudge = true;
            }
            Language::En if SERVICE_PRODUCTION.is_match(text) => {
                include = false;
                language_nudge = true;
            }
            _ => {}
        }
    }

    CreativesDecision {
        include_creatives: include,
        has_own_creatives,
        storytelling,
        language_nudge,
    }
}
