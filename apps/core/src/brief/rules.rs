//! Declarative rule tables.
//!
//! Every pattern-scored category in the engine (production type, crew model, region
//! templates, scene types, equipment, nationality) is a [`Rule`] with an id, a weight
//! payload and a combined matcher. Stages iterate the tables generically instead of
//! branching per category.

use regex::{Captures, Regex};

/// Number words understood as counts (1-10, English and Norwegian).
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("en", 1),
    ("ett", 1),
    ("én", 1),
    ("to", 2),
    ("tre", 3),
    ("fire", 4),
    ("fem", 5),
    ("seks", 6),
    ("sju", 7),
    ("syv", 7),
    ("åtte", 8),
    ("ni", 9),
    ("ti", 10),
];

const ENGLISH_COUNT_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten";
const NORWEGIAN_COUNT_WORDS: &str = "en|ett|én|to|tre|fire|fem|seks|sju|syv|åtte|ni|ti";

/// English day units.
pub const ENGLISH_DAY_UNITS: &str = "shooting days?|shoot days?|days?";
/// Norwegian day units.
pub const NORWEGIAN_DAY_UNITS: &str = "opptaksdager|opptaksdag|dagers|dager|dag|døgn";
/// English location units.
pub const ENGLISH_LOCATION_UNITS: &str = "locations?";
/// Norwegian location units.
pub const NORWEGIAN_LOCATION_UNITS: &str = "lokasjoner|lokasjon|steder";

/// Regex fragment for a count followed by a unit, with the count in capture group 1, 2 or 3
/// (read it with [`captured_count`]).
///
/// Digits may touch their unit ("3days", "4-day"). Number words need a space or hyphen and
/// a unit in the same language, so "today", "to locations" and "day to day" carry no count.
/// `between` is inserted after a number word's separator, e.g. an optional adjective.
pub fn counted_units(english_units: &str, norwegian_units: &str, between: &str) -> String {
    format!(
        r"(?:(\d{{1,3}})\s*(?:-\s*)?{between}(?:{en_units}|{no_units})|({en_words})(?:\s*-\s*|\s+){between}(?:{en_units})|({no_words})(?:\s*-\s*|\s+){between}(?:{no_units}))",
        between = between,
        en_units = english_units,
        no_units = norwegian_units,
        en_words = ENGLISH_COUNT_WORDS,
        no_words = NORWEGIAN_COUNT_WORDS,
    )
}

/// Count-and-day-unit fragment ("5 dager", "three days", "a 4-day").
pub fn day_count_fragment() -> String {
    counted_units(ENGLISH_DAY_UNITS, NORWEGIAN_DAY_UNITS, "")
}

/// Count captured by a [`counted_units`] fragment.
pub fn captured_count(caps: &Captures) -> Option<u32> {
    (1..=3)
        .find_map(|group| caps.get(group))
        .and_then(|m| parse_count(m.as_str()))
}

/// Parse a digit or number-word count token.
pub fn parse_count(token: &str) -> Option<u32> {
    if let Ok(n) = token.parse::<u32>() {
        return Some(n);
    }
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, n)| *n)
}

/// Compile a static pattern. Panics on an invalid pattern.
pub fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid regex {pattern:?}: {e}"))
}

/// One category of a rule table.
#[derive(Debug, Clone)]
pub struct Rule<Id, W> {
    pub id: Id,
    pub weight: W,
    matcher: Regex,
}

impl<Id: Copy, W: Copy> Rule<Id, W> {
    /// Build a rule whose matcher is the whole-word union of `alternatives`.
    pub fn new(id: Id, weight: W, alternatives: &[&str]) -> Self {
        let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
        Self {
            id,
            weight,
            matcher: compile(&pattern),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Number of non-overlapping matches of the combined pattern.
    pub fn count(&self, text: &str) -> usize {
        self.matcher.find_iter(text).count()
    }

    /// Byte spans of every match, in text order.
    pub fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.matcher
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

/// An ordered set of rules sharing an id and weight type.
#[derive(Debug, Clone)]
pub struct RuleTable<Id, W> {
    rules: Vec<Rule<Id, W>>,
}

impl<Id: Copy + PartialEq, W: Copy> RuleTable<Id, W> {
    pub fn new(rules: Vec<Rule<Id, W>>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule<Id, W>> {
        self.rules.iter()
    }

    pub fn get(&self, id: Id) -> Option<&Rule<Id, W>> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Rules whose matcher fires on `text`, in table order.
    pub fn matched<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a Rule<Id, W>> + 'a {
        self.rules.iter().filter(move |r| r.is_match(text))
    }

    pub fn matched_ids(&self, text: &str) -> Vec<Id> {
        self.matched(text).map(|r| r.id).collect()
    }

    pub fn any_match(&self, text: &str) -> bool {
        self.rules.iter().any(|r| r.is_match(text))
    }
}
