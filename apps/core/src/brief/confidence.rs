//! Confidence scoring from signal presence.

const BASE: f64 = 0.5;
const PER_SIGNAL: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 0.95;
const LONG_TEXT_CHARS: usize = 200;
const SHORT_TEXT_CHARS: usize = 50;
const SHORT_TEXT_PENALTY: f64 = 0.7;

/// Which signals were present in the brief.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfidenceInputs {
    pub production_type: bool,
    pub region: bool,
    pub equipment: bool,
    pub explicit_days: bool,
    /// Length of the normalized text in characters.
    pub text_length: usize,
}

/// Base 0.5, +0.1 per signal, capped at 0.95, penalized for short text, 2 decimals.
pub fn score(inputs: &ConfidenceInputs) -> f64 {
    let present = [
        inputs.production_type,
        inputs.region,
        inputs.equipment,
        inputs.explicit_days,
        inputs.text_length > LONG_TEXT_CHARS,
    ]
    .iter()
    .filter(|p| **p)
    .count();

    let mut confidence = (BASE + PER_SIGNAL * present as f64).min(MAX_CONFIDENCE);
    if inputs.text_length < SHORT_TEXT_CHARS {
        confidence *= SHORT_TEXT_PENALTY;
    }
    round2(confidence)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp a confidence from any source into the reportable range.
pub fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_CONFIDENCE)
    }
}
