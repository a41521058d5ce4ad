//! # Brief Module
//!
//! Heuristic analysis of free-text production briefs. Turns a paragraph describing a
//! film or photo shoot into prefill values for the budgeting form.
//!
//! ## Components
//! - `rules`: uniform `{id, weight, matchers}` rule tables
//! - `language`: normalization and Norwegian/English detection
//! - `classifier`: production type and crew model
//! - `region`: region day templates and scene cues
//! - `geo`: gazetteer, haversine distance and day boosts
//! - `creatives`: creatives line-item decision
//! - `days`: explicit day totals and location count
//! - `equipment`: equipment detection with day spans
//! - `budget`: budget synthesis
//! - `confidence`: confidence scoring
//! - `merge`: merging a remote augmentation result
//! - `result`: output data structures
//! - `analyzer`: main orchestrator

pub mod analyzer;
pub mod budget;
pub mod classifier;
pub mod confidence;
pub mod creatives;
pub mod days;
pub mod equipment;
pub mod geo;
pub mod language;
pub mod merge;
pub mod region;
pub mod result;
pub mod rules;

pub use analyzer::{rebudget, BriefAnalyzer, Stage, StageObserver};
pub use classifier::{CrewType, ProductionType};
pub use equipment::{EquipmentItem, EquipmentKind};
pub use geo::{Coordinate, GeoBoost, PlaceMatch, CITY_TRIP_THRESHOLD_KM, HOME};
pub use language::Language;
pub use merge::{merge_remote, RemoteAnalysis, RemoteDetails, RemoteSuggestion};
pub use region::{DaySplit, RegionId, SceneType};
pub use result::{AnalysisResult, Details, Scores, Signals, Suggestion};
