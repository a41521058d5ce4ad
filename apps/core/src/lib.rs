//! Production-brief analysis engine.
//!
//! [`brief::BriefAnalyzer`] turns free text into a prefilled production suggestion
//! synchronously; [`adapters::Refiner`] optionally refines it with online geocoding and
//! a remote augmentation backend.

pub mod adapters;
pub mod brief;
pub mod config;
pub mod error;

pub use adapters::Refiner;
pub use brief::{AnalysisResult, BriefAnalyzer};
pub use config::EngineConfig;
pub use error::AppError;

#[cfg(test)]
mod tests;
