use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::brief::{
    AnalysisResult, Coordinate, PlaceMatch, RemoteAnalysis, Signals, Suggestion,
    CITY_TRIP_THRESHOLD_KM, HOME,
};
use crate::error::Result;

/// A resolved place from an external geocoding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeHit {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country_code: String,
}

/// Defines the interface for resolving a short place-name query to a coordinate.
///
/// Implementations may be network-backed; the refinement stage applies its own timeout
/// and never lets an error reach the caller.
#[async_trait]
pub trait Geocoder: Send + Sync + 'static {
    /// Resolve `query`. `Ok(None)` means the provider found nothing.
    async fn lookup(&self, query: &str) -> Result<Option<GeocodeHit>>;
}

/// Context sent alongside the brief to the augmentation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentContext {
    pub home: Coordinate,
    pub threshold_km: f64,
    pub offline_places: Vec<PlaceMatch>,
    pub suggestion: Suggestion,
    pub signals: Signals,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentRequest {
    pub text: String,
    pub context: AugmentContext,
}

impl AugmentRequest {
    /// Build the request from the (possibly geocode-refined) local result.
    pub fn new(text: &str, result: &AnalysisResult) -> Self {
        Self {
            text: text.to_string(),
            context: AugmentContext {
                home: HOME,
                threshold_km: CITY_TRIP_THRESHOLD_KM,
                offline_places: result.details.signals.places.clone(),
                suggestion: result.suggestions.clone(),
                signals: result.details.signals.clone(),
                reasons: result.details.reasons.clone(),
            },
        }
    }
}

/// Defines the interface for a remote service that refines a local analysis.
#[async_trait]
pub trait Augmenter: Send + Sync + 'static {
    /// `Ok(None)` means the backend chose not to answer.
    async fn augment(&self, request: &AugmentRequest) -> Result<Option<RemoteAnalysis>>;
}
