//! Optional online refinement of a local analysis.
//!
//! Two stages run after the synchronous engine, each guarded by its own timeout:
//! online geocoding of place candidates, then the augmentation backend. Neither stage
//! can fail the analysis; every error becomes a reason on the result.

use futures::{stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use super::augment::HttpAugmenter;
use super::geocode::{extract_candidates, reconcile, HttpGeocoder, HOME_COUNTRY_CODE};
use super::traits::{AugmentRequest, Augmenter, GeocodeHit, Geocoder};
use crate::brief::geo::{boost_for_distance, haversine_km, trip_kind};
use crate::brief::language::normalize;
use crate::brief::{
    merge_remote, rebudget, AnalysisResult, BriefAnalyzer, Coordinate, DaySplit, GeoBoost,
    PlaceMatch, Stage, HOME,
};
use crate::config::EngineConfig;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefineSettings {
    pub geocode_timeout: Duration,
    pub augment_timeout: Duration,
    pub max_concurrent_lookups: usize,
}

impl Default for RefineSettings {
    fn default() -> Self {
        Self {
            geocode_timeout: Duration::from_millis(4000),
            augment_timeout: Duration::from_millis(6000),
            max_concurrent_lookups: 3,
        }
    }
}

/// Runs the local engine and then whichever online stages are configured.
#[derive(Clone, Default)]
pub struct Refiner {
    analyzer: BriefAnalyzer,
    geocoder: Option<Arc<dyn Geocoder>>,
    augmenter: Option<Arc<dyn Augmenter>>,
    settings: RefineSettings,
}

impl Refiner {
    pub fn new(analyzer: BriefAnalyzer, settings: RefineSettings) -> Self {
        Self {
            analyzer,
            settings,
            geocoder: None,
            augmenter: None,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_augmenter(mut self, augmenter: Arc<dyn Augmenter>) -> Self {
        self.augmenter = Some(augmenter);
        self
    }

    /// Build HTTP-backed stages for whatever `config` enables.
    pub fn from_config(analyzer: BriefAnalyzer, config: &EngineConfig) -> Result<Self> {
        config.check()?;
        let settings = RefineSettings {
            geocode_timeout: config.geocode.timeout(),
            augment_timeout: config.augment.timeout(),
            max_concurrent_lookups: config.geocode.max_concurrent,
        };
        let mut refiner = Self::new(analyzer, settings);

        if config.geocode.enabled {
            refiner = refiner.with_geocoder(Arc::new(HttpGeocoder::new(
                &config.geocode.base_url,
                config.geocode.timeout(),
                &config.geocode.user_agent,
            )?));
        }
        if config.augment.enabled {
            let url = config.augment.url.as_deref().ok_or_else(|| {
                AppError::Config("Augmentation enabled without a URL".to_string())
            })?;
            refiner = refiner.with_augmenter(Arc::new(HttpAugmenter::new(
                url,
                config.augment.timeout(),
                config.augment.token.clone(),
            )?));
        }
        Ok(refiner)
    }

    pub fn is_enabled(&self) -> bool {
        self.geocoder.is_some() || self.augmenter.is_some()
    }

    /// Local analysis followed by refinement.
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        let local = self.analyzer.analyze(text);
        self.refine(text, local).await
    }

    /// Refine an existing local result. Invalid input is returned untouched.
    pub async fn refine(&self, text: &str, local: AnalysisResult) -> AnalysisResult {
        if normalize(text).is_none() {
            return local;
        }
        let mut result = local;

        // 1. Online geocoding
        if let Some(geocoder) = &self.geocoder {
            self.geocode_stage(geocoder.clone(), text, &mut result).await;
            self.analyzer
                .notify(Stage::OnlineGeocode, &result.details);
        }

        // 2. Augmentation backend
        if let Some(augmenter) = &self.augmenter {
            result = self.augment_stage(augmenter.as_ref(), text, result).await;
            self.analyzer.notify(Stage::Augmentation, &result.details);
        }

        result
    }

    /// Like [`refine`](Self::refine), but gives up as soon as `cancel` resolves and
    /// returns the local result. In-flight requests are dropped.
    pub async fn refine_until<F>(&self, text: &str, local: AnalysisResult, cancel: F) -> AnalysisResult
    where
        F: Future<Output = ()>,
    {
        let fallback = local.clone();
        tokio::select! {
            refined = self.refine(text, local) => refined,
            _ = cancel => {
                warn!("Refinement cancelled by caller");
                let mut result = fallback;
                result.push_reason(format!("Refinement stopped ({}); keeping local analysis", AppError::Cancelled));
                result
            }
        }
    }

    async fn geocode_stage(&self, geocoder: Arc<dyn Geocoder>, text: &str, result: &mut AnalysisResult) {
        let candidates = extract_candidates(text);
        if candidates.is_empty() {
            result.push_reason("Online geocoding: no place candidates");
            return;
        }
        let attempted = candidates.len();

        let lookups = stream::iter(candidates)
            .map(|candidate| {
                let geocoder = geocoder.clone();
                async move {
                    let outcome = geocoder.lookup(&candidate).await;
                    (candidate, outcome)
                }
            })
            .buffered(self.settings.max_concurrent_lookups.max(1))
            .collect::<Vec<_>>();

        let outcomes = match timeout(self.settings.geocode_timeout, lookups).await {
            Ok(outcomes) => outcomes,
            Err(_) => {
                warn!("Online geocoding timed out after {:?}", self.settings.geocode_timeout);
                result.push_reason("Online geocoding timed out; keeping offline estimate");
                return;
            }
        };

        let mut boost = GeoBoost::default();
        let mut failures: Vec<AppError> = Vec::new();
        for (candidate, outcome) in outcomes {
            match outcome {
                Ok(Some(hit)) if hit.country_code.eq_ignore_ascii_case(HOME_COUNTRY_CODE) => {
                    let place = to_place(&hit);
                    boost = boost.max(boost_for_distance(place.distance_km));
                    result.push_reason(format!(
                        "Geocoded {} as {}: {:.0} km from Oslo",
                        candidate, place.name, place.distance_km
                    ));
                    result.details.signals.online_places.push(place);
                }
                Ok(Some(hit)) => result.push_reason(format!(
                    "Geocoded {} outside Norway ({}); ignored",
                    candidate, hit.country_code
                )),
                Ok(None) => {}
                Err(e) => failures.push(e),
            }
        }

        if let Some(first) = failures.first() {
            warn!("{} of {} geocode lookups failed: {}", failures.len(), attempted, first);
            result.push_reason(format!(
                "Online geocoding failed for {} of {} lookup(s): {}",
                failures.len(),
                attempted,
                first
            ));
        }

        if boost == GeoBoost::default() {
            return;
        }

        let s = &mut result.suggestions;
        let before = (s.days_in_oslo, s.days_out_of_oslo, s.include_scout);
        let split = reconcile(
            DaySplit {
                city: s.days_in_oslo,
                away: s.days_out_of_oslo,
            },
            result.details.signals.explicit_days,
            boost,
        );
        s.days_in_oslo = split.city;
        s.days_out_of_oslo = split.away;
        s.include_scout |= boost.requires_scout();
        let after = (s.days_in_oslo, s.days_out_of_oslo, s.include_scout);

        result.details.signals.geo_boost = result.details.signals.geo_boost.max(boost);
        if before != after {
            rebudget(result);
            result.push_reason(format!(
                "Online geocode adjusted plan: {} city / {} away day(s){}",
                split.city,
                split.away,
                if after.2 && !before.2 { ", scouting added" } else { "" }
            ));
        }
    }

    async fn augment_stage(
        &self,
        augmenter: &dyn Augmenter,
        text: &str,
        mut result: AnalysisResult,
    ) -> AnalysisResult {
        let request = AugmentRequest::new(text, &result);
        match timeout(self.settings.augment_timeout, augmenter.augment(&request)).await {
            Ok(Ok(Some(remote))) => {
                let merged = merge_remote(result, remote);
                info!("Augmentation merged: {}", merged.summary());
                merged
            }
            Ok(Ok(None)) => {
                result.push_reason("Backend augmentation returned no result");
                result
            }
            Ok(Err(e)) => {
                warn!("Augmentation failed: {}", e);
                result.push_reason(format!("Backend augmentation unavailable: {}", e));
                result
            }
            Err(elapsed) => {
                let e = AppError::from(elapsed);
                warn!("Augmentation failed: {}", e);
                result.push_reason(format!("Backend augmentation unavailable: {}", e));
                result
            }
        }
    }
}

fn to_place(hit: &GeocodeHit) -> PlaceMatch {
    let distance_km = haversine_km(
        HOME,
        Coordinate {
            lat: hit.lat,
            lon: hit.lon,
        },
    );
    PlaceMatch {
        name: hit.name.clone(),
        lat: hit.lat,
        lon: hit.lon,
        distance_km,
        kind: trip_kind(distance_km),
    }
}
