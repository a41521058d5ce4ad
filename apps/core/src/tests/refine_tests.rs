//! Refinement Tests
//!
//! The online geocode and augmentation stages against in-process fakes and wiremock
//! servers: boosts, budget recomputation, failures, timeouts and cancellation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::{
    AugmentRequest, Augmenter, GeocodeHit, Geocoder, HttpAugmenter, HttpGeocoder,
    RefineSettings, Refiner,
};
use crate::brief::{
    AnalysisResult, BriefAnalyzer, Details, ProductionType, RemoteAnalysis, RemoteSuggestion,
    Stage, StageObserver,
};
use crate::error::{AppError, Result};

/// Geocoder answering from a fixed table, optionally after a delay.
struct TableGeocoder {
    hits: HashMap<String, GeocodeHit>,
    delay: Duration,
    calls: AtomicUsize,
}

impl TableGeocoder {
    fn new(entries: &[(&str, f64, f64, &str)]) -> Self {
        let hits = entries
            .iter()
            .map(|(name, lat, lon, cc)| {
                (
                    name.to_string(),
                    GeocodeHit {
                        name: name.to_string(),
                        lat: *lat,
                        lon: *lon,
                        country_code: cc.to_string(),
                    },
                )
            })
            .collect();
        Self {
            hits,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<GeocodeHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.hits.get(query).cloned())
    }
}

struct FailingGeocoder;

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn lookup(&self, _query: &str) -> Result<Option<GeocodeHit>> {
        Err(AppError::Http("connection refused".to_string()))
    }
}

/// Augmenter that records the request it saw and returns a canned answer.
struct CannedAugmenter {
    answer: Result<Option<RemoteAnalysis>>,
    seen: Mutex<Option<AugmentRequest>>,
}

impl CannedAugmenter {
    fn new(answer: Result<Option<RemoteAnalysis>>) -> Self {
        Self {
            answer,
            seen: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Augmenter for CannedAugmenter {
    async fn augment(&self, request: &AugmentRequest) -> Result<Option<RemoteAnalysis>> {
        *self.seen.lock().unwrap() = Some(request.clone());
        self.answer.clone()
    }
}

#[derive(Default)]
struct Recorder {
    stages: Mutex<Vec<Stage>>,
}

impl StageObserver for Recorder {
    fn on_stage(&self, stage: Stage, _details: &Details) {
        self.stages.lock().unwrap().push(stage);
    }
}

// A fictional place ~390 km from Oslo, unknown to the offline tables.
const KVALVIK: (&str, f64, f64, &str) = ("Kvalvik", 63.0, 7.3, "no");

fn settings() -> RefineSettings {
    RefineSettings {
        geocode_timeout: Duration::from_millis(500),
        augment_timeout: Duration::from_millis(500),
        max_concurrent_lookups: 3,
    }
}

fn refiner() -> Refiner {
    Refiner::new(BriefAnalyzer::new(), settings())
}

fn local(text: &str) -> AnalysisResult {
    BriefAnalyzer::new().analyze(text)
}

#[cfg(test)]
mod geocode_stage_tests {
    use super::*;

    #[tokio::test]
    async fn test_distant_hit_shifts_city_days_and_rebudgets() {
        let text = "Commercial shoot in Kvalvik";
        let before = local(text);
        assert_eq!(before.suggestions.days_in_oslo, 2);
        assert_eq!(before.suggestions.days_out_of_oslo, 0);

        let refiner = refiner().with_geocoder(Arc::new(TableGeocoder::new(&[KVALVIK])));
        let after = refiner.refine(text, before.clone()).await;

        assert_eq!(after.suggestions.days_in_oslo, 0);
        assert_eq!(after.suggestions.days_out_of_oslo, 2);
        assert!(after.suggestions.include_scout);
        assert_ne!(after.suggestions.budget_nok, before.suggestions.budget_nok);
        assert_eq!(after.details.signals.online_places.len(), 1);
        assert!(after
            .details
            .reasons
            .iter()
            .any(|r| r.starts_with("Online geocode adjusted plan")));
    }

    #[tokio::test]
    async fn test_explicit_total_caps_online_boost() {
        let text = "Commercial shoot in Kvalvik, 3 days";
        let refiner = refiner().with_geocoder(Arc::new(TableGeocoder::new(&[KVALVIK])));
        let after = refiner.refine(text, local(text)).await;

        assert_eq!(after.suggestions.days_in_oslo, 1);
        assert_eq!(after.suggestions.days_out_of_oslo, 2);
    }

    #[tokio::test]
    async fn test_foreign_hits_are_ignored() {
        let text = "Commercial shoot in Kvalvik";
        let before = local(text);
        let refiner = refiner().with_geocoder(Arc::new(TableGeocoder::new(&[(
            "Kvalvik", 55.6, 12.5, "dk",
        )])));
        let after = refiner.refine(text, before.clone()).await;

        assert_eq!(after.suggestions, before.suggestions);
        assert!(after.details.reasons.last().unwrap().contains("outside Norway"));
    }

    #[tokio::test]
    async fn test_lookup_failure_becomes_reason() {
        let text = "Commercial shoot in Kvalvik";
        let before = local(text);
        let after = refiner()
            .with_geocoder(Arc::new(FailingGeocoder))
            .refine(text, before.clone())
            .await;

        assert_eq!(after.suggestions, before.suggestions);
        let last = after.details.reasons.last().unwrap();
        assert!(last.starts_with("Online geocoding failed for 1 of 1"));
        assert!(last.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_geocode_timeout_keeps_local_result() {
        let text = "Commercial shoot in Kvalvik";
        let before = local(text);
        let geocoder = TableGeocoder::new(&[KVALVIK]).slow(Duration::from_secs(5));
        let after = refiner()
            .with_geocoder(Arc::new(geocoder))
            .refine(text, before.clone())
            .await;

        assert_eq!(after.suggestions, before.suggestions);
        assert_eq!(
            after.details.reasons.last().unwrap(),
            "Online geocoding timed out; keeping offline estimate"
        );
    }

    #[tokio::test]
    async fn test_lookups_capped_at_five() {
        let text = "in Alta, in Moss, in Voss, in Hell, in Lom, in Sola, in Bø";
        let geocoder = Arc::new(TableGeocoder::new(&[]));
        refiner()
            .with_geocoder(geocoder.clone())
            .refine(text, local(text))
            .await;

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_refined() {
        let geocoder = Arc::new(TableGeocoder::new(&[KVALVIK]));
        let result = refiner()
            .with_geocoder(geocoder.clone())
            .refine("", AnalysisResult::invalid_input())
            .await;

        assert_eq!(result, AnalysisResult::invalid_input());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }
}

#[cfg(test)]
mod augmentation_stage_tests {
    use super::*;

    #[tokio::test]
    async fn test_remote_answer_is_merged_after_geocoding() {
        let text = "Commercial shoot in Kvalvik";
        let augmenter = Arc::new(CannedAugmenter::new(Ok(Some(RemoteAnalysis {
            suggestions: Some(RemoteSuggestion {
                production_type: Some(ProductionType::Film),
                locations: Some(4),
                ..RemoteSuggestion::default()
            }),
            confidence: Some(0.9),
            details: None,
        }))));
        let recorder = Arc::new(Recorder::default());

        let refiner = Refiner::new(BriefAnalyzer::with_observer(recorder.clone()), settings())
            .with_geocoder(Arc::new(TableGeocoder::new(&[KVALVIK])))
            .with_augmenter(augmenter.clone());
        let result = refiner.refine(text, local(text)).await;

        assert_eq!(result.suggestions.production_type, ProductionType::Film);
        assert_eq!(result.suggestions.locations, 4);
        assert_eq!(result.confidence, 0.9);

        // The backend saw the geocode-refined plan.
        let seen = augmenter.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.context.suggestion.days_out_of_oslo, 2);
        assert_eq!(seen.context.threshold_km, 90.0);

        assert_eq!(
            *recorder.stages.lock().unwrap(),
            vec![Stage::OnlineGeocode, Stage::Augmentation]
        );
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_reason() {
        let text = "Commercial shoot in Kvalvik";
        let before = local(text);
        let refiner = refiner().with_augmenter(Arc::new(CannedAugmenter::new(Err(
            AppError::Http("status 502".to_string()),
        ))));
        let after = refiner.refine(text, before.clone()).await;

        assert_eq!(after.suggestions, before.suggestions);
        assert_eq!(after.confidence, before.confidence);
        assert!(after
            .details
            .reasons
            .last()
            .unwrap()
            .starts_with("Backend augmentation unavailable"));
    }

    #[tokio::test]
    async fn test_remote_absence_becomes_reason() {
        let text = "Commercial shoot in Kvalvik";
        let after = refiner()
            .with_augmenter(Arc::new(CannedAugmenter::new(Ok(None))))
            .refine(text, local(text))
            .await;

        assert_eq!(
            after.details.reasons.last().unwrap(),
            "Backend augmentation returned no result"
        );
    }
}

#[cfg(test)]
mod cancellation_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_returns_local_result() {
        let text = "Commercial shoot in Kvalvik";
        let before = local(text);
        let geocoder = TableGeocoder::new(&[KVALVIK]).slow(Duration::from_millis(300));
        let refiner = Refiner::new(
            BriefAnalyzer::new(),
            RefineSettings {
                geocode_timeout: Duration::from_secs(10),
                ..settings()
            },
        )
        .with_geocoder(Arc::new(geocoder));

        let result = refiner
            .refine_until(text, before.clone(), tokio::time::sleep(Duration::from_millis(20)))
            .await;

        assert_eq!(result.suggestions, before.suggestions);
        assert!(result.details.reasons.last().unwrap().contains("Cancelled"));
    }

    #[tokio::test]
    async fn test_uncancelled_refinement_completes() {
        let text = "Commercial shoot in Kvalvik";
        let refiner = refiner().with_geocoder(Arc::new(TableGeocoder::new(&[KVALVIK])));

        let result = refiner
            .refine_until(text, local(text), std::future::pending())
            .await;

        assert_eq!(result.suggestions.days_out_of_oslo, 2);
    }
}

#[cfg(test)]
mod http_refinement_tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_full_http_refinement() {
        // 1. Arrange
        let geo_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Kvalvik"))
            .and(query_param("countrycodes", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "Kvalvik",
                "display_name": "Kvalvik, Møre og Romsdal, Norge",
                "lat": "63.0",
                "lon": "7.3",
                "address": { "country_code": "no" }
            }])))
            .expect(1)
            .mount(&geo_server)
            .await;

        let augment_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/augment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestions": { "daysOutOfOslo": 3 },
                "details": { "reasons": ["weather buffer day"] }
            })))
            .expect(1)
            .mount(&augment_server)
            .await;

        let geocoder = HttpGeocoder::new(&geo_server.uri(), Duration::from_secs(2), "shootbrief-test")
            .unwrap();
        let augmenter = HttpAugmenter::new(
            &format!("{}/augment", augment_server.uri()),
            Duration::from_secs(2),
            None,
        )
        .unwrap();
        let refiner = Refiner::new(
            BriefAnalyzer::new(),
            RefineSettings {
                geocode_timeout: Duration::from_secs(3),
                augment_timeout: Duration::from_secs(3),
                max_concurrent_lookups: 3,
            },
        )
        .with_geocoder(Arc::new(geocoder))
        .with_augmenter(Arc::new(augmenter));

        // 2. Act
        let result = refiner.analyze("Commercial shoot in Kvalvik").await;

        // 3. Assert
        assert_eq!(result.suggestions.days_in_oslo, 0);
        assert_eq!(result.suggestions.days_out_of_oslo, 3);
        assert_eq!(
            result.details.reasons.last().unwrap(),
            "[backend] weather buffer day"
        );
    }

    #[tokio::test]
    async fn test_http_errors_never_reach_caller() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let refiner = refiner()
            .with_geocoder(Arc::new(
                HttpGeocoder::new(&server.uri(), Duration::from_secs(2), "shootbrief-test")
                    .unwrap(),
            ))
            .with_augmenter(Arc::new(
                HttpAugmenter::new(&server.uri(), Duration::from_secs(2), None).unwrap(),
            ));

        let text = "Commercial shoot in Kvalvik";
        let before = local(text);
        let after = refiner.refine(text, before.clone()).await;

        assert_eq!(after.suggestions, before.suggestions);
        let tail = &after.details.reasons[before.details.reasons.len()..];
        assert_eq!(tail.len(), 2);
        assert!(tail[0].contains("boom"));
        assert!(tail[1].starts_with("Backend augmentation unavailable"));
    }
}
