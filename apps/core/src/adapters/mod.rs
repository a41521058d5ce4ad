//! # Adapters Module
//!
//! Asynchronous ports used to refine a local analysis with online data.
//!
//! ## Components
//! - `traits`: `Geocoder` and `Augmenter` ports plus their request/response types
//! - `geocode`: place-candidate extraction, Nominatim-style HTTP geocoder, day reconciliation
//! - `augment`: HTTP augmentation backend client
//! - `refine`: refinement orchestrator with timeouts and cancellation

pub mod augment;
pub mod geocode;
pub mod refine;
pub mod traits;

pub use augment::HttpAugmenter;
pub use geocode::{extract_candidates, reconcile, HttpGeocoder};
pub use refine::{RefineSettings, Refiner};
pub use traits::{AugmentContext, AugmentRequest, Augmenter, GeocodeHit, Geocoder};
