//! Test Module
//!
//! Cross-module test suites for the brief engine and its refinement adapters.
//!
//! ## Test Categories
//! - `brief_tests`: end-to-end properties of the synchronous analyzer
//! - `refine_tests`: online geocoding and augmentation, including failures and cancellation
//! - `config_tests`: environment-driven configuration

pub mod refine_tests;
