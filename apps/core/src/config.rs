//! Environment-driven configuration for the optional refinement adapters.

use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use crate::error::{AppError, Result};

const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_GEOCODE_TIMEOUT_MS: u64 = 4000;
const DEFAULT_GEOCODE_CONCURRENCY: usize = 3;
const DEFAULT_AUGMENT_TIMEOUT_MS: u64 = 6000;

/// Online geocoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeocodeConfig {
    pub enabled: bool,
    #[validate(url)]
    pub base_url: String,
    #[validate(range(min = 100, max = 60000))]
    pub timeout_ms: u64,
    /// Lookups in flight at once. Public providers throttle aggressively.
    #[validate(range(min = 1, max = 5))]
    pub max_concurrent: usize,
    #[validate(length(min = 1))]
    pub user_agent: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: DEFAULT_GEOCODE_URL.to_string(),
            timeout_ms: DEFAULT_GEOCODE_TIMEOUT_MS,
            max_concurrent: DEFAULT_GEOCODE_CONCURRENCY,
            user_agent: format!("shootbrief/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GeocodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Augmentation backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AugmentConfig {
    pub enabled: bool,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(range(min = 100, max = 60000))]
    pub timeout_ms: u64,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            timeout_ms: DEFAULT_AUGMENT_TIMEOUT_MS,
            token: None,
        }
    }
}

impl AugmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    #[validate(nested)]
    pub geocode: GeocodeConfig,
    #[validate(nested)]
    pub augment: AugmentConfig,
}

impl EngineConfig {
    /// Load from the process environment, reading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = EngineConfig::default();

        if let Some(v) = get("SHOOTBRIEF_GEOCODE_ENABLED") {
            config.geocode.enabled = parse_bool("SHOOTBRIEF_GEOCODE_ENABLED", &v)?;
        }
        if let Some(v) = get("SHOOTBRIEF_GEOCODE_URL") {
            config.geocode.base_url = v;
        }
        if let Some(v) = get("SHOOTBRIEF_GEOCODE_TIMEOUT_MS") {
            config.geocode.timeout_ms = parse_number("SHOOTBRIEF_GEOCODE_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("SHOOTBRIEF_GEOCODE_CONCURRENCY") {
            config.geocode.max_concurrent = parse_number("SHOOTBRIEF_GEOCODE_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("SHOOTBRIEF_GEOCODE_USER_AGENT") {
            config.geocode.user_agent = v;
        }

        if let Some(v) = get("SHOOTBRIEF_AUGMENT_ENABLED") {
            config.augment.enabled = parse_bool("SHOOTBRIEF_AUGMENT_ENABLED", &v)?;
        }
        config.augment.url = get("SHOOTBRIEF_AUGMENT_URL");
        if let Some(v) = get("SHOOTBRIEF_AUGMENT_TIMEOUT_MS") {
            config.augment.timeout_ms = parse_number("SHOOTBRIEF_AUGMENT_TIMEOUT_MS", &v)?;
        }
        config.augment.token = get("SHOOTBRIEF_AUGMENT_TOKEN");

        config.check()?;
        Ok(config)
    }

    /// Validate field ranges and URLs, and require an endpoint for an enabled backend.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if self.augment.enabled && self.augment.url.is_none() {
            return Err(AppError::Config(
                "SHOOTBRIEF_AUGMENT_URL is required when augmentation is enabled".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refinement_enabled(&self) -> bool {
        self.geocode.enabled || self.augment.enabled
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "{} must be a boolean, got {:?}",
            key, value
        ))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        AppError::Validation(format!("{} must be a number, got {:?}", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<EngineConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_disable_everything() {
        let config = load(&[]).unwrap();
        assert!(!config.refinement_enabled());
        assert_eq!(config.geocode.max_concurrent, 3);
        assert_eq!(config.geocode.timeout(), Duration::from_millis(4000));
        assert!(config.geocode.user_agent.starts_with("shootbrief/"));
    }

    #[test]
    fn test_bool_spellings() {
        assert!(parse_bool("K", "YES").unwrap());
        assert!(!parse_bool("K", "off").unwrap());
        assert!(matches!(parse_bool("K", "maybe"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_concurrency_range_is_enforced() {
        let err = load(&[("SHOOTBRIEF_GEOCODE_CONCURRENCY", "12")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_enabled_augment_needs_url() {
        let err = load(&[("SHOOTBRIEF_AUGMENT_ENABLED", "true")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let config = load(&[
            ("SHOOTBRIEF_AUGMENT_ENABLED", "true"),
            ("SHOOTBRIEF_AUGMENT_URL", "https://brief.example.com/augment"),
        ])
        .unwrap();
        assert!(config.refinement_enabled());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = load(&[("SHOOTBRIEF_AUGMENT_TOKEN", "secret")]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
