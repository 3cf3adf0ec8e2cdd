//! Application settings.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields a working configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::animator::DEFAULT_TRANSITION_SECS;
use crate::metrics::{DEFAULT_RACK_POWER_CAPACITY_W, NEAR_CAPACITY_THRESHOLD};
use crate::placement::DEFAULT_GRID_SIZE;
use crate::view::ViewRegistry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transition_duration_secs must be >= 0, got {0}")]
    NegativeDuration(f64),
    #[error("rack_power_capacity_w must be > 0, got {0}")]
    NonPositiveCapacity(f64),
    #[error("grid_size must be > 0")]
    EmptyGrid,
    #[error("default_load must be within [0, 1], got {0}")]
    LoadOutOfRange(f64),
    #[error("initial_view {0:?} is not a registered view")]
    UnknownInitialView(String),
    #[error("view registry is empty")]
    NoViews,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transition_duration_secs: f64,
    pub rack_power_capacity_w: f64,
    pub rack_height_u: u32,
    pub grid_size: u32,
    pub default_load: f64,
    pub near_capacity_threshold: f64,
    pub initial_view: String,
    /// Replaces the built-in view registry when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<ViewRegistry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transition_duration_secs: DEFAULT_TRANSITION_SECS,
            rack_power_capacity_w: DEFAULT_RACK_POWER_CAPACITY_W,
            rack_height_u: 42,
            grid_size: DEFAULT_GRID_SIZE,
            default_load: 0.5,
            near_capacity_threshold: NEAR_CAPACITY_THRESHOLD,
            initial_view: "overview".to_string(),
            views: None,
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        tracing::info!(
            views = config.view_registry().len(),
            initial_view = %config.initial_view,
            duration = config.transition_duration_secs,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transition_duration_secs.is_nan() || self.transition_duration_secs < 0.0 {
            return Err(ConfigError::NegativeDuration(self.transition_duration_secs));
        }
        if self.rack_power_capacity_w.is_nan() || self.rack_power_capacity_w <= 0.0 {
            return Err(ConfigError::NonPositiveCapacity(self.rack_power_capacity_w));
        }
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if !(0.0..=1.0).contains(&self.default_load) {
            return Err(ConfigError::LoadOutOfRange(self.default_load));
        }
        let views = self.view_registry();
        if views.is_empty() {
            return Err(ConfigError::NoViews);
        }
        if !views.contains(&self.initial_view) {
            return Err(ConfigError::UnknownInitialView(self.initial_view.clone()));
        }
        Ok(())
    }

    /// The configured registry, or the built-in one.
    pub fn view_registry(&self) -> ViewRegistry {
        self.views
            .clone()
            .unwrap_or_else(ViewRegistry::visualize_defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.transition_duration_secs, 1.5);
        assert_eq!(config.grid_size, 8);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let json = r#"{ "transition_duration_secs": 0.5, "default_load": 0.9 }"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.transition_duration_secs, 0.5);
        assert_eq!(config.default_load, 0.9);
        assert_eq!(config.rack_power_capacity_w, 15_000.0);
        assert_eq!(config.initial_view, "overview");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            (r#"{"transition_duration_secs": -1}"#, "transition_duration_secs"),
            (r#"{"rack_power_capacity_w": 0}"#, "rack_power_capacity_w"),
            (r#"{"grid_size": 0}"#, "grid_size"),
            (r#"{"default_load": 1.5}"#, "default_load"),
            (r#"{"initial_view": "moon-base"}"#, "moon-base"),
        ];
        for (json, needle) in cases {
            let err = AppConfig::from_json(json).unwrap_err();
            assert!(err.to_string().contains(needle), "{err}");
        }
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn custom_views_replace_defaults() {
        let json = r#"{
            "initial_view": "front",
            "views": {
                "front": {
                    "name": "Front",
                    "description": "Straight on",
                    "position": [0, 1, 4],
                    "target": [0, 0, 0]
                }
            }
        }"#;
        let config = AppConfig::from_json(json).unwrap();
        let views = config.view_registry();
        assert_eq!(views.len(), 1);
        assert!(views.contains("front"));
        assert!(!views.contains("overview"));
    }

    #[test]
    fn empty_view_override_is_rejected() {
        assert!(matches!(
            AppConfig::from_json(r#"{"views": {}}"#),
            Err(ConfigError::NoViews)
        ));
    }
}
