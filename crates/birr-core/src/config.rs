//! Forecast scenario configuration
//!
//! Config is loaded with a two-layer resolution: an explicit override file
//! wins, otherwise the defaults embedded at compile time apply. Analysts can
//! re-tune scenario multipliers without recompiling.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Scenario;

/// Embedded default config (compiled into the binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/scenarios.toml");

/// Multipliers applied under one scenario
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScenarioParams {
    /// Scales the lagged event adjustments
    pub effect_multiplier: f64,
    /// Scales the fitted trend slope beyond the last observation
    pub growth_multiplier: f64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            effect_multiplier: 1.0,
            growth_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    horizon_start: i32,
    horizon_end: i32,
    interval_z: f64,
    interval_floor: f64,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    forecast: RawForecast,
    #[serde(default)]
    scenarios: HashMap<String, ScenarioParams>,
}

/// Resolved forecast configuration
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// First forecast year (inclusive)
    pub horizon_start: i32,
    /// Last forecast year (inclusive)
    pub horizon_end: i32,
    /// z multiplier for the uncertainty half-width
    pub interval_z: f64,
    /// Lower bound on the residual std used for the band
    pub interval_floor: f64,
    scenarios: HashMap<Scenario, ScenarioParams>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self::parse(DEFAULT_CONFIG).expect("embedded scenario config is valid")
    }
}

impl ForecastConfig {
    /// Load configuration: the override file if given, embedded defaults
    /// otherwise. A named-but-missing override is an error, not a fallback.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match override_path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::parse(&text)
            }
            None => Self::parse(DEFAULT_CONFIG),
        }
    }

    fn parse(text: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;

        if raw.forecast.horizon_start > raw.forecast.horizon_end {
            return Err(Error::Config(format!(
                "horizon_start {} is after horizon_end {}",
                raw.forecast.horizon_start, raw.forecast.horizon_end
            )));
        }

        let mut scenarios = HashMap::new();
        for (name, params) in raw.scenarios {
            let scenario: Scenario = name
                .parse()
                .map_err(|e: String| Error::Config(e))?;
            scenarios.insert(scenario, params);
        }

        Ok(Self {
            horizon_start: raw.forecast.horizon_start,
            horizon_end: raw.forecast.horizon_end,
            interval_z: raw.forecast.interval_z,
            interval_floor: raw.forecast.interval_floor,
            scenarios,
        })
    }

    /// Multipliers for a scenario; unlisted scenarios behave like base
    pub fn params(&self, scenario: Scenario) -> ScenarioParams {
        self.scenarios
            .get(&scenario)
            .copied()
            .unwrap_or_default()
    }

    pub fn horizon_years(&self) -> RangeInclusive<i32> {
        self.horizon_start..=self.horizon_end
    }
}
