use crate::pipeline::DEFAULT_PARALLEL_THRESHOLD;
use crate::portfolio::DEFAULT_CAPACITY_CEILING;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Run settings that can live in a TOML file. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Cost per unit sold, used for profit.
    pub unit_cost: f64,
    /// Week budget for portfolio selection.
    pub max_weeks: f64,
    /// Drop ideas with fewer projected users. Zero disables the filter.
    pub min_users: f64,
    /// Drop ideas below this success probability. Zero disables the filter.
    pub min_prob: f64,
    /// Drop ideas that take longer than this many weeks. Zero disables the filter.
    pub max_weeks_per_idea: f64,
    pub parallel_threshold: usize,
    pub capacity_ceiling: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            unit_cost: 0.0,
            max_weeks: 24.0,
            min_users: 0.0,
            min_prob: 0.0,
            max_weeks_per_idea: 0.0,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            capacity_ceiling: DEFAULT_CAPACITY_CEILING,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigFileError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values that cannot mean anything for a run.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        for (name, value) in [
            ("unit_cost", self.unit_cost),
            ("max_weeks", self.max_weeks),
            ("min_users", self.min_users),
            ("min_prob", self.min_prob),
            ("max_weeks_per_idea", self.max_weeks_per_idea),
        ] {
            if !value.is_finite() {
                return Err(ConfigFileError::Invalid(format!(
                    "'{name}' must be a finite number, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.min_prob) {
            return Err(ConfigFileError::Invalid(format!(
                "'min_prob' must lie in [0, 1], got {}",
                self.min_prob
            )));
        }
        if self.capacity_ceiling == 0 {
            return Err(ConfigFileError::Invalid(
                "'capacity_ceiling' must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
