//! Engine configuration.
//!
//! Read from `algoviz.json` (camelCase keys). A missing file means defaults;
//! unknown keys are ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmId;
use crate::error::{Result, VizError};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "algoviz.json";

/// Default delay between steps in milliseconds.
pub const DEFAULT_SPEED_MS: u64 = 500;

const fn default_speed_ms() -> u64 {
    DEFAULT_SPEED_MS
}

const fn default_min_speed_ms() -> u64 {
    10
}

const fn default_max_speed_ms() -> u64 {
    5000
}

/// Default maximum number of input elements.
const fn default_max_elements() -> usize {
    64
}

/// Default per-subscriber event buffer.
const fn default_event_capacity() -> usize {
    256
}

/// Tunables for a visualization session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Initial delay between steps.
    #[serde(default = "default_speed_ms")]
    pub default_speed_ms: u64,

    /// Smallest delay a user may pick.
    #[serde(default = "default_min_speed_ms")]
    pub min_speed_ms: u64,

    /// Largest delay a user may pick.
    #[serde(default = "default_max_speed_ms")]
    pub max_speed_ms: u64,

    /// Largest accepted input (array length, node count, values or operations).
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,

    /// Events buffered per subscriber before a slow one starts lagging.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Algorithm selected when a session opens.
    #[serde(default)]
    pub default_algorithm: AlgorithmId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_speed_ms: default_speed_ms(),
            min_speed_ms: default_min_speed_ms(),
            max_speed_ms: default_max_speed_ms(),
            max_elements: default_max_elements(),
            event_capacity: default_event_capacity(),
            default_algorithm: AlgorithmId::default(),
        }
    }
}

impl EngineConfig {
    /// Loads `algoviz.json` from `dir`, or defaults if it is absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns `VizError::ConfigParseError` if the file exists but cannot be
    /// read or holds invalid JSON, and `VizError::ConfigurationError` if a
    /// value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(VizError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| VizError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the speed range is sane and contains the default speed,
    /// and that the limits are positive.
    pub fn validate(&self) -> Result<()> {
        if self.min_speed_ms == 0 {
            return Err(VizError::configuration(
                "minSpeedMs must be greater than 0",
                "Set minSpeedMs to at least 1 in your algoviz.json",
            ));
        }

        if self.min_speed_ms > self.max_speed_ms {
            return Err(VizError::configuration(
                format!(
                    "minSpeedMs ({}) is greater than maxSpeedMs ({})",
                    self.min_speed_ms, self.max_speed_ms
                ),
                "Make minSpeedMs less than or equal to maxSpeedMs",
            ));
        }

        if !(self.min_speed_ms..=self.max_speed_ms).contains(&self.default_speed_ms) {
            return Err(VizError::configuration(
                format!(
                    "defaultSpeedMs ({}) is outside {}..={} ms",
                    self.default_speed_ms, self.min_speed_ms, self.max_speed_ms
                ),
                "Pick a defaultSpeedMs between minSpeedMs and maxSpeedMs",
            ));
        }

        if self.max_elements == 0 {
            return Err(VizError::configuration(
                "maxElements must be greater than 0",
                "Set maxElements to at least 1 in your algoviz.json",
            ));
        }

        if self.event_capacity == 0 {
            return Err(VizError::configuration(
                "eventCapacity must be greater than 0",
                "Set eventCapacity to at least 1 in your algoviz.json",
            ));
        }

        Ok(())
    }

    /// Fails with `InvalidInputError` if `speed_ms` is outside the configured range.
    pub fn check_speed(&self, speed_ms: u64) -> Result<()> {
        if (self.min_speed_ms..=self.max_speed_ms).contains(&speed_ms) {
            Ok(())
        } else {
            Err(VizError::invalid_input(
                format!(
                    "speed {speed_ms} ms is outside {}..={} ms",
                    self.min_speed_ms, self.max_speed_ms
                ),
                format!(
                    "Pick a delay between {} and {} ms",
                    self.min_speed_ms, self.max_speed_ms
                ),
            ))
        }
    }
}
