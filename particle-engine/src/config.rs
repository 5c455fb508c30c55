// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Simulation configuration
//!
//! Seeding parameters load from TOML. Every field has a default, so a file
//! only needs the values it changes:
//!
//! ```toml
//! entity_count = 5000
//! seed = 42
//!
//! [velocity]
//! min = 20.0
//! max = 200.0
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive range of `f32` values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl ValueRange {
    /// Create a range
    pub fn new(min: f32, max: f32) -> Self {
        ValueRange { min, max }
    }

    /// Whether `value` lies within the range
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        // The sampler scales the span up slightly, so it must stay finite when doubled.
        let ok = self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.min <= self.max
            && ((self.max - self.min) * 2.0).is_finite();
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Population and runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of entities to seed
    pub entity_count: usize,
    /// RNG seed; `None` draws a fresh one per run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Worker threads for parallel systems; 0 uses the global Rayon pool
    pub worker_threads: usize,
    /// Speed range in viewport units per second
    pub velocity: ValueRange,
    /// Uniform scale range
    pub scale: ValueRange,
}

impl SimulationConfig {
    /// Default population size
    pub const DEFAULT_ENTITY_COUNT: usize = 1000;

    /// Largest population a configuration may request
    pub const MAX_ENTITY_COUNT: usize = 1 << 24;

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML
    ///
    /// Seeds above `i64::MAX` cannot be represented in TOML and fail with
    /// [`ConfigError::Serialize`].
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check that the configuration can seed a population
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_count == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.entity_count > Self::MAX_ENTITY_COUNT {
            return Err(ConfigError::PopulationTooLarge {
                count: self.entity_count,
                max: Self::MAX_ENTITY_COUNT,
            });
        }
        self.velocity.validate("velocity")?;
        self.scale.validate("scale")?;
        Ok(())
    }

    /// Set the population size
    pub fn with_entity_count(mut self, entity_count: usize) -> Self {
        self.entity_count = entity_count;
        self
    }

    /// Set a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the worker thread count
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            entity_count: Self::DEFAULT_ENTITY_COUNT,
            seed: None,
            worker_threads: 0,
            velocity: ValueRange::new(50.0, 500.0),
            scale: ValueRange::new(5.0, 15.0),
        }
    }
}
