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
//! Error types
//!
//! Errors fall into two groups. Construction-time problems (bad seeding
//! parameters, unreadable config, a thread pool that cannot be built) are
//! reported as [`ConfigError`] before any frame runs. Problems during a
//! frame are reported as [`FrameError`]; the frame is abandoned at the
//! failing routine and the host driver decides whether to keep ticking.

use thiserror::Error;

/// Errors raised while building a simulation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The population would be empty
    #[error("entity count must be greater than zero")]
    EmptyPopulation,

    /// The population exceeds the supported maximum
    #[error("entity count {count} exceeds the maximum of {max}")]
    PopulationTooLarge {
        /// Requested entity count
        count: usize,
        /// Largest accepted entity count
        max: usize,
    },

    /// A seeding range is inverted, negative or not finite
    #[error("invalid {name} range [{min}, {max}]")]
    InvalidRange {
        /// Which range was rejected
        name: &'static str,
        /// Lower bound as configured
        min: f32,
        /// Upper bound as configured
        max: f32,
    },

    /// The viewport cannot host a population
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport {
        /// Viewport width
        width: f32,
        /// Viewport height
        height: f32,
    },

    /// A system query names the same attribute more than once
    #[error("system '{system}' declares an attribute more than once")]
    AliasedQuery {
        /// Name the system was registered under
        system: String,
    },

    /// The worker pool could not be created
    #[cfg(feature = "parallel")]
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The entity store rejected the initial population
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by [`EntityStore`](crate::ecs::EntityStore)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Entities may only be created before the first frame
    #[error("entity store is sealed; the population is fixed after the first frame")]
    Sealed,

    /// The query borrows the same column twice
    #[error("query {query} names an attribute more than once")]
    AliasedQuery {
        /// Type name of the offending query
        query: &'static str,
    },
}

/// Errors raised by a [`RenderSink`](crate::render::RenderSink)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The host refused the frame
    #[error("render sink rejected frame: {0}")]
    Rejected(String),

    /// A shared sink's lock was poisoned by a panicking holder
    #[error("render sink lock poisoned")]
    Poisoned,
}

/// Errors raised by a single system during a frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    /// The viewport reported for this frame is unusable
    #[error("invalid viewport bounds {width}x{height}")]
    InvalidBounds {
        /// Reported width
        width: f32,
        /// Reported height
        height: f32,
    },

    /// The render sink failed to accept the batch
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The store refused the system's query
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that abort a frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The host passed a negative or non-finite frame time
    #[error("invalid delta time {0}")]
    InvalidDeltaTime(f32),

    /// A registered system failed; later systems did not run
    #[error("system '{system}' failed: {source}")]
    System {
        /// Name the system was registered under
        system: String,
        /// The underlying failure
        source: SystemError,
    },
}

impl FrameError {
    /// Name of the failing system, if the frame failed inside one
    pub fn system(&self) -> Option<&str> {
        match self {
            FrameError::System { system, .. } => Some(system),
            FrameError::InvalidDeltaTime(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_names_system() {
        let err = FrameError::System {
            system: "bounce".to_string(),
            source: SystemError::InvalidBounds { width: -1.0, height: 10.0 },
        };
        assert_eq!(err.system(), Some("bounce"));
        assert_eq!(err.to_string(), "system 'bounce' failed: invalid viewport bounds -1x10");
        assert_eq!(FrameError::InvalidDeltaTime(f32::NAN).system(), None);
    }

    #[test]
    fn test_sink_error_converts() {
        let err: SystemError = SinkError::Rejected("device lost".to_string()).into();
        assert_eq!(err.to_string(), "render sink rejected frame: device lost");
    }

    #[test]
    fn test_store_error_converts_to_config_error() {
        let err: ConfigError = StoreError::Sealed.into();
        assert!(matches!(err, ConfigError::Store(StoreError::Sealed)));
    }
}
