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
//! # Particle Engine
//!
//! A data-oriented ECS core for bouncing-particle simulations.
//!
//! ## Features
//!
//! - **ECS Architecture**: struct-of-arrays attribute storage with typed queries
//! - **Ordered Scheduling**: systems run in registration order with a barrier between them
//! - **Parallelization**: optional Rayon fan-out over contiguous entity ranges
//! - **Render Batching**: one `#[repr(C)]` instance buffer per frame for a host renderer
//! - **Reproducible Seeding**: ChaCha8 population seeding driven by a TOML config
//!
//! ## Example
//!
//! ```rust
//! use particle_engine::{FrameRecorder, Simulation, SimulationConfig, ViewportBounds};
//!
//! let config = SimulationConfig::default().with_entity_count(250).with_seed(7);
//! let bounds = ViewportBounds::new(1280.0, 720.0);
//! let recorder = FrameRecorder::shared();
//!
//! let mut simulation = Simulation::new(config, bounds, recorder.clone()).unwrap();
//! for _ in 0..60 {
//!     simulation.tick(1.0 / 60.0).unwrap();
//! }
//!
//! let recorder = recorder.lock().unwrap();
//! assert_eq!(recorder.frames(), 60);
//! assert_eq!(recorder.last_frame().len(), 250);
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Seeding configuration
pub mod config;

/// Error types
pub mod error;

/// Render batch output
pub mod render;

/// Initial population seeding
pub mod seeding;

/// Top-level simulation driver
pub mod simulation;

/// Viewport bounds
pub mod viewport;

pub use config::{SimulationConfig, ValueRange};
pub use ecs::{Entity, EntityStore, FrameStats, Scheduler};
pub use error::{ConfigError, FrameError, SinkError, StoreError, SystemError};
pub use render::{FrameRecorder, RenderInstance, RenderSink, Transform2D};
pub use simulation::Simulation;
pub use viewport::{BoundsSource, ViewportBounds};
