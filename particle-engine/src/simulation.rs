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
//! Top-level simulation driver
//!
//! A [`Simulation`] owns the entity store and the scheduler. The host calls
//! [`Simulation::tick`] once per displayed frame with the elapsed time; the
//! render sink it supplied receives the batch before `tick` returns.

use crate::config::SimulationConfig;
use crate::ecs::systems::{BounceSystem, ColorCycleSystem, MovementSystem, RenderBatchSystem};
use crate::ecs::{EntityStore, FrameStats, Scheduler};
use crate::error::{ConfigError, FrameError};
use crate::render::RenderSink;
use crate::seeding::seed_population;
use crate::viewport::BoundsSource;

/// Seeded store plus scheduler
///
/// # Examples
///
/// ```
/// use particle_engine::{FrameRecorder, Simulation, SimulationConfig, ViewportBounds};
///
/// let recorder = FrameRecorder::shared();
/// let config = SimulationConfig::default().with_entity_count(100).with_seed(1);
/// let mut simulation = Simulation::new(config, ViewportBounds::new(800.0, 600.0), recorder.clone()).unwrap();
///
/// simulation.tick(1.0 / 60.0).unwrap();
/// assert_eq!(recorder.lock().unwrap().last_count(), 100);
/// ```
pub struct Simulation {
    store: EntityStore,
    scheduler: Scheduler,
    seed: Option<u64>,
}

impl Simulation {
    /// Build the standard bouncing-particle simulation
    ///
    /// Seeds `config.entity_count` entities against the bounds reported
    /// right now, then registers `movement`, `bounce` and `color_cycle` as
    /// parallel systems followed by `render`.
    pub fn new<B, S>(config: SimulationConfig, bounds: B, sink: S) -> Result<Self, ConfigError>
    where
        B: BoundsSource + 'static,
        S: RenderSink + 'static,
    {
        config.validate()?;
        let mut scheduler = Scheduler::with_threads(config.worker_threads)?;
        let mut store = EntityStore::with_capacity(config.entity_count);
        let seed = seed_population(&mut store, &config, bounds.bounds())?;

        scheduler.register("movement", true, MovementSystem::new())?;
        scheduler.register("bounce", true, BounceSystem::new(bounds))?;
        scheduler.register("color_cycle", true, ColorCycleSystem::new())?;
        scheduler.register_exclusive("render", RenderBatchSystem::with_capacity(sink, config.entity_count))?;

        Ok(Simulation {
            store,
            scheduler,
            seed: Some(seed),
        })
    }

    /// Assemble a simulation from a custom store and scheduler
    pub fn from_parts(store: EntityStore, scheduler: Scheduler) -> Self {
        Simulation {
            store,
            scheduler,
            seed: None,
        }
    }

    /// Advance by `delta_time` seconds
    pub fn tick(&mut self, delta_time: f32) -> Result<FrameStats, FrameError> {
        self.scheduler.run_frame(&mut self.store, delta_time)
    }

    /// The entity store
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Frames started so far
    pub fn frames(&self) -> u64 {
        self.scheduler.frame()
    }

    /// Seed the population was drawn from, if it was seeded by [`Simulation::new`]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Split back into store and scheduler
    pub fn into_parts(self) -> (EntityStore, Scheduler) {
        (self.store, self.scheduler)
    }
}
