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
//! Initial population seeding
//!
//! Entities are drawn from a ChaCha8 stream, so a configured seed replays
//! the exact same population on every platform.

use crate::config::SimulationConfig;
use crate::ecs::components::{Color, Position, Scale, Velocity};
use crate::ecs::{EntityInit, EntityStore};
use crate::error::ConfigError;
use crate::viewport::ViewportBounds;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

/// Random entity generator
pub struct ParticleFactory {
    rng: ChaCha8Rng,
    config: SimulationConfig,
    bounds: ViewportBounds,
}

impl ParticleFactory {
    /// Create a factory drawing from `seed`
    pub fn new(seed: u64, config: SimulationConfig, bounds: ViewportBounds) -> Self {
        ParticleFactory {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            bounds,
        }
    }

    /// Draw one fully populated entity
    ///
    /// Position is uniform over the viewport, heading uniform over a full
    /// turn, speed and scale uniform over their configured ranges, and
    /// hue, saturation and value uniform in [0, 1) with full opacity.
    pub fn create_particle(&mut self) -> EntityInit {
        let rng = &mut self.rng;
        let position = Position::new(
            rng.gen_range(0.0..self.bounds.width),
            rng.gen_range(0.0..self.bounds.height),
        );
        let speed = rng.gen_range(self.config.velocity.min..=self.config.velocity.max);
        let velocity = Velocity::from_angle(rng.gen_range(0.0..TAU), speed);
        let scale = Scale::uniform(rng.gen_range(self.config.scale.min..=self.config.scale.max));
        let color = Color::hsva(
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            1.0,
        );

        EntityInit::full(position, velocity, scale, color)
    }
}

/// Fill `store` with `config.entity_count` random entities
///
/// Returns the seed that was used. Without a configured seed a fresh one is
/// drawn and logged, so the run can be replayed by putting it in the config.
pub fn seed_population(
    store: &mut EntityStore,
    config: &SimulationConfig,
    bounds: ViewportBounds,
) -> Result<u64, ConfigError> {
    config.validate()?;
    if !bounds.has_area() {
        return Err(ConfigError::InvalidViewport {
            width: bounds.width,
            height: bounds.height,
        });
    }

    let seed = match config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            log::info!("no seed configured; seeding population with {}", seed);
            seed
        }
    };

    let mut factory = ParticleFactory::new(seed, config.clone(), bounds);
    store.create(config.entity_count, |_| factory.create_particle())?;
    log::info!(
        "seeded {} entities in a {}x{} viewport",
        config.entity_count,
        bounds.width,
        bounds.height
    );
    Ok(seed)
}
