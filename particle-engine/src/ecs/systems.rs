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
//! Particle systems
//!
//! The four systems that make up a frame, in the order a simulation
//! registers them:
//!
//! 1. [`MovementSystem`] integrates position from velocity.
//! 2. [`BounceSystem`] reflects velocity at the viewport edges.
//! 3. [`ColorCycleSystem`] rotates the hue.
//! 4. [`RenderBatchSystem`] flattens the result into a render batch.
//!
//! Bounce tests the position movement has just produced, so a fast entity
//! may sit past an edge for one frame before its reflected velocity brings
//! it back.

use crate::ecs::components::{Color, Position, Scale, Velocity};
use crate::ecs::query::{QueryItem, Read, Rows, Write};
use crate::ecs::system::{ExclusiveSystem, FrameContext, System};
use crate::ecs::Entity;
use crate::error::SystemError;
use crate::render::{RenderBatch, RenderInstance, RenderSink, Transform2D};
use crate::viewport::{BoundsSource, ViewportBounds};

/// Explicit Euler integration: `position += velocity * dt`
#[derive(Debug, Default, Clone, Copy)]
pub struct MovementSystem;

impl MovementSystem {
    /// Create the system
    pub fn new() -> Self {
        MovementSystem
    }
}

impl System for MovementSystem {
    type Query = (Write<Position>, Read<Velocity>);

    fn update(&self, ctx: &FrameContext, _entity: Entity, item: QueryItem<'_, Self::Query>) {
        let (position, velocity) = item;
        position.integrate(velocity, ctx.delta_time());
    }
}

/// Reflects velocity when an entity reaches a viewport edge
///
/// The bounds are read from the source once per frame, in
/// [`System::prepare`], and shared by every entity of that frame.
pub struct BounceSystem<B> {
    source: B,
    current: ViewportBounds,
}

impl<B: BoundsSource> BounceSystem<B> {
    /// Create a bounce system reading bounds from `source`
    ///
    /// The source is not queried until the first frame.
    pub fn new(source: B) -> Self {
        BounceSystem {
            source,
            current: ViewportBounds::new(0.0, 0.0),
        }
    }

    /// Bounds in effect for the most recent frame
    ///
    /// Zero-sized until the system has run once.
    pub fn bounds(&self) -> ViewportBounds {
        self.current
    }

    /// The bounds source
    pub fn source(&self) -> &B {
        &self.source
    }
}

impl<B: BoundsSource> System for BounceSystem<B> {
    type Query = (Read<Position>, Write<Velocity>);

    fn prepare(&mut self, _ctx: &FrameContext) -> Result<(), SystemError> {
        let bounds = self.source.bounds();
        if !bounds.is_valid() {
            return Err(SystemError::InvalidBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }
        self.current = bounds;
        Ok(())
    }

    fn update(&self, _ctx: &FrameContext, _entity: Entity, item: QueryItem<'_, Self::Query>) {
        let (position, velocity) = item;
        let ViewportBounds { width, height } = self.current;

        // Checks are independent per axis; at a corner both axes flip.
        if position.x() >= width {
            velocity.set_dx(-velocity.dx().abs());
        }
        if position.y() >= height {
            velocity.set_dy(-velocity.dy().abs());
        }
        if position.x() <= 0.0 {
            velocity.set_dx(velocity.dx().abs());
        }
        if position.y() <= 0.0 {
            velocity.set_dy(velocity.dy().abs());
        }
    }
}

/// Advances hue at a constant rate, wrapping into [0, 1)
#[derive(Debug, Clone, Copy)]
pub struct ColorCycleSystem {
    rate: f32,
}

impl ColorCycleSystem {
    /// One full hue turn per second
    pub const DEFAULT_RATE: f32 = 1.0;

    /// Create the system with the default rate
    pub fn new() -> Self {
        ColorCycleSystem {
            rate: Self::DEFAULT_RATE,
        }
    }

    /// Create the system with a custom rate in hue turns per second
    pub fn with_rate(rate: f32) -> Self {
        ColorCycleSystem { rate }
    }

    /// Hue turns per second
    pub fn rate(&self) -> f32 {
        self.rate
    }
}

impl Default for ColorCycleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ColorCycleSystem {
    type Query = Write<Color>;

    fn update(&self, ctx: &FrameContext, _entity: Entity, color: QueryItem<'_, Self::Query>) {
        color.shift_hue(self.rate * ctx.delta_time());
    }
}

/// Fills the render batch and submits it to a sink
///
/// Must be registered after every system that changes position, scale or
/// color, otherwise the sink sees last frame's state for those attributes.
pub struct RenderBatchSystem<S> {
    sink: S,
    batch: RenderBatch,
}

impl<S: RenderSink> RenderBatchSystem<S> {
    /// Create a render system submitting to `sink`
    pub fn new(sink: S) -> Self {
        Self::with_capacity(sink, 0)
    }

    /// Create a render system with room for `capacity` instances
    pub fn with_capacity(sink: S, capacity: usize) -> Self {
        RenderBatchSystem {
            sink,
            batch: RenderBatch::with_capacity(capacity),
        }
    }

    /// The batch submitted by the last frame
    pub fn batch(&self) -> &RenderBatch {
        &self.batch
    }

    /// The render sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the render sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: RenderSink> ExclusiveSystem for RenderBatchSystem<S> {
    type Query = (Read<Position>, Read<Scale>, Read<Color>);

    fn run(&mut self, _ctx: &FrameContext, rows: Rows<'_, Self::Query>) -> Result<(), SystemError> {
        self.batch.clear();
        for (_, (position, scale, color)) in rows {
            let transform = Transform2D::from_scale_translation(*scale, *position);
            self.batch.push(RenderInstance::new(transform, color.to_rgba()));
        }

        self.sink.submit_frame(self.batch.instances(), self.batch.len())?;
        Ok(())
    }
}
