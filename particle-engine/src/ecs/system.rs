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
//! System traits
//!
//! Systems hold the per-frame logic. Each one declares a [`Query`] naming the
//! attributes it touches; the scheduler borrows exactly those columns from
//! the store and hands the system one row at a time.
//!
//! Two flavors exist:
//!
//! - [`System`] is a per-entity kernel. `update` takes `&self`, so the
//!   scheduler may call it from several worker threads at once on disjoint
//!   rows when the system is registered as parallel.
//! - [`ExclusiveSystem`] receives the whole matched range at once and runs
//!   serially. It is meant for work that funnels into a single target, such
//!   as filling a render buffer.

use crate::ecs::query::{Query, QueryItem, Rows};
use crate::ecs::Entity;
use crate::error::SystemError;

/// Per-frame values shared by every system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    delta_time: f32,
    frame: u64,
}

impl FrameContext {
    /// Create a context for frame number `frame`
    pub fn new(delta_time: f32, frame: u64) -> Self {
        FrameContext { delta_time, frame }
    }

    /// Seconds elapsed since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Frame number, starting at 1 for the first frame
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Per-entity system
///
/// # Examples
///
/// ```
/// use particle_engine::ecs::{Entity, FrameContext, QueryItem, System, Write};
/// use particle_engine::ecs::components::Position;
///
/// struct Drift;
///
/// impl System for Drift {
///     type Query = Write<Position>;
///
///     fn update(&self, ctx: &FrameContext, _entity: Entity, position: QueryItem<'_, Self::Query>) {
///         position.set_y(position.y() + ctx.delta_time());
///     }
/// }
/// ```
pub trait System: Send + Sync {
    /// Attributes the system reads and writes
    type Query: Query;

    /// Called once per frame before any `update`
    ///
    /// This is the only place a system may change its own state. Returning
    /// an error aborts the frame before any entity is visited.
    fn prepare(&mut self, _ctx: &FrameContext) -> Result<(), SystemError> {
        Ok(())
    }

    /// Process one matched entity
    fn update(&self, ctx: &FrameContext, entity: Entity, item: QueryItem<'_, Self::Query>);
}

/// Whole-range system that always runs on the calling thread
pub trait ExclusiveSystem: Send {
    /// Attributes the system reads and writes
    type Query: Query;

    /// Process every matched entity in ascending index order
    fn run(&mut self, ctx: &FrameContext, rows: Rows<'_, Self::Query>) -> Result<(), SystemError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Position, Velocity};
    use crate::ecs::{EntityInit, EntityStore, Read, Write};

    struct Counter {
        prepared: u32,
    }

    impl System for Counter {
        type Query = (Write<Position>, Read<Velocity>);

        fn prepare(&mut self, _ctx: &FrameContext) -> Result<(), SystemError> {
            self.prepared += 1;
            Ok(())
        }

        fn update(&self, ctx: &FrameContext, _entity: Entity, item: QueryItem<'_, Self::Query>) {
            let (position, velocity) = item;
            position.set_x(position.x() + velocity.dx() * ctx.frame() as f32);
        }
    }

    struct Collect(Vec<usize>);

    impl ExclusiveSystem for Collect {
        type Query = Read<Position>;

        fn run(&mut self, _ctx: &FrameContext, rows: Rows<'_, Self::Query>) -> Result<(), SystemError> {
            self.0.extend(rows.map(|(entity, _)| entity.index()));
            Ok(())
        }
    }

    #[test]
    fn test_frame_context() {
        let ctx = FrameContext::new(0.016, 3);
        assert_eq!(ctx.delta_time(), 0.016);
        assert_eq!(ctx.frame(), 3);
    }

    #[test]
    fn test_system_driven_by_hand() {
        let mut store = EntityStore::new();
        store
            .create(2, |_| {
                EntityInit::new()
                    .with_position(Position::zero())
                    .with_velocity(Velocity::new(2.0, 0.0))
            })
            .unwrap();

        let ctx = FrameContext::new(1.0, 5);
        let mut system = Counter { prepared: 0 };
        system.prepare(&ctx).unwrap();
        for (entity, item) in store.query::<<Counter as System>::Query>().unwrap() {
            system.update(&ctx, entity, item);
        }

        assert_eq!(system.prepared, 1);
        assert!(store.column::<Position>().iter().all(|p| p.x() == 10.0));
    }

    #[test]
    fn test_exclusive_system_sees_index_order() {
        let mut store = EntityStore::new();
        store.create(4, |_| EntityInit::new().with_position(Position::zero())).unwrap();

        let mut collect = Collect(Vec::new());
        let rows = store.query::<Read<Position>>().unwrap();
        collect.run(&FrameContext::new(0.0, 1), rows).unwrap();
        assert_eq!(collect.0, vec![0, 1, 2, 3]);
    }
}
