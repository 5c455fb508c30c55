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
//! Entity Component System core
//!
//! Particles are stored struct-of-arrays in an [`EntityStore`]: one dense
//! column per attribute plus a presence mask per entity. Systems declare the
//! columns they need through a [`Query`] and are driven once per frame, in
//! registration order, by the [`Scheduler`].

mod component;
pub mod components;
mod entity;
mod query;
mod scheduler;
mod store;
mod system;
pub mod systems;

pub use component::{Attribute, AttributeKind, AttributeSet};
pub use entity::Entity;
pub use query::{Query, QueryItem, Read, Rows, Write};
pub use scheduler::{FrameStats, Scheduler, SystemDescriptor};
#[doc(hidden)]
pub use store::{ColumnSlots, Columns};
pub use store::{EntityInit, EntityStore};
pub use system::{ExclusiveSystem, FrameContext, System};

#[cfg(test)]
mod tests {
    use super::components::{Position, Velocity};
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = EntityStore::new();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let mut store = EntityStore::new();
        let entities = store
            .create(1, |_| EntityInit::new().with_position(Position::zero()))
            .unwrap();
        assert_eq!(entities, vec![Entity::from_index(0)]);
        assert!(store.contains(entities[0]));
        assert_eq!(store.attributes(entities[0]), Some(AttributeSet::of(AttributeKind::Position)));
        assert!(store.get::<Velocity>(entities[0]).is_none());
    }
}
