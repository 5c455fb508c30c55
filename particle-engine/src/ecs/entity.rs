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
//! Entity handles
//!
//! An entity is nothing more than a row number into the attribute columns
//! owned by [`EntityStore`](crate::ecs::EntityStore). Rows are allocated
//! densely at seeding time and never recycled, so the index alone is a
//! stable identity for the lifetime of the store.

use std::fmt;

/// Dense handle identifying one row across all attribute columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(usize);

impl Entity {
    /// Create a handle for the given row index
    pub fn from_index(index: usize) -> Self {
        Entity(index)
    }

    /// Get the row index of this entity
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl From<Entity> for usize {
    fn from(entity: Entity) -> Self {
        entity.0
    }
}
