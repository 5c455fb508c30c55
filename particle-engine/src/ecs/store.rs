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
//! Struct-of-arrays entity storage
//!
//! The [`EntityStore`] keeps one dense column per attribute plus a presence
//! mask per row. Rows are only ever appended to all columns at once, so the
//! columns share a length and row `i` of every column describes entity `i`.
//!
//! # Memory Layout
//!
//! ```text
//! masks:      [m0, m1, m2, ...]
//! positions:  [p0, p1, p2, ...]
//! velocities: [v0, v1, v2, ...]
//! scales:     [s0, s1, s2, ...]
//! colors:     [c0, c1, c2, ...]
//! ```
//!
//! Systems never touch the columns directly; they borrow them through a
//! [`Query`] that names exactly the attributes it reads and writes.

use crate::ecs::component::{Attribute, AttributeKind, AttributeSet};
use crate::ecs::components::{Color, Position, Scale, Velocity};
use crate::ecs::query::{Query, Rows};
use crate::ecs::Entity;
use crate::error::StoreError;

/// Initial attribute values for one entity
///
/// Attributes left unset are absent from the entity's mask, so queries
/// requiring them skip the row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityInit {
    position: Option<Position>,
    velocity: Option<Velocity>,
    scale: Option<Scale>,
    color: Option<Color>,
}

impl EntityInit {
    /// An entity with no attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// An entity carrying all four attributes
    pub fn full(position: Position, velocity: Velocity, scale: Scale, color: Color) -> Self {
        EntityInit {
            position: Some(position),
            velocity: Some(velocity),
            scale: Some(scale),
            color: Some(color),
        }
    }

    /// Set the position
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the velocity
    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// The presence mask this initializer produces
    pub fn attributes(&self) -> AttributeSet {
        let mut set = AttributeSet::empty();
        if self.position.is_some() {
            set = set.with(AttributeKind::Position);
        }
        if self.velocity.is_some() {
            set = set.with(AttributeKind::Velocity);
        }
        if self.scale.is_some() {
            set = set.with(AttributeKind::Scale);
        }
        if self.color.is_some() {
            set = set.with(AttributeKind::Color);
        }
        set
    }
}

/// The attribute columns of a store
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct Columns {
    pub(crate) positions: Vec<Position>,
    pub(crate) velocities: Vec<Velocity>,
    pub(crate) scales: Vec<Scale>,
    pub(crate) colors: Vec<Color>,
}

impl Columns {
    fn with_capacity(capacity: usize) -> Self {
        Columns {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            scales: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    fn reserve(&mut self, additional: usize) {
        self.positions.reserve(additional);
        self.velocities.reserve(additional);
        self.scales.reserve(additional);
        self.colors.reserve(additional);
    }

    fn push(&mut self, init: EntityInit) {
        self.positions.push(init.position.unwrap_or_default());
        self.velocities.push(init.velocity.unwrap_or_default());
        self.scales.push(init.scale.unwrap_or_default());
        self.colors.push(init.color.unwrap_or_default());
    }

    fn slots(&mut self) -> ColumnSlots<'_> {
        ColumnSlots {
            positions: Some(self.positions.as_mut_slice()),
            velocities: Some(self.velocities.as_mut_slice()),
            scales: Some(self.scales.as_mut_slice()),
            colors: Some(self.colors.as_mut_slice()),
        }
    }
}

/// Split mutable borrows of every column
///
/// Each query accessor takes its column out of the slot it owns; a second
/// accessor naming the same attribute finds the slot empty.
#[doc(hidden)]
pub struct ColumnSlots<'a> {
    pub(crate) positions: Option<&'a mut [Position]>,
    pub(crate) velocities: Option<&'a mut [Velocity]>,
    pub(crate) scales: Option<&'a mut [Scale]>,
    pub(crate) colors: Option<&'a mut [Color]>,
}

/// Dense struct-of-arrays store for entity attributes
///
/// # Examples
///
/// ```
/// use particle_engine::ecs::{EntityInit, EntityStore, Read, Write};
/// use particle_engine::ecs::components::{Position, Velocity};
///
/// let mut store = EntityStore::new();
/// store.create(2, |i| {
///     EntityInit::new()
///         .with_position(Position::new(i as f32, 0.0))
///         .with_velocity(Velocity::new(1.0, 0.0))
/// }).unwrap();
///
/// for (_entity, (position, velocity)) in store.query::<(Write<Position>, Read<Velocity>)>().unwrap() {
///     position.integrate(velocity, 1.0);
/// }
///
/// let xs: Vec<f32> = store.column::<Position>().iter().map(|p| p.x()).collect();
/// assert_eq!(xs, vec![1.0, 2.0]);
/// ```
#[derive(Debug, Default)]
pub struct EntityStore {
    masks: Vec<AttributeSet>,
    columns: Columns,
    sealed: bool,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty store with room for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        EntityStore {
            masks: Vec::with_capacity(capacity),
            columns: Columns::with_capacity(capacity),
            sealed: false,
        }
    }

    /// Allocate `count` entities, calling `initializer(index)` for each row
    ///
    /// Indices passed to the initializer are the global row indices of the
    /// new entities. A count of zero is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sealed`] once the scheduler has run a frame
    /// against this store; the population is fixed from then on.
    pub fn create<F>(&mut self, count: usize, mut initializer: F) -> Result<Vec<Entity>, StoreError>
    where
        F: FnMut(usize) -> EntityInit,
    {
        if self.sealed {
            return Err(StoreError::Sealed);
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let first = self.masks.len();
        self.masks.reserve(count);
        self.columns.reserve(count);

        for index in first..first + count {
            let init = initializer(index);
            self.masks.push(init.attributes());
            self.columns.push(init);
        }

        debug_assert_eq!(self.masks.len(), self.columns.positions.len());
        debug_assert_eq!(self.masks.len(), self.columns.velocities.len());
        debug_assert_eq!(self.masks.len(), self.columns.scales.len());
        debug_assert_eq!(self.masks.len(), self.columns.colors.len());

        Ok((first..first + count).map(Entity::from_index).collect())
    }

    /// Borrow the columns named by `Q` and iterate matching rows
    ///
    /// Rows are visited in ascending index order. Every call starts a fresh
    /// iteration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AliasedQuery`] if `Q` names an attribute twice.
    pub fn query<Q: Query>(&mut self) -> Result<Rows<'_, Q>, StoreError> {
        let mut slots = self.columns.slots();
        let columns = Q::take(&mut slots).ok_or(StoreError::AliasedQuery {
            query: std::any::type_name::<Q>(),
        })?;
        Ok(Rows::new(&self.masks, columns))
    }

    /// Iterate the entities whose mask is a superset of `required`
    pub fn matching(&self, required: AttributeSet) -> impl Iterator<Item = Entity> + '_ {
        self.masks
            .iter()
            .enumerate()
            .filter(move |(_, mask)| mask.contains(required))
            .map(|(index, _)| Entity::from_index(index))
    }

    /// Count the entities whose mask is a superset of `required`
    pub fn count_matching(&self, required: AttributeSet) -> usize {
        self.masks.iter().filter(|mask| mask.contains(required)).count()
    }

    /// Read an attribute of an entity, if the entity carries it
    pub fn get<T: Attribute>(&self, entity: Entity) -> Option<&T> {
        let mask = self.masks.get(entity.index())?;
        if mask.has(T::KIND) {
            T::column(&self.columns).get(entity.index())
        } else {
            None
        }
    }

    /// Read a whole attribute column
    ///
    /// The column has one slot per entity; slots of entities lacking the
    /// attribute hold the attribute's default value.
    pub fn column<T: Attribute>(&self) -> &[T] {
        T::column(&self.columns)
    }

    /// The presence mask of an entity
    pub fn attributes(&self, entity: Entity) -> Option<AttributeSet> {
        self.masks.get(entity.index()).copied()
    }

    /// Whether the handle refers to a row of this store
    pub fn contains(&self, entity: Entity) -> bool {
        entity.index() < self.masks.len()
    }

    /// Number of entities in the store
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Whether the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Whether the population has been frozen by a scheduler run
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }
}
