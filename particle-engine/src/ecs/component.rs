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
//! Attribute declarations
//!
//! The attribute set of this engine is closed: every entity row has a slot
//! for each [`AttributeKind`], and a per-row [`AttributeSet`] records which
//! slots actually hold data. Systems declare the set they need through their
//! query type and only rows whose mask is a superset are visited.

use crate::ecs::store::{ColumnSlots, Columns};
use std::fmt;

/// The closed set of per-entity attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// 2D position in viewport coordinates
    Position,
    /// 2D velocity in viewport units per second
    Velocity,
    /// 2D scale applied to the rendered quad
    Scale,
    /// HSVA color
    Color,
}

impl AttributeKind {
    /// All attribute kinds in declaration order
    pub const ALL: [AttributeKind; 4] = [
        AttributeKind::Position,
        AttributeKind::Velocity,
        AttributeKind::Scale,
        AttributeKind::Color,
    ];

    const fn bit(self) -> u8 {
        match self {
            AttributeKind::Position => 1 << 0,
            AttributeKind::Velocity => 1 << 1,
            AttributeKind::Scale => 1 << 2,
            AttributeKind::Color => 1 << 3,
        }
    }

    /// Human readable attribute name
    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Position => "Position",
            AttributeKind::Velocity => "Velocity",
            AttributeKind::Scale => "Scale",
            AttributeKind::Color => "Color",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitset over [`AttributeKind`]
///
/// Used both as the presence mask of a single entity and as the declared
/// access set of a query. All operations are `const` so query types can
/// compute their access sets at compile time.
///
/// # Examples
///
/// ```
/// use particle_engine::ecs::{AttributeKind, AttributeSet};
///
/// let motion = AttributeSet::of(AttributeKind::Position).with(AttributeKind::Velocity);
/// assert!(AttributeSet::all().contains(motion));
/// assert!(!motion.has(AttributeKind::Color));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttributeSet(u8);

impl AttributeSet {
    /// The empty set
    pub const fn empty() -> Self {
        AttributeSet(0)
    }

    /// Every attribute kind
    pub const fn all() -> Self {
        AttributeSet(0b1111)
    }

    /// A set containing a single kind
    pub const fn of(kind: AttributeKind) -> Self {
        AttributeSet(kind.bit())
    }

    /// This set with `kind` added
    pub const fn with(self, kind: AttributeKind) -> Self {
        AttributeSet(self.0 | kind.bit())
    }

    /// Union of two sets
    pub const fn union(self, other: AttributeSet) -> Self {
        AttributeSet(self.0 | other.0)
    }

    /// Whether `kind` is in this set
    pub const fn has(self, kind: AttributeKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Whether this set is a superset of `other`
    pub const fn contains(self, other: AttributeSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the two sets share at least one kind
    pub const fn intersects(self, other: AttributeSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Number of kinds in the set
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the kinds in declaration order
    pub fn kinds(self) -> impl Iterator<Item = AttributeKind> {
        AttributeKind::ALL.into_iter().filter(move |kind| self.has(*kind))
    }
}

impl From<AttributeKind> for AttributeSet {
    fn from(kind: AttributeKind) -> Self {
        AttributeSet::of(kind)
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, kind) in self.kinds().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(kind.name())?;
        }
        f.write_str("}")
    }
}

/// Trait implemented by the four attribute value types
///
/// Attributes are plain `Copy` data. The column accessors tie each value type
/// to its column in the store; they are hidden because only the store and the
/// query layer call them.
pub trait Attribute: Copy + Default + Send + Sync + 'static {
    /// The kind this value type is stored under
    const KIND: AttributeKind;

    #[doc(hidden)]
    fn column(columns: &Columns) -> &[Self];

    #[doc(hidden)]
    fn take_slot<'a>(slots: &mut ColumnSlots<'a>) -> Option<&'a mut [Self]>;
}
