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
//! Typed attribute queries
//!
//! A query is a compile-time description of the attributes a system touches.
//! [`Read<T>`] grants shared access to one attribute, [`Write<T>`] grants
//! exclusive access, and tuples of up to four accessors combine them:
//!
//! ```
//! use particle_engine::ecs::{Query, Read, Write, AttributeKind};
//! use particle_engine::ecs::components::{Position, Velocity};
//!
//! type Motion = (Write<Position>, Read<Velocity>);
//! assert!(Motion::ACCESS.has(AttributeKind::Velocity));
//! assert!(!Motion::WRITES.has(AttributeKind::Velocity));
//! ```
//!
//! The item a query yields per entity contains only references to the
//! declared attributes, so a system cannot reach anything it did not ask for.
//! Because every item borrows a single row, items of different rows never
//! alias, which is what allows [`Rows::par_for_each`] to hand disjoint row
//! ranges to different worker threads.

use crate::ecs::component::{Attribute, AttributeSet};
use crate::ecs::store::ColumnSlots;
use crate::ecs::Entity;
use std::marker::PhantomData;

/// Compile-time attribute access declaration
///
/// Implemented by [`Read`], [`Write`] and tuples of them. The associated
/// column type is the borrowed slice (or tuple of slices) the query holds
/// while it runs.
pub trait Query {
    /// Every attribute the query reads or writes
    const ACCESS: AttributeSet;
    /// The attributes the query writes
    const WRITES: AttributeSet;
    /// True when two accessors of the query name the same attribute
    const ALIASED: bool;

    /// Borrowed column data for a contiguous row range
    type Column<'a>: Send;
    /// Per-entity item handed to systems
    type Item<'a>;

    /// Take the needed columns out of the store's slots
    ///
    /// Returns `None` if a column was already taken by another accessor.
    fn take<'a>(slots: &mut ColumnSlots<'a>) -> Option<Self::Column<'a>>;

    /// Split the borrowed range into `[0, mid)` and `[mid, len)`
    fn split_at<'a>(column: Self::Column<'a>, mid: usize) -> (Self::Column<'a>, Self::Column<'a>);

    /// Pop the item of the first row in the range
    fn next<'a>(column: &mut Self::Column<'a>) -> Option<Self::Item<'a>>;
}

/// Per-entity item type of a query
pub type QueryItem<'a, Q> = <Q as Query>::Item<'a>;

/// Shared access to attribute `T`
pub struct Read<T>(PhantomData<T>);

/// Exclusive access to attribute `T`
pub struct Write<T>(PhantomData<T>);

impl<T: Attribute> Query for Read<T> {
    const ACCESS: AttributeSet = AttributeSet::of(T::KIND);
    const WRITES: AttributeSet = AttributeSet::empty();
    const ALIASED: bool = false;

    type Column<'a> = &'a [T];
    type Item<'a> = &'a T;

    fn take<'a>(slots: &mut ColumnSlots<'a>) -> Option<Self::Column<'a>> {
        let column: &'a [T] = T::take_slot(slots)?;
        Some(column)
    }

    fn split_at<'a>(column: Self::Column<'a>, mid: usize) -> (Self::Column<'a>, Self::Column<'a>) {
        column.split_at(mid)
    }

    fn next<'a>(column: &mut Self::Column<'a>) -> Option<Self::Item<'a>> {
        let slice: &'a [T] = *column;
        let (first, rest) = slice.split_first()?;
        *column = rest;
        Some(first)
    }
}

impl<T: Attribute> Query for Write<T> {
    const ACCESS: AttributeSet = AttributeSet::of(T::KIND);
    const WRITES: AttributeSet = AttributeSet::of(T::KIND);
    const ALIASED: bool = false;

    type Column<'a> = &'a mut [T];
    type Item<'a> = &'a mut T;

    fn take<'a>(slots: &mut ColumnSlots<'a>) -> Option<Self::Column<'a>> {
        T::take_slot(slots)
    }

    fn split_at<'a>(column: Self::Column<'a>, mid: usize) -> (Self::Column<'a>, Self::Column<'a>) {
        column.split_at_mut(mid)
    }

    fn next<'a>(column: &mut Self::Column<'a>) -> Option<Self::Item<'a>> {
        let slice: &'a mut [T] = std::mem::take(column);
        let (first, rest) = slice.split_first_mut()?;
        *column = rest;
        Some(first)
    }
}

macro_rules! impl_query_tuple {
    ($($name:ident $var:ident),+) => {
        impl<$($name: Query),+> Query for ($($name,)+) {
            const ACCESS: AttributeSet = AttributeSet::empty()$(.union($name::ACCESS))+;
            const WRITES: AttributeSet = AttributeSet::empty()$(.union($name::WRITES))+;
            const ALIASED: bool =
                $($name::ALIASED ||)+ (0 $(+ $name::ACCESS.len())+) != Self::ACCESS.len();

            type Column<'a> = ($($name::Column<'a>,)+);
            type Item<'a> = ($($name::Item<'a>,)+);

            fn take<'a>(slots: &mut ColumnSlots<'a>) -> Option<Self::Column<'a>> {
                Some(($($name::take(slots)?,)+))
            }

            fn split_at<'a>(column: Self::Column<'a>, mid: usize) -> (Self::Column<'a>, Self::Column<'a>) {
                let ($($var,)+) = column;
                $(let $var = $name::split_at($var, mid);)+
                (($($var.0,)+), ($($var.1,)+))
            }

            fn next<'a>(column: &mut Self::Column<'a>) -> Option<Self::Item<'a>> {
                let ($($var,)+) = column;
                Some(($($name::next($var)?,)+))
            }
        }
    };
}

impl_query_tuple!(A a);
impl_query_tuple!(A a, B b);
impl_query_tuple!(A a, B b, C c);
impl_query_tuple!(A a, B b, C c, D d);

/// Lazy iterator over the rows matching a query
///
/// Yields `(entity, item)` in ascending index order, skipping rows whose
/// presence mask lacks any attribute of `Q`.
pub struct Rows<'a, Q: Query> {
    masks: &'a [AttributeSet],
    columns: Q::Column<'a>,
    next_index: usize,
}

impl<'a, Q: Query> Rows<'a, Q> {
    pub(crate) fn new(masks: &'a [AttributeSet], columns: Q::Column<'a>) -> Self {
        Rows {
            masks,
            columns,
            next_index: 0,
        }
    }

    /// Number of rows (matching or not) left in this range
    pub fn span(&self) -> usize {
        self.masks.len()
    }

    /// Split into two disjoint contiguous row ranges at `mid`
    ///
    /// `mid` is clamped to the span.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        let mid = mid.min(self.masks.len());
        let (left_masks, right_masks) = self.masks.split_at(mid);
        let (left, right) = Q::split_at(self.columns, mid);
        (
            Rows {
                masks: left_masks,
                columns: left,
                next_index: self.next_index,
            },
            Rows {
                masks: right_masks,
                columns: right,
                next_index: self.next_index + mid,
            },
        )
    }

    /// Visit every matching row, partitioned across the current Rayon pool
    ///
    /// The range is cut into `partitions` contiguous chunks of near-equal
    /// span; each chunk is visited serially by one worker. Returns once
    /// every chunk has finished, with the number of rows visited.
    #[cfg(feature = "parallel")]
    pub fn par_for_each<F>(self, partitions: usize, f: &F) -> usize
    where
        F: Fn(Entity, Q::Item<'a>) + Sync,
    {
        let span = self.span();
        if span == 0 {
            return 0;
        }
        let partitions = partitions.clamp(1, span);
        let chunk_len = span.div_ceil(partitions);
        self.visit_chunks(chunk_len, f)
    }

    #[cfg(feature = "parallel")]
    fn visit_chunks<F>(self, chunk_len: usize, f: &F) -> usize
    where
        F: Fn(Entity, Q::Item<'a>) + Sync,
    {
        let span = self.span();
        if span <= chunk_len {
            return self.fold(0, |visited, (entity, item)| {
                f(entity, item);
                visited + 1
            });
        }

        let chunks = span.div_ceil(chunk_len);
        let (left, right) = self.split_at((chunks / 2) * chunk_len);
        let (visited_left, visited_right) = rayon::join(
            || left.visit_chunks(chunk_len, f),
            || right.visit_chunks(chunk_len, f),
        );
        visited_left + visited_right
    }
}

impl<'a, Q: Query> Iterator for Rows<'a, Q> {
    type Item = (Entity, Q::Item<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let masks = self.masks;
            let (mask, rest) = masks.split_first()?;
            self.masks = rest;
            let item = Q::next(&mut self.columns)?;
            let entity = Entity::from_index(self.next_index);
            self.next_index += 1;

            if mask.contains(Q::ACCESS) {
                return Some((entity, item));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.masks.len()))
    }
}
