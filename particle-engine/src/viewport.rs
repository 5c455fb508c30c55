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
//! Viewport bounds
//!
//! The visible area is owned by the host. The engine only ever asks for its
//! current size through a [`BoundsSource`], once per frame, so window
//! resizes take effect on the next tick without any notification plumbing.

/// Axis-aligned viewport rectangle with its origin at (0, 0)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportBounds {
    /// Width in viewport units
    pub width: f32,
    /// Height in viewport units
    pub height: f32,
}

impl ViewportBounds {
    /// Create bounds of the given size
    pub fn new(width: f32, height: f32) -> Self {
        ViewportBounds { width, height }
    }

    /// Whether both extents are finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// Whether the bounds enclose a non-empty area
    pub fn has_area(&self) -> bool {
        self.is_valid() && self.width > 0.0 && self.height > 0.0
    }

    /// Whether `(x, y)` lies in `[0, width) x [0, height)`
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width && y < self.height
    }
}

/// Supplier of the current viewport size
///
/// Implemented for fixed [`ViewportBounds`] and for closures, which lets a
/// host share a resizable viewport:
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use particle_engine::viewport::{BoundsSource, ViewportBounds};
///
/// let window = Arc::new(Mutex::new(ViewportBounds::new(800.0, 600.0)));
/// let handle = Arc::clone(&window);
/// let source = move || *handle.lock().unwrap();
///
/// *window.lock().unwrap() = ViewportBounds::new(1024.0, 768.0);
/// assert_eq!(source.bounds().width, 1024.0);
/// ```
pub trait BoundsSource: Send + Sync {
    /// The viewport size for the frame about to run
    fn bounds(&self) -> ViewportBounds;
}

impl BoundsSource for ViewportBounds {
    fn bounds(&self) -> ViewportBounds {
        *self
    }
}

impl<F> BoundsSource for F
where
    F: Fn() -> ViewportBounds + Send + Sync,
{
    fn bounds(&self) -> ViewportBounds {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_contains_is_half_open() {
        let bounds = ViewportBounds::new(100.0, 50.0);
        assert!(bounds.contains(0.0, 0.0));
        assert!(bounds.contains(99.9, 49.9));
        assert!(!bounds.contains(100.0, 10.0));
        assert!(!bounds.contains(10.0, 50.0));
        assert!(!bounds.contains(-0.1, 10.0));
    }

    #[test]
    fn test_validity() {
        assert!(ViewportBounds::new(0.0, 0.0).is_valid());
        assert!(!ViewportBounds::new(0.0, 0.0).has_area());
        assert!(ViewportBounds::new(640.0, 480.0).has_area());
        assert!(!ViewportBounds::new(-1.0, 480.0).is_valid());
        assert!(!ViewportBounds::new(f32::NAN, 480.0).is_valid());
        assert!(!ViewportBounds::new(640.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_closure_source_is_queried_each_time() {
        let width = Arc::new(AtomicU32::new(100));
        let handle = Arc::clone(&width);
        let source = move || ViewportBounds::new(handle.load(Ordering::Relaxed) as f32, 10.0);

        assert_eq!(source.bounds().width, 100.0);
        width.store(250, Ordering::Relaxed);
        assert_eq!(source.bounds().width, 250.0);
    }
}
