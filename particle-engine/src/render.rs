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
//! Render batch output
//!
//! Once per frame the render batch system flattens every visible entity
//! into a [`RenderInstance`] and hands the whole slice to a [`RenderSink`].
//! Instances are `#[repr(C)]` and [`bytemuck::Pod`], so a GPU host can
//! upload them as-is into an instanced-draw buffer:
//!
//! ```
//! use particle_engine::render::{RenderInstance, Transform2D};
//!
//! let instances = [RenderInstance::new(Transform2D::IDENTITY, [1.0; 4])];
//! let bytes: &[u8] = bytemuck::cast_slice(&instances);
//! assert_eq!(bytes.len(), std::mem::size_of::<RenderInstance>());
//! ```

use crate::ecs::components::{Position, Scale};
use crate::error::SinkError;
use bytemuck::{Pod, Zeroable};
use std::sync::{Arc, Mutex};

/// 2x3 affine transform stored as two basis columns and an origin
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Transform2D {
    /// First basis column
    pub x_axis: [f32; 2],
    /// Second basis column
    pub y_axis: [f32; 2],
    /// Translation
    pub origin: [f32; 2],
}

impl Transform2D {
    /// The identity transform
    pub const IDENTITY: Transform2D = Transform2D {
        x_axis: [1.0, 0.0],
        y_axis: [0.0, 1.0],
        origin: [0.0, 0.0],
    };

    /// Build an unrotated transform from a scale and a translation
    pub fn from_scale_translation(scale: Scale, translation: Position) -> Self {
        Transform2D {
            x_axis: [scale.x(), 0.0],
            y_axis: [0.0, scale.y()],
            origin: translation.as_array(),
        }
    }

    /// Apply the transform to a point
    pub fn transform_point(&self, point: [f32; 2]) -> [f32; 2] {
        [
            self.x_axis[0] * point[0] + self.y_axis[0] * point[1] + self.origin[0],
            self.x_axis[1] * point[0] + self.y_axis[1] * point[1] + self.origin[1],
        ]
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Transform2D::IDENTITY
    }
}

/// One entity's draw data: transform plus straight RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct RenderInstance {
    /// Instance transform
    pub transform: Transform2D,
    /// Color as `[r, g, b, a]`
    pub color: [f32; 4],
}

impl RenderInstance {
    /// Create an instance
    pub fn new(transform: Transform2D, color: [f32; 4]) -> Self {
        RenderInstance { transform, color }
    }
}

/// Per-frame instance buffer
///
/// Cleared and refilled every frame. Capacity reserved up front is kept
/// across frames, so a fixed population never reallocates.
#[derive(Debug, Default)]
pub struct RenderBatch {
    instances: Vec<RenderInstance>,
}

impl RenderBatch {
    /// Create a batch with room for `capacity` instances
    pub fn with_capacity(capacity: usize) -> Self {
        RenderBatch {
            instances: Vec::with_capacity(capacity),
        }
    }

    /// Drop the previous frame's contents
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Append an instance
    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    /// Live instances of the current frame
    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Reserved capacity
    pub fn capacity(&self) -> usize {
        self.instances.capacity()
    }
}

/// Consumer of the per-frame render batch
///
/// Called exactly once per successful frame, after every simulation system
/// has run. The slice is only valid for the duration of the call; hosts that
/// draw later must copy or upload it.
pub trait RenderSink: Send {
    /// Accept this frame's instances
    fn submit_frame(&mut self, instances: &[RenderInstance], count: usize) -> Result<(), SinkError>;
}

impl<T: RenderSink + ?Sized> RenderSink for Box<T> {
    fn submit_frame(&mut self, instances: &[RenderInstance], count: usize) -> Result<(), SinkError> {
        (**self).submit_frame(instances, count)
    }
}

impl<T: RenderSink> RenderSink for Arc<Mutex<T>> {
    fn submit_frame(&mut self, instances: &[RenderInstance], count: usize) -> Result<(), SinkError> {
        let mut sink = self.lock().map_err(|_| SinkError::Poisoned)?;
        sink.submit_frame(instances, count)
    }
}

/// Sink that keeps a copy of the most recent frame
///
/// Useful for headless hosts and for inspecting output in tests.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    last_frame: Vec<RenderInstance>,
    last_count: usize,
    frames: u64,
}

impl FrameRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder sharable with a render system
    pub fn shared() -> Arc<Mutex<FrameRecorder>> {
        Arc::new(Mutex::new(FrameRecorder::new()))
    }

    /// Instances of the last submitted frame
    pub fn last_frame(&self) -> &[RenderInstance] {
        &self.last_frame
    }

    /// Count reported with the last submitted frame
    pub fn last_count(&self) -> usize {
        self.last_count
    }

    /// Number of frames submitted so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for FrameRecorder {
    fn submit_frame(&mut self, instances: &[RenderInstance], count: usize) -> Result<(), SinkError> {
        self.last_frame.clear();
        self.last_frame.extend_from_slice(instances);
        self.last_count = count;
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_has_no_rotation() {
        let transform = Transform2D::from_scale_translation(Scale::uniform(4.0), Position::new(10.0, 20.0));
        assert_eq!(transform.x_axis, [4.0, 0.0]);
        assert_eq!(transform.y_axis, [0.0, 4.0]);
        assert_eq!(transform.origin, [10.0, 20.0]);
        assert_eq!(transform.transform_point([0.5, -0.5]), [12.0, 18.0]);
    }

    #[test]
    fn test_identity_transform() {
        assert_eq!(Transform2D::default().transform_point([3.0, 4.0]), [3.0, 4.0]);
    }

    #[test]
    fn test_instance_layout_is_packed() {
        assert_eq!(std::mem::size_of::<Transform2D>(), 6 * 4);
        assert_eq!(std::mem::size_of::<RenderInstance>(), 10 * 4);
    }

    #[test]
    fn test_batch_keeps_capacity_across_frames() {
        let mut batch = RenderBatch::with_capacity(16);
        for _ in 0..3 {
            batch.clear();
            for _ in 0..16 {
                batch.push(RenderInstance::default());
            }
        }
        assert_eq!(batch.len(), 16);
        assert_eq!(batch.capacity(), 16);
    }

    #[test]
    fn test_recorder_copies_frame() {
        let mut recorder = FrameRecorder::new();
        let instances = vec![RenderInstance::new(Transform2D::IDENTITY, [0.0, 1.0, 0.0, 1.0]); 3];
        recorder.submit_frame(&instances, instances.len()).unwrap();
        recorder.submit_frame(&instances[..1], 1).unwrap();

        assert_eq!(recorder.frames(), 2);
        assert_eq!(recorder.last_count(), 1);
        assert_eq!(recorder.last_frame().len(), 1);
    }

    #[test]
    fn test_shared_sink_forwards() {
        let recorder = FrameRecorder::shared();
        let mut sink = Arc::clone(&recorder);
        sink.submit_frame(&[RenderInstance::default()], 1).unwrap();
        assert_eq!(recorder.lock().unwrap().frames(), 1);
    }

    #[test]
    fn test_poisoned_sink_reports_error() {
        let recorder = FrameRecorder::shared();
        let poisoner = Arc::clone(&recorder);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let mut sink = Arc::clone(&recorder);
        assert_eq!(sink.submit_frame(&[], 0), Err(SinkError::Poisoned));
    }
}
