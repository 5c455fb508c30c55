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
//! Particle attributes
//!
//! Plain `Copy` value types for the four per-entity attributes. All use
//! single-precision floats, matching the precision of the instance buffer
//! handed to the render sink.

use crate::ecs::component::{Attribute, AttributeKind};
use crate::ecs::store::{ColumnSlots, Columns};

/// 2D position component
///
/// # Examples
///
/// ```
/// use particle_engine::ecs::components::Position;
///
/// let pos = Position::new(1.0, 2.0);
/// assert_eq!(pos.x(), 1.0);
/// assert!(pos.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Create a new position with the given coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    /// Create a position at the origin (0, 0)
    pub fn zero() -> Self {
        Position::new(0.0, 0.0)
    }

    /// Get the x coordinate
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Get the y coordinate
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Set the x coordinate
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    /// Set the y coordinate
    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    /// Advance the position by `velocity * dt`
    pub fn integrate(&mut self, velocity: &Velocity, dt: f32) {
        self.x += velocity.dx() * dt;
        self.y += velocity.dy() * dt;
    }

    /// Check if both coordinates are finite
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Get the position as an array
    pub fn as_array(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}

/// 2D velocity component in viewport units per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    dx: f32,
    dy: f32,
}

impl Velocity {
    /// Create a new velocity with the given components
    pub fn new(dx: f32, dy: f32) -> Self {
        Velocity { dx, dy }
    }

    /// Create a velocity pointing along `angle` (radians) with the given speed
    pub fn from_angle(angle: f32, magnitude: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Velocity::new(cos * magnitude, sin * magnitude)
    }

    /// Create a zero velocity (at rest)
    pub fn zero() -> Self {
        Velocity::new(0.0, 0.0)
    }

    /// Get the x component
    pub fn dx(&self) -> f32 {
        self.dx
    }

    /// Get the y component
    pub fn dy(&self) -> f32 {
        self.dy
    }

    /// Set the x component
    pub fn set_dx(&mut self, dx: f32) {
        self.dx = dx;
    }

    /// Set the y component
    pub fn set_dy(&mut self, dy: f32) {
        self.dy = dy;
    }

    /// Calculate the magnitude (speed) of the velocity vector
    pub fn magnitude(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Check if both components are finite
    pub fn is_valid(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

/// 2D scale component
///
/// Particles are seeded with a uniform scale, but both axes are stored so
/// the render transform can be built without special cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    x: f32,
    y: f32,
}

impl Scale {
    /// Create a scale with independent axes
    pub fn new(x: f32, y: f32) -> Self {
        Scale { x, y }
    }

    /// Create a scale with the same factor on both axes
    pub fn uniform(factor: f32) -> Self {
        Scale::new(factor, factor)
    }

    /// Get the x factor
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Get the y factor
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Whether both axes carry the same factor
    pub fn is_uniform(&self) -> bool {
        self.x == self.y
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::uniform(1.0)
    }
}

/// Color stored as hue, saturation, value and alpha, each in [0, 1]
///
/// Kept in HSV so the color cycle can advance the hue directly. Conversion
/// to RGBA happens once per frame when the render batch is built.
///
/// # Examples
///
/// ```
/// use particle_engine::ecs::components::Color;
///
/// let mut color = Color::hsva(0.9, 1.0, 1.0, 1.0);
/// color.shift_hue(0.3);
/// assert!((color.hue() - 0.2).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    hue: f32,
    saturation: f32,
    value: f32,
    alpha: f32,
}

impl Color {
    /// Create a color from HSVA channels; the hue is wrapped into [0, 1)
    pub fn hsva(hue: f32, saturation: f32, value: f32, alpha: f32) -> Self {
        Color {
            hue: wrap_unit(hue),
            saturation,
            value,
            alpha,
        }
    }

    /// Opaque white
    pub fn white() -> Self {
        Color::hsva(0.0, 0.0, 1.0, 1.0)
    }

    /// Get the hue in [0, 1)
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Get the saturation
    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Get the value (brightness)
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Get the alpha
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Set the hue, wrapping into [0, 1)
    pub fn set_hue(&mut self, hue: f32) {
        self.hue = wrap_unit(hue);
    }

    /// Advance the hue by `delta`, wrapping into [0, 1)
    pub fn shift_hue(&mut self, delta: f32) {
        self.set_hue(self.hue + delta);
    }

    /// Convert to straight (non-premultiplied) RGBA
    pub fn to_rgba(&self) -> [f32; 4] {
        let s = self.saturation.clamp(0.0, 1.0);
        let v = self.value.clamp(0.0, 1.0);
        if s == 0.0 {
            return [v, v, v, self.alpha];
        }

        let h = self.hue * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as u32 % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        [r, g, b, self.alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::white()
    }
}

/// Wrap into [0, 1); `rem_euclid` can round up to exactly 1.0 for tiny
/// negative inputs, which is folded back to 0.0.
fn wrap_unit(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

macro_rules! impl_attribute {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl Attribute for $ty {
            const KIND: AttributeKind = AttributeKind::$kind;

            fn column(columns: &Columns) -> &[Self] {
                &columns.$field
            }

            fn take_slot<'a>(slots: &mut ColumnSlots<'a>) -> Option<&'a mut [Self]> {
                slots.$field.take()
            }
        }
    };
}

impl_attribute!(Position, Position, positions);
impl_attribute!(Velocity, Velocity, velocities);
impl_attribute!(Scale, Scale, scales);
impl_attribute!(Color, Color, colors);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_position_integrate() {
        let mut pos = Position::new(1.0, 2.0);
        pos.integrate(&Velocity::new(10.0, -4.0), 0.5);
        assert_eq!(pos.as_array(), [6.0, 0.0]);
    }

    #[test]
    fn test_position_validation() {
        assert!(Position::new(1.0, 2.0).is_valid());
        assert!(!Position::new(f32::NAN, 0.0).is_valid());
        assert!(!Position::new(0.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_velocity_from_angle() {
        let vel = Velocity::from_angle(std::f32::consts::FRAC_PI_2, 5.0);
        assert_abs_diff_eq!(vel.dx(), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(vel.dy(), 5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(vel.magnitude(), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_velocity_magnitude() {
        assert_eq!(Velocity::new(3.0, 4.0).magnitude(), 5.0);
    }

    #[test]
    fn test_scale_uniform() {
        let scale = Scale::uniform(7.5);
        assert!(scale.is_uniform());
        assert_eq!(scale.x(), 7.5);
        assert!(!Scale::new(1.0, 2.0).is_uniform());
    }

    #[test]
    fn test_hue_wraps_into_unit_interval() {
        let mut color = Color::hsva(0.9, 1.0, 1.0, 1.0);
        color.shift_hue(0.3);
        assert_abs_diff_eq!(color.hue(), 0.2, epsilon = 1e-5);

        color.set_hue(-0.25);
        assert_abs_diff_eq!(color.hue(), 0.75, epsilon = 1e-6);

        color.set_hue(3.0);
        assert_eq!(color.hue(), 0.0);

        color.set_hue(-f32::EPSILON * 0.25);
        assert!(color.hue() >= 0.0 && color.hue() < 1.0);
    }

    #[test]
    fn test_non_finite_hue_resets() {
        let color = Color::hsva(f32::NAN, 1.0, 1.0, 1.0);
        assert_eq!(color.hue(), 0.0);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Color::hsva(0.0, 1.0, 1.0, 1.0).to_rgba(), [1.0, 0.0, 0.0, 1.0]);

        let green = Color::hsva(1.0 / 3.0, 1.0, 1.0, 0.5).to_rgba();
        assert_abs_diff_eq!(green[0], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(green[1], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(green[2], 0.0, epsilon = 1e-5);
        assert_eq!(green[3], 0.5);

        let blue = Color::hsva(2.0 / 3.0, 1.0, 1.0, 1.0).to_rgba();
        assert_abs_diff_eq!(blue[2], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(blue[0], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_hsv_grey_when_unsaturated() {
        assert_eq!(Color::hsva(0.4, 0.0, 0.25, 1.0).to_rgba(), [0.25, 0.25, 0.25, 1.0]);
    }
}
