/// Model rotation state and matrices
use nalgebra::Rotation3;

use crate::math::{wrap_angle, Vec3};

/// Rotation state around three axes (in radians, each kept in `[0, TAU)`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: wrap_angle(x),
            y: wrap_angle(y),
            z: wrap_angle(z),
        }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians), wrapping each angle
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x = wrap_angle(self.x + dx);
        self.y = wrap_angle(self.y + dy);
        self.z = wrap_angle(self.z + dz);
    }

    /// Advance the vertical-axis angle, the only one animated per frame
    pub fn advance_yaw(&mut self, step: f32) {
        self.rotate(0.0, step, 0.0);
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for model rotations
pub struct Transform;

impl Transform {
    /// Create a rotation from a rotation state
    pub fn rotation(rotation: &RotationState) -> Rotation3<f32> {
        let rx = Rotation3::new(Vec3::new(wrap_angle(rotation.x), 0.0, 0.0));
        let ry = Rotation3::new(Vec3::new(0.0, wrap_angle(rotation.y), 0.0));
        let rz = Rotation3::new(Vec3::new(0.0, 0.0, wrap_angle(rotation.z)));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }
}
