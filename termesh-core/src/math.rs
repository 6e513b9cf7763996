/// Vector helpers on top of nalgebra
use nalgebra::{Point3, Vector3};

/// Direction vector (normals, light direction).
pub type Vec3 = Vector3<f32>;

/// Position in model or view space.
pub type Pos3 = Point3<f32>;

/// Lengths at or below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f32 = 1e-12;

pub trait Vec3Ext {
    /// Unit-length copy, or the zero vector when the input has no length.
    fn normalize_or_zero(&self) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn normalize_or_zero(&self) -> Vec3 {
        self.try_normalize(NORMALIZE_EPSILON)
            .unwrap_or_else(Vec3::zeros)
    }
}

/// Decimal digits kept when deciding whether two vertices coincide.
pub const VERTEX_KEY_DIGITS: i32 = 5;

/// Fixed-point key identifying a vertex position for normal smoothing.
///
/// Each coordinate is rounded to `VERTEX_KEY_DIGITS` decimal places, so
/// positions closer than that resolution share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey([i64; 3]);

impl VertexKey {
    pub fn new(position: &Pos3) -> Self {
        let scale = 10f64.powi(VERTEX_KEY_DIGITS);
        let q = |c: f32| (c as f64 * scale).round() as i64;
        Self([q(position.x), q(position.y), q(position.z)])
    }
}

/// Reduce an angle into `[0, TAU)`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec3::zeros().normalize_or_zero(), Vec3::zeros());
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = Vec3::new(3.0, 4.0, 12.0).normalize_or_zero();
        assert!((n.norm() - 1.0).abs() < 1e-6);
        assert!((n.x - 3.0 / 13.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_key_tolerance() {
        let a = VertexKey::new(&Pos3::new(1.0, 2.0, 3.0));
        let b = VertexKey::new(&Pos3::new(1.000_001, 2.0, 3.0));
        let c = VertexKey::new(&Pos3::new(1.001, 2.0, 3.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-5);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(-1e-9) < TAU);
    }
}
