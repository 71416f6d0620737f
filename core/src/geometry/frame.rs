//! Orthonormal Frames

use super::Vector3f;
use crate::pbrt::*;

/// An orthonormal basis `(s, t, n)` used to express directions in a local
/// shading space where `n` is the z-axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// First tangent.
    pub s: Vector3f,

    /// Second tangent.
    pub t: Vector3f,

    /// Normal (local z-axis).
    pub n: Vector3f,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            s: Vector3f::X,
            t: Vector3f::Y,
            n: Vector3f::Z,
        }
    }
}

impl Frame {
    /// Builds a frame around a unit normal.
    ///
    /// * `n` - The normal; must be normalized.
    pub fn new(n: Vector3f) -> Self {
        let (s, t) = n.coordinate_system();
        Self { s, t, n }
    }

    /// Converts a world-space direction into this frame.
    ///
    /// * `v` - The direction.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    /// Converts a direction in this frame to world space.
    ///
    /// * `v` - The local direction.
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }

    /// Cosine of the angle between a local direction and the normal.
    #[inline]
    pub fn cos_theta(v: &Vector3f) -> Float {
        v.z
    }

    /// Squared sine of the angle between a local direction and the normal.
    #[inline]
    pub fn sin_theta_2(v: &Vector3f) -> Float {
        max(0.0, 1.0 - v.z * v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    prop_unit_vector3!(unit_vector3);

    proptest! {
        #[test]
        fn local_world_round_trip(n in unit_vector3(), v in unit_vector3()) {
            let frame = Frame::new(n);
            let back = frame.to_world(&frame.to_local(&v));
            prop_assert!((back - v).length() < 1e-4);
            prop_assert!((frame.to_local(&n).z - 1.0).abs() < 1e-4);
        }
    }
}
