//! Medium Interactions

use crate::geometry::*;
use crate::medium::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::fmt;

/// MediumInteraction represents an interaction point in a scattering medium.
/// A fresh one is produced by every free-flight sample and consumed right
/// after by the phase function.
#[derive(Clone)]
pub struct MediumInteraction {
    /// Point of interaction.
    pub p: Point3f,

    /// Incident direction, pointing away from the interaction (`-ray.d`).
    pub wi: Vector3f,

    /// Local shading frame with `wi` as its normal.
    pub sh_frame: Frame,

    /// Scattering coefficient at `p`.
    pub sigma_s: Spectrum,

    /// Null-collision coefficient at `p`.
    pub sigma_n: Spectrum,

    /// Extinction coefficient at `p`.
    pub sigma_t: Spectrum,

    /// The majorant used to sample the free-flight distance.
    pub combined_extinction: Spectrum,

    /// Start of the ray segment inside the medium.
    pub mint: Float,

    /// Sampled distance. `INFINITY` when no interaction was found in the
    /// segment.
    pub t: Float,

    /// Time when interaction occurred.
    pub time: Float,

    /// The medium that produced this interaction.
    ///
    /// NOTE: Calling code will need to assign this medium.
    pub medium: Option<ArcMedium>,
}

impl Default for MediumInteraction {
    fn default() -> Self {
        Self {
            p: Point3f::ZERO,
            wi: Vector3f::ZERO,
            sh_frame: Frame::default(),
            sigma_s: Spectrum::ZERO,
            sigma_n: Spectrum::ZERO,
            sigma_t: Spectrum::ZERO,
            combined_extinction: Spectrum::ZERO,
            mint: 0.0,
            t: INFINITY,
            time: 0.0,
            medium: None,
        }
    }
}

impl MediumInteraction {
    /// Create a new medium interaction with zero coefficients.
    ///
    /// * `p`    - Point of interaction.
    /// * `wi`   - Incident direction, pointing away from `p`.
    /// * `t`    - Distance along the ray.
    /// * `time` - Time when interaction occurred.
    pub fn new(p: Point3f, wi: Vector3f, t: Float, time: Float) -> Self {
        Self {
            p,
            wi,
            sh_frame: Frame::new(wi),
            t,
            time,
            ..Default::default()
        }
    }

    /// Returns `true` if a real interaction was found.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }

    /// Converts a direction in the shading frame to world space.
    ///
    /// * `v` - The local direction.
    #[inline]
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    /// Converts a world-space direction to the shading frame.
    ///
    /// * `v` - The direction.
    #[inline]
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    /// Spawns a ray leaving the interaction point.
    ///
    /// * `d` - The new direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        super::spawn_ray(&self.p, d, INFINITY, self.time)
    }
}

impl fmt::Display for MediumInteraction {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MediumInteraction[p={}, wi={}, t={}, mint={}, sigma_s={}, sigma_n={}, sigma_t={}, majorant={}]",
            self.p, self.wi, self.t, self.mint, self.sigma_s, self.sigma_n, self.sigma_t, self.combined_extinction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_invalid() {
        let mi = MediumInteraction::default();
        assert!(!mi.is_valid());
        assert!(mi.medium.is_none());
    }

    #[test]
    fn frame_follows_wi() {
        let wi = Vector3f::new(0.0, 1.0, 0.0);
        let mi = MediumInteraction::new(Point3f::ZERO, wi, 1.0, 0.0);
        assert!(mi.is_valid());
        assert!((mi.to_local(&wi).z - 1.0).abs() < 1e-6);
        let ray = mi.spawn_ray(&Vector3f::X);
        assert_eq!(ray.o, Point3f::ZERO);
        assert_eq!(ray.t_max, INFINITY);
    }
}
