//! Surface Interactions

use crate::geometry::*;
use crate::pbrt::*;

/// SurfaceInteraction carries the part of a surface hit that the medium
/// transmittance model needs: where the ray segment ends.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceInteraction {
    /// Point of interaction.
    pub p: Point3f,

    /// Distance along the ray. `INFINITY` when nothing was hit.
    pub t: Float,

    /// Surface normal at the point `p`.
    pub n: Normal3f,

    /// Time when interaction occurred.
    pub time: Float,
}

impl Default for SurfaceInteraction {
    fn default() -> Self {
        Self {
            p: Point3f::ZERO,
            t: INFINITY,
            n: Normal3f::ZERO,
            time: 0.0,
        }
    }
}

impl SurfaceInteraction {
    /// Create a new surface interaction.
    ///
    /// * `p`    - Point of interaction.
    /// * `t`    - Distance along the ray.
    /// * `n`    - Surface normal at the point `p`.
    /// * `time` - Time when interaction occurred.
    pub fn new(p: Point3f, t: Float, n: Normal3f, time: Float) -> Self {
        Self { p, t, n, time }
    }

    /// Create the interaction at distance `t` along a ray.
    ///
    /// * `ray` - The ray.
    /// * `t`   - Distance along the ray.
    /// * `n`   - Surface normal at the hit point.
    pub fn from_ray(ray: &Ray, t: Float, n: Normal3f) -> Self {
        Self::new(ray.at(t), t, n, ray.time)
    }

    /// Returns `true` if a surface was hit.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }

    /// Spawns a ray leaving the surface.
    ///
    /// * `d` - The new direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        super::spawn_ray(&self.p, d, INFINITY, self.time)
    }
}
