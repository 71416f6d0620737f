//! Interactions

use crate::geometry::*;
use crate::pbrt::*;

mod medium_interaction;
mod surface_interaction;

pub use medium_interaction::*;
pub use surface_interaction::*;

/// Spawns a ray leaving an interaction point.
///
/// * `p`     - Point of interaction.
/// * `d`     - The new direction.
/// * `t_max` - Extent of the new ray.
/// * `time`  - Time when interaction occurred.
#[inline]
pub(crate) fn spawn_ray(p: &Point3f, d: &Vector3f, t_max: Float, time: Float) -> Ray {
    Ray::new(*p, *d, t_max, time)
}
