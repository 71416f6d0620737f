//! 3-D Axis Aligned Bounding Boxes.

use super::{Point3f, Ray, Vector3f};
use crate::pbrt::*;
use std::fmt;

/// 3-D axis aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Point3f,

    /// Maximum bounds.
    pub p_max: Point3f,
}

impl Bounds3f {
    /// Creates a new bounding box enclosing two corner points.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// The unit cube [0, 1]^3.
    pub fn unit() -> Self {
        Self::new(Point3f::ZERO, Point3f::new(1.0, 1.0, 1.0))
    }

    /// Returns the vector from the minimum to the maximum corner.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the union with another bounding box.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Returns true if `p` lies inside the box (boundary included).
    ///
    /// * `p` - The point.
    pub fn contains(&self, p: &Point3f) -> bool {
        (0..3).all(|i| p[i] >= self.p_min[i] && p[i] <= self.p_max[i])
    }

    /// Returns the position of a point relative to the box corners; the
    /// minimum corner maps to 0 and the maximum to 1 in every axis.
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let d = self.diagonal();
        let mut o = *p - self.p_min;
        for i in 0..3 {
            if d[i] > 0.0 {
                o[i] /= d[i];
            }
        }
        o
    }

    /// Returns the parametric interval `(t0, t1)` of the ray that lies inside
    /// the box, or `None` when the ray misses it. The interval is not clipped
    /// against `[0, ray.t_max]`; `t0` may be negative when the origin is
    /// inside.
    ///
    /// * `ray` - The ray.
    pub fn intersect_p(&self, ray: &Ray) -> Option<(Float, Float)> {
        let mut t0 = -INFINITY;
        let mut t1 = INFINITY;
        for i in 0..3 {
            let d = ray.d[i];
            let o = ray.o[i];
            if d == 0.0 {
                // Parallel slab: inside or miss.
                if o < self.p_min[i] || o > self.p_max[i] {
                    return None;
                }
                continue;
            }

            let inv_d = 1.0 / d;
            let mut t_near = (self.p_min[i] - o) * inv_d;
            let mut t_far = (self.p_max[i] - o) * inv_d;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }

            t0 = max(t0, t_near);
            t1 = min(t1, t_far);
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

impl fmt::Display for Bounds3f {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} - {} ]", self.p_min, self.p_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_unit_cube() {
        let b = Bounds3f::unit();
        let r = Ray::unbounded(Point3f::new(-1.0, 0.5, 0.5), Vector3f::X);
        assert_eq!(b.intersect_p(&r), Some((1.0, 2.0)));
    }

    #[test]
    fn ray_starting_inside_has_negative_entry() {
        let b = Bounds3f::unit();
        let r = Ray::unbounded(Point3f::new(0.5, 0.5, 0.5), Vector3f::Z);
        assert_eq!(b.intersect_p(&r), Some((-0.5, 0.5)));
    }

    #[test]
    fn parallel_ray_misses() {
        let b = Bounds3f::unit();
        let r = Ray::unbounded(Point3f::new(2.0, 0.5, 0.5), Vector3f::Z);
        assert_eq!(b.intersect_p(&r), None);
    }

    #[test]
    fn offset_maps_corners() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 3.0, 1.0));
        assert_eq!(b.offset(&b.p_min), Vector3f::ZERO);
        assert_eq!(b.offset(&b.p_max), Vector3f::new(1.0, 1.0, 1.0));
    }
}
