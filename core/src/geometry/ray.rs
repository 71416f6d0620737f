//! Rays

use super::{Point3f, Vector3f};
use crate::pbrt::*;
use std::fmt;

/// A semi-infinite line specified by its origin and direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Restricts the ray to segment [0, t_max].
    pub t_max: Float,

    /// Time value.
    pub time: Float,
}

impl Ray {
    /// Returns a new ray.
    ///
    /// * `o`     - Origin.
    /// * `d`     - Direction.
    /// * `t_max` - Restricts the ray to segment [0, t_max].
    /// * `time`  - Time value.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, time: Float) -> Self {
        Self { o, d, t_max, time }
    }

    /// Returns a ray of unbounded extent.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn unbounded(o: Point3f, d: Vector3f) -> Self {
        Self::new(o, d, INFINITY, 0.0)
    }

    /// Returns the position along the ray at given parameter `t`.
    ///
    /// * `t` - The parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl fmt::Display for Ray {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[o={}, d={}, t_max={}, time={}]", self.o, self.d, self.t_max, self.time)
    }
}
