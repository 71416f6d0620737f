//! 2-D Points

use crate::pbrt::*;
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::Index;

/// A pair of coordinates. Samplers hand these out as 2-D sample values and
/// the warps map them to and from positions in the unit square.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

/// 2-D point containing `Float` values.
pub type Point2f = Point2<Float>;

impl<T: Num> Point2<T> {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// The origin; also the sample returned by inactive lanes.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero())
    }

    /// Chebyshev distance to `other`; used to compare a warp and its inverse.
    ///
    /// * `other` - The other point.
    pub fn max_abs_diff(&self, other: &Self) -> T
    where
        T: num_traits::Float,
    {
        max((self.x - other.x).abs(), (self.y - other.y).abs())
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;

    /// Axis 0 is `x`, axis 1 is `y`.
    ///
    /// * `i` - Axis.
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Point2 has no axis {}", i),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Point2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn axes_and_origin() {
        let p = Point2f::new(0.25, 0.75);
        assert_eq!((p[0], p[1]), (0.25, 0.75));
        assert_eq!(Point2f::zero(), Point2f::new(0.0, 0.0));
        assert_eq!(format!("{}", p), "[0.25, 0.75]");
    }

    #[test]
    #[should_panic]
    fn third_axis_panics() {
        let _ = Point2f::zero()[2];
    }

    #[test]
    fn chebyshev_distance() {
        let a = Point2f::new(0.1, 0.9);
        let b = Point2f::new(0.4, 0.8);
        assert!((a.max_abs_diff(&b) - 0.3).abs() < 1e-6);
    }

    prop_point2!(unit_square, Float, 0.0f32..1.0f32, 0.0f32..1.0f32);

    proptest! {
        #[test]
        fn distance_is_symmetric_and_bounded(p1 in unit_square(), p2 in unit_square()) {
            let d = p1.max_abs_diff(&p2);
            prop_assert_eq!(d, p2.max_abs_diff(&p1));
            prop_assert!((0.0..=1.0).contains(&d));
            prop_assert_eq!(p1.max_abs_diff(&p1), 0.0);
        }
    }
}
