//! 3-D Vectors

use crate::pbrt::*;
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// A 3-D vector containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D vector containing `Float` values.
pub type Vector3f = Vector3<Float>;

/// 3-D vector containing `Int` values.
pub type Vector3i = Vector3<Int>;

/// Surface normals share the vector representation.
pub type Normal3f = Vector3f;

impl Vector3f {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Unit vector along x.
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0 };

    /// Unit vector along y.
    pub const Y: Self = Self { x: 0.0, y: 1.0, z: 0.0 };

    /// Unit vector along z.
    pub const Z: Self = Self { x: 0.0, y: 0.0, z: 1.0 };
}

impl<T: Num> Vector3<T> {
    /// Creates a new 3-D vector.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a new 3-D zero vector.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the square of the vector's length.
    pub fn length_squared(&self) -> T
    where
        T: Copy,
    {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the vector's length.
    pub fn length(&self) -> T
    where
        T: num_traits::Float,
    {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector.
    pub fn normalize(&self) -> Self
    where
        T: num_traits::Float,
    {
        *self / self.length()
    }

    /// Returns the dot product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn dot(&self, other: &Self) -> T
    where
        T: Copy,
    {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the absolute value of the dot product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn abs_dot(&self, other: &Self) -> T
    where
        T: Neg<Output = T> + PartialOrd + Copy,
    {
        abs(self.dot(other))
    }

    /// Returns the cross product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn cross(&self, other: &Self) -> Self
    where
        T: Copy,
    {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Returns the largest coordinate value.
    pub fn max_component(&self) -> T
    where
        T: PartialOrd + Copy,
    {
        max(self.x, max(self.y, self.z))
    }
}

impl Vector3f {
    /// Reflects `self` about the unit vector `n`: returns `2 (self·n) n - self`.
    /// Both `self` and the result point away from the reflection point.
    ///
    /// * `n` - The unit axis of reflection.
    pub fn reflect(&self, n: &Self) -> Self {
        2.0 * self.dot(n) * *n - *self
    }

    /// Returns a coordinate system (`v2`, `v3`) completing `self`, which must
    /// be normalized.
    pub fn coordinate_system(&self) -> (Self, Self) {
        // Duff et al. branchless basis.
        let sign = 1.0_f32.copysign(self.z);
        let a = -1.0 / (sign + self.z);
        let b = self.x * self.y * a;
        (
            Self::new(1.0 + sign * self.x * self.x * a, sign * b, -sign * self.x),
            Self::new(b, sign + self.y * self.y * a, -self.y),
        )
    }
}

impl<T: Num> Add for Vector3<T> {
    type Output = Self;

    /// Adds the given vector and returns the result.
    ///
    /// * `other` - The vector to add.
    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> AddAssign for Vector3<T> {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The vector to add.
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<T: Num> Sub for Vector3<T> {
    type Output = Self;

    /// Subtracts the given vector and returns the result.
    ///
    /// * `other` - The vector to subtract.
    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> SubAssign for Vector3<T> {
    /// Performs the `-=` operation.
    ///
    /// * `other` - The vector to subtract.
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl<T: Num + Copy> Mul<T> for Vector3<T> {
    type Output = Self;

    /// Scale the vector.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: T) -> Self::Output {
        Self::new(self.x * f, self.y * f, self.z * f)
    }
}

macro_rules! premul {
    ($t: ty) => {
        impl Mul<Vector3<$t>> for $t {
            type Output = Vector3<$t>;

            /// Scale the vector.
            ///
            /// * `v` - The vector.
            fn mul(self, v: Vector3<$t>) -> Vector3<$t> {
                Vector3::new(self * v.x, self * v.y, self * v.z)
            }
        }
    };
}

premul!(f32);
premul!(f64);
premul!(i32);

impl<T: Num + Copy> MulAssign<T> for Vector3<T> {
    /// Scale the vector by `f` in place.
    ///
    /// * `f` - The scaling factor.
    fn mul_assign(&mut self, f: T) {
        *self = *self * f;
    }
}

impl<T: Num + Copy> Div<T> for Vector3<T> {
    type Output = Self;

    /// Scale the vector by 1/f.
    ///
    /// * `f` - The scaling factor.
    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());
        Self::new(self.x / f, self.y / f, self.z / f)
    }
}

impl<T: Num + Neg<Output = T>> Neg for Vector3<T> {
    type Output = Self;

    /// Flip the vector's direction (scale by -1).
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;

    /// Index the vector by an axis to get the immutable coordinate axis value.
    ///
    /// * `i` - A 3-D coordinate axis.
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid axis for std::Index on Vector3<T>"),
        }
    }
}

impl<T> IndexMut<usize> for Vector3<T> {
    /// Index the vector by an axis to get a mutable coordinate axis value.
    ///
    /// * `i` - A 3-D coordinate axis.
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Invalid axis for std::IndexMut on Vector3<T>"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Vector3<T> {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
