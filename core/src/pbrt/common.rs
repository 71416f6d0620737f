//! Common

use num_traits::Num;
use std::ops::{Add, Mul, Neg};

/// Use 32-bit precision for floating point numbers.
pub type Float = f32;

/// Default signed integer to 32-bit.
pub type Int = i32;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// PI (π)
pub const PI: Float = std::f32::consts::PI;

/// 1/PI (1/π)
pub const INV_PI: Float = 1.0 / PI;

/// PI/2 (π/2)
pub const PI_OVER_TWO: Float = PI * 0.5;

/// PI/4 (π/4)
pub const PI_OVER_FOUR: Float = PI * 0.25;

/// 2*PI (2π)
pub const TWO_PI: Float = PI * 2.0;

/// 1/2*PI (1/2π)
pub const INV_TWO_PI: Float = 1.0 / TWO_PI;

/// 4*PI (4π)
pub const FOUR_PI: Float = PI * 4.0;

/// 1/4*PI (1/4π)
pub const INV_FOUR_PI: Float = 1.0 / FOUR_PI;

/// Machine Epsilon
pub const MACHINE_EPSILON: Float = std::f32::EPSILON * 0.5;

/// 32-bit precision value for 1 - epsilon.
pub const FLOAT_ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1"); // 0.99999994

/// 64-bit precision value for 1 - epsilon.
pub const DOUBLE_ONE_MINUS_EPSILON: f64 = hexf64!("0x1.fffffffffffffp-1"); // 0.99999999999999989

/// Largest `Float` strictly below 1; sample values are clamped to it.
pub const ONE_MINUS_EPSILON: Float = FLOAT_ONE_MINUS_EPSILON;

/// Returns the absolute value of a number.
///
/// * `n` - The number.
#[inline(always)]
pub fn abs<T>(n: T) -> T
where
    T: Num + Neg<Output = T> + PartialOrd + Copy,
{
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Returns the minimum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn min<T>(a: T, b: T) -> T
where
    T: PartialOrd + Copy,
{
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the maximum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn max<T>(a: T, b: T) -> T
where
    T: PartialOrd + Copy,
{
    if a > b {
        a
    } else {
        b
    }
}

/// Clamps a value to the closed interval `[low, high]`.
///
/// * `x`    - The value.
/// * `low`  - Lower bound.
/// * `high` - Upper bound.
#[inline(always)]
pub fn clamp<T>(x: T, low: T, high: T) -> T
where
    T: PartialOrd + Copy,
{
    if x < low {
        low
    } else if x > high {
        high
    } else {
        x
    }
}

/// Linearly interpolate between two points for parameters in [0, 1] and
/// extrapolate for parameters outside that interval.
///
/// * `t` - Parameter.
/// * `p0` - Point at t=0.
/// * `p1` - Point at t=1.
#[inline(always)]
pub fn lerp<P>(t: Float, p0: P, p1: P) -> P
where
    Float: Mul<P, Output = P>,
    P: Add<P, Output = P>,
{
    (1.0 - t) * p0 + t * p1
}

/// Returns `v^2`.
#[inline(always)]
pub fn sqr<T: Mul<T, Output = T> + Copy>(v: T) -> T {
    v * v
}

/// Square root that clamps radicands made negative by roundoff to zero.
///
/// * `v` - The radicand.
#[inline(always)]
pub fn safe_sqrt(v: Float) -> Float {
    max(v, 0.0).sqrt()
}

/// Reciprocal square root of a radicand clamped to zero. Returns `∞` for a
/// zero radicand, never NaN.
///
/// * `v` - The radicand.
#[inline(always)]
pub fn safe_rsqrt(v: Float) -> Float {
    1.0 / safe_sqrt(v)
}

/// Arc-cosine with its argument clamped to [-1, 1].
///
/// * `v` - The cosine.
#[inline(always)]
pub fn safe_acos(v: Float) -> Float {
    clamp(v, -1.0, 1.0).acos()
}

/// Returns `v` unless it is NaN or infinite, in which case it returns 0.
///
/// * `v` - The value.
#[inline(always)]
pub fn sanitize(v: Float) -> Float {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Divides and maps a zero denominator to a zero result.
///
/// * `num` - Numerator.
/// * `den` - Denominator.
#[inline(always)]
pub fn safe_div(num: Float, den: Float) -> Float {
    if den == 0.0 {
        0.0
    } else {
        sanitize(num / den)
    }
}

/// Return the cosine of an angle.
///
/// * `theta` - The angle in radians.
#[inline(always)]
pub fn cos(theta: Float) -> Float {
    theta.cos()
}

/// Return the sine of an angle.
///
/// * `theta` - The angle in radians.
#[inline(always)]
pub fn sin(theta: Float) -> Float {
    theta.sin()
}

/// Returns the smallest power of two greater than or equal to `v` (1 for 0).
///
/// * `v` - The value.
#[inline(always)]
pub fn round_up_pow2(v: usize) -> usize {
    v.max(1).next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_functions_never_produce_nan() {
        assert_eq!(safe_sqrt(-1e-7), 0.0);
        assert_eq!(safe_rsqrt(-1.0), INFINITY);
        assert_eq!(safe_acos(1.0001), 0.0);
        assert_eq!(sanitize(Float::NAN), 0.0);
        assert_eq!(sanitize(INFINITY), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(1.0, 4.0), 0.25);
    }

    #[test]
    fn one_minus_epsilon_is_below_one() {
        assert!(ONE_MINUS_EPSILON < 1.0);
        assert_eq!(ONE_MINUS_EPSILON, 1.0 - Float::EPSILON * 0.5);
    }

    #[test]
    fn pow2_rounding() {
        assert_eq!(round_up_pow2(0), 1);
        assert_eq!(round_up_pow2(1), 1);
        assert_eq!(round_up_pow2(3), 4);
        assert_eq!(round_up_pow2(64), 64);
    }
}
