//! Warps from the unit square to common sampling domains.

use crate::geometry::*;
use crate::pbrt::*;

/// Uniformly sample a direction from a sphere.
///
/// * `u` - The random sample point.
pub fn square_to_uniform_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[1];
    let r = safe_sqrt(1.0 - z * z);
    let phi = TWO_PI * u[0];
    Vector3f::new(r * cos(phi), r * sin(phi), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline]
pub fn square_to_uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Uniformly sample a direction on the upper (+z) hemisphere.
///
/// * `u` - The random sample point.
pub fn square_to_uniform_hemisphere(u: &Point2f) -> Vector3f {
    let z = u[1];
    let r = safe_sqrt(1.0 - z * z);
    let phi = TWO_PI * u[0];
    Vector3f::new(r * cos(phi), r * sin(phi), z)
}

/// Returns the PDF for uniformly sampling a direction from a hemisphere.
#[inline]
pub fn square_to_uniform_hemisphere_pdf() -> Float {
    INV_TWO_PI
}

/// Sample a point on a unit disk by mapping from a unit square to the unit
/// circle. The concentric mapping takes points in [-1, 1]^2 to unit disk by
/// uniformly mapping concentric squares to concentric circles.
///
/// * `u` - The random sample point.
pub fn square_to_uniform_disk_concentric(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let ox = 2.0 * u[0] - 1.0;
    let oy = 2.0 * u[1] - 1.0;

    // Handle degeneracy at the origin.
    if ox == 0.0 && oy == 0.0 {
        return Point2f::zero();
    }

    // Apply concentric mapping to point
    let (r, theta) = if abs(ox) > abs(oy) {
        (ox, PI_OVER_FOUR * (oy / ox))
    } else {
        (oy, PI_OVER_TWO - PI_OVER_FOUR * (ox / oy))
    };

    Point2f::new(r * cos(theta), r * sin(theta))
}

/// Cosine-weighted sample on the upper hemisphere (Malley's method).
///
/// * `u` - The random sample point.
pub fn square_to_cosine_hemisphere(u: &Point2f) -> Vector3f {
    let d = square_to_uniform_disk_concentric(u);
    let z = safe_sqrt(1.0 - d.x * d.x - d.y * d.y);
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted hemisphere sampling.
///
/// * `v` - Sampled direction in the local frame.
#[inline]
pub fn square_to_cosine_hemisphere_pdf(v: &Vector3f) -> Float {
    if v.z > 0.0 {
        v.z * INV_PI
    } else {
        0.0
    }
}

/// Samples `x ∈ [0, 1]` proportional to the linear function that is `v0` at
/// 0 and `v1` at 1.
///
/// * `v0` - Value at 0.
/// * `v1` - Value at 1.
/// * `u`  - Uniform sample.
#[inline]
pub fn interval_to_linear(v0: Float, v1: Float, u: Float) -> Float {
    if abs(v0 - v1) > 1e-4 * (v0 + v1) {
        (v0 - safe_sqrt(lerp(u, v0 * v0, v1 * v1))) / (v0 - v1)
    } else {
        u
    }
}

/// Inverse of `interval_to_linear()`: the linear CDF evaluated at `x`.
///
/// * `v0` - Value at 0.
/// * `v1` - Value at 1.
/// * `x`  - Position in [0, 1].
#[inline]
pub fn linear_to_interval(v0: Float, v1: Float, x: Float) -> Float {
    let sum = v0 + v1;
    if sum > 0.0 && abs(v0 - v1) > 1e-4 * sum {
        x * ((2.0 - x) * v0 + x * v1) / sum
    } else {
        x
    }
}

/// Warps a uniform sample to the bilinear density on [0, 1]^2 given by the
/// corner values `v00` (at (0,0)), `v10` (at (1,0)), `v01` and `v11`.
/// Returns the position and its density, which is normalized so that it
/// integrates to 1 over the square.
///
/// * `v00` - Value at (0, 0).
/// * `v10` - Value at (1, 0).
/// * `v01` - Value at (0, 1).
/// * `v11` - Value at (1, 1).
/// * `u`   - Uniform sample.
pub fn square_to_bilinear(v00: Float, v10: Float, v01: Float, v11: Float, u: &Point2f) -> (Point2f, Float) {
    // Invert marginal CDF in y.
    let r0 = v00 + v10;
    let r1 = v01 + v11;
    let y = interval_to_linear(r0, r1, u.y);

    // Invert conditional CDF in x.
    let c0 = lerp(y, v00, v01);
    let c1 = lerp(y, v10, v11);
    let x = interval_to_linear(c0, c1, u.x);

    let p = Point2f::new(x, y);
    (p, bilinear_density(v00, v10, v01, v11, lerp(x, c0, c1)))
}

/// Inverse of `square_to_bilinear()`. Returns the uniform sample that maps
/// to `p` and the density at `p`.
///
/// * `v00` - Value at (0, 0).
/// * `v10` - Value at (1, 0).
/// * `v01` - Value at (0, 1).
/// * `v11` - Value at (1, 1).
/// * `p`   - Position in [0, 1]^2.
pub fn square_to_bilinear_inverse(v00: Float, v10: Float, v01: Float, v11: Float, p: &Point2f) -> (Point2f, Float) {
    let r0 = v00 + v10;
    let r1 = v01 + v11;
    let c0 = lerp(p.y, v00, v01);
    let c1 = lerp(p.y, v10, v11);

    let u = Point2f::new(linear_to_interval(c0, c1, p.x), linear_to_interval(r0, r1, p.y));
    (u, bilinear_density(v00, v10, v01, v11, lerp(p.x, c0, c1)))
}

/// Density of `square_to_bilinear()` at `p`.
///
/// * `v00` - Value at (0, 0).
/// * `v10` - Value at (1, 0).
/// * `v01` - Value at (0, 1).
/// * `v11` - Value at (1, 1).
/// * `p`   - Position in [0, 1]^2.
pub fn square_to_bilinear_pdf(v00: Float, v10: Float, v01: Float, v11: Float, p: &Point2f) -> Float {
    let c0 = lerp(p.y, v00, v01);
    let c1 = lerp(p.y, v10, v11);
    bilinear_density(v00, v10, v01, v11, lerp(p.x, c0, c1))
}

#[inline]
fn bilinear_density(v00: Float, v10: Float, v01: Float, v11: Float, value: Float) -> Float {
    // All-zero patches degrade to the uniform warp.
    let mean = 0.25 * (v00 + v10 + v01 + v11);
    if mean > 0.0 {
        value / mean
    } else {
        1.0
    }
}

/// Samples the 1D tent function on [-1, 1].
///
/// * `u` - Uniform sample.
#[inline]
pub fn interval_to_tent(u: Float) -> Float {
    if u < 0.5 {
        (2.0 * u).sqrt() - 1.0
    } else {
        1.0 - (2.0 - 2.0 * u).sqrt()
    }
}

/// Samples the separable tent function on [-1, 1]^2.
///
/// * `u` - The random sample point.
pub fn square_to_tent(u: &Point2f) -> Point2f {
    Point2f::new(interval_to_tent(u.x), interval_to_tent(u.y))
}

/// Returns the PDF of `square_to_tent()`.
///
/// * `p` - Position in [-1, 1]^2.
pub fn square_to_tent_pdf(p: &Point2f) -> Float {
    if abs(p.x) > 1.0 || abs(p.y) > 1.0 {
        0.0
    } else {
        (1.0 - abs(p.x)) * (1.0 - abs(p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    prop_point2!(unit_square, Float, 0.0f32..1.0f32, 0.0f32..1.0f32);
    prop_range!(corner_value, Float, 0.0f32..4.0f32);

    #[test]
    fn linear_interval_degenerates_to_identity() {
        assert_eq!(interval_to_linear(1.0, 1.0, 0.3), 0.3);
        assert_eq!(linear_to_interval(0.0, 0.0, 0.3), 0.3);
    }

    #[test]
    fn constant_bilinear_is_identity() {
        let u = Point2f::new(0.25, 0.75);
        let (p, pdf) = square_to_bilinear(2.0, 2.0, 2.0, 2.0, &u);
        assert_eq!(p, u);
        assert_eq!(pdf, 1.0);
    }

    #[test]
    fn tent_is_symmetric() {
        assert_eq!(interval_to_tent(0.5), 0.0);
        assert!(approx_eq!(f32, interval_to_tent(0.0), -1.0));
        assert!(approx_eq!(f32, interval_to_tent(0.25), -interval_to_tent(0.75), epsilon = 1e-6));
    }

    #[test]
    fn cosine_hemisphere_pdf_integrates_to_one() {
        // Midpoint quadrature over (θ, φ).
        let n = 128;
        let mut sum = 0.0;
        for i in 0..n {
            let theta = (i as Float + 0.5) / n as Float * PI_OVER_TWO;
            let v = Vector3f::new(theta.sin(), 0.0, theta.cos());
            sum += square_to_cosine_hemisphere_pdf(&v) * theta.sin();
        }
        let integral = sum * PI_OVER_TWO / n as Float * TWO_PI;
        assert!(approx_eq!(f32, integral, 1.0, epsilon = 1e-3));
    }

    proptest! {
        #[test]
        fn sphere_samples_are_unit(u in unit_square()) {
            prop_assert!((square_to_uniform_sphere(&u).length() - 1.0).abs() < 1e-5);
            let h = square_to_uniform_hemisphere(&u);
            prop_assert!(h.z >= 0.0);
            let c = square_to_cosine_hemisphere(&u);
            prop_assert!(c.z >= 0.0 && (c.length() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn bilinear_round_trip(
            u in unit_square(),
            v00 in corner_value(),
            v10 in corner_value(),
            v01 in corner_value(),
            v11 in corner_value(),
        ) {
            prop_assume!(v00 + v10 + v01 + v11 > 1e-2);
            let (p, pdf) = square_to_bilinear(v00, v10, v01, v11, &u);
            let (back, pdf_inv) = square_to_bilinear_inverse(v00, v10, v01, v11, &p);
            prop_assert!(back.max_abs_diff(&u) < 1e-3, "{} -> {} -> {}", u, p, back);
            prop_assert!((pdf - pdf_inv).abs() <= 1e-3 * pdf.max(1.0));
            prop_assert!((pdf - square_to_bilinear_pdf(v00, v10, v01, v11, &p)).abs() <= 1e-3 * pdf.max(1.0));
        }
    }
}
