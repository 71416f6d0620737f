//! SGGX Microflake Distribution
//!
//! The SGGX matrix `S` is symmetric positive semi-definite and packed as
//! `(xx, yy, zz, xy, xz, yz)`. It is not validated; degenerate matrices
//! produce zero densities instead of NaN.

use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::paramset::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::volume::*;
use super::{no_volume_loader, VolumeLoader};

/// Returns `aᵀ S b`.
#[inline]
fn quadratic_form(a: &Vector3f, s: &[Float; 6], b: &Vector3f) -> Float {
    a.x * (s[0] * b.x + s[3] * b.y + s[4] * b.z)
        + a.y * (s[3] * b.x + s[1] * b.y + s[5] * b.z)
        + a.z * (s[4] * b.x + s[5] * b.y + s[2] * b.z)
}

/// Returns `det(S)`.
#[inline]
fn determinant(s: &[Float; 6]) -> Float {
    let [xx, yy, zz, xy, xz, yz] = *s;
    xx * yy * zz - xx * yz * yz - yy * xz * xz - zz * xy * xy + 2.0 * xy * xz * yz
}

/// Largest absolute row sum of `S`, an upper bound of its largest
/// eigenvalue.
#[inline]
fn max_row_sum(s: &[Float; 6]) -> Float {
    let [xx, yy, zz, xy, xz, yz] = s.map(Float::abs);
    max(xx + xy + xz, max(xy + yy + yz, xz + yz + zz))
}

/// Projected area of the microflakes seen from `wi`, `sqrt(wiᵀ S wi)`.
///
/// * `wi` - Unit direction.
/// * `s`  - Packed SGGX matrix.
#[inline]
pub fn sggx_projected_area(wi: &Vector3f, s: &[Float; 6]) -> Float {
    safe_sqrt(quadratic_form(wi, s, wi))
}

/// Microflake normal distribution `D(wm) = 1 / (π sqrt(det S) (wmᵀ S⁻¹ wm)²)`,
/// evaluated through the adjugate so that no inverse is formed. Returns 0
/// when the denominator underflows. Normalized so that
/// `∫ max(0, wi·wm) D(wm) dwm` equals `sggx_projected_area(wi)`; for `S = I`, `D = 1 / π`.
///
/// * `wm` - Unit microflake normal.
/// * `s`  - Packed SGGX matrix.
pub fn sggx_pdf(wm: &Vector3f, s: &[Float; 6]) -> Float {
    let [xx, yy, zz, xy, xz, yz] = *s;
    let det = determinant(s);
    let den = wm.x * wm.x * (yy * zz - yz * yz)
        + wm.y * wm.y * (xx * zz - xz * xz)
        + wm.z * wm.z * (xx * yy - xy * xy)
        + 2.0
            * (wm.x * wm.y * (xz * yz - zz * xy)
                + wm.x * wm.z * (xy * yz - yy * xz)
                + wm.y * wm.z * (xy * xz - xx * yz));

    let den2 = den * den;
    if !(den2 > Float::MIN_POSITIVE) || !(det > 0.0) {
        return 0.0;
    }
    sanitize(det * det.sqrt() / (PI * den2))
}

/// Samples a visible microflake normal for the direction `sh_frame.n`. A
/// cosine-weighted hemisphere sample is mapped through the linear transform
/// taking the unit sphere to the SGGX ellipsoid, expressed in the shading
/// frame where the 2x2 sub-block is diagonalized in closed form.
///
/// * `sh_frame` - Shading frame whose normal is the incident direction.
/// * `u`        - Sample value in [0, 1)^2.
/// * `s`        - Packed SGGX matrix.
pub fn sggx_sample(sh_frame: &Frame, u: &Point2f, s: &[Float; 6]) -> Vector3f {
    let (wk, wj, wi) = (&sh_frame.s, &sh_frame.t, &sh_frame.n);

    let s_kk = quadratic_form(wk, s, wk);
    let s_jj = quadratic_form(wj, s, wj);
    let s_ii = quadratic_form(wi, s, wi);
    let s_kj = quadratic_form(wk, s, wj);
    let s_ki = quadratic_form(wk, s, wi);
    let s_ji = quadratic_form(wj, s, wi);

    let sqrt_det = safe_sqrt(determinant(s));
    let tmp = safe_sqrt(s_jj * s_ii - s_ji * s_ji);
    let inv_sqrt_s_ii = sanitize(safe_rsqrt(s_ii));
    let inv_tmp = sanitize(1.0 / tmp);

    let mk = Vector3f::new(sqrt_det * inv_tmp, 0.0, 0.0);
    let mj = Vector3f::new(
        -inv_sqrt_s_ii * (s_ki * s_ji - s_kj * s_ii) * inv_tmp,
        inv_sqrt_s_ii * tmp,
        0.0,
    );
    let mi = Vector3f::new(inv_sqrt_s_ii * s_ki, inv_sqrt_s_ii * s_ji, inv_sqrt_s_ii * s_ii);

    let w = square_to_cosine_hemisphere(u);
    let wm = mk * w.x + mj * w.y + mi * w.z;
    let len = wm.length();
    if !(len > 0.0) || !len.is_finite() {
        // Fully degenerate ellipsoid: every flake faces the viewer.
        return *wi;
    }
    sh_frame.to_world(&(wm / len))
}

/// Where the SGGX matrix comes from.
#[derive(Clone)]
pub enum SggxParameters {
    /// Same matrix everywhere.
    Constant([Float; 6]),

    /// Six channel volume evaluated at the interaction point.
    Volume(ArcVolume),
}

impl SggxParameters {
    /// Returns the matrix at `p`.
    ///
    /// * `p` - World space position.
    #[inline]
    pub fn eval(&self, p: &Point3f) -> [Float; 6] {
        match self {
            Self::Constant(s) => *s,
            Self::Volume(v) => v.eval_6(p),
        }
    }

    /// Upper bound of the largest eigenvalue over all positions.
    pub fn max_eigenvalue(&self) -> Float {
        match self {
            Self::Constant(s) => max_row_sum(s),
            // Gershgorin bound with every entry bounded by the largest magnitude.
            Self::Volume(v) => 3.0 * max(v.max(), -v.min()),
        }
    }
}

/// Specular microflake phase function with an SGGX flake distribution.
#[derive(Clone)]
pub struct SggxPhaseFunction {
    params: SggxParameters,
}

impl SggxPhaseFunction {
    /// Returns a new `SggxPhaseFunction`.
    ///
    /// * `params` - Source of the SGGX matrix.
    pub fn new(params: SggxParameters) -> Self {
        Self { params }
    }

    /// Create from parameters; `S` (six floats) defaults to the identity,
    /// i.e. spherical flakes.
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        Self::from_params_with(params, &no_volume_loader)
    }

    /// Create from parameters. When `S.type` is set, `S` is a six channel
    /// volume built by `volumes`; otherwise it is six floats as in
    /// `from_params()`.
    ///
    /// * `params`  - Parameter set.
    /// * `volumes` - Builds the volume parameter of a given name.
    pub fn from_params_with(params: &ParamSet, volumes: &VolumeLoader) -> Result<Self> {
        if !params.find_one_string("S.type", String::new()).is_empty() {
            let volume = volumes(params, "S")?;
            if volume.channels() != 6 {
                return Err(Error::InvalidParameter {
                    name: String::from("S"),
                    reason: format!("expected a 6 channel volume, got {}", volume.channels()),
                });
            }
            return Ok(Self::new(SggxParameters::Volume(volume)));
        }

        let s = match params.find_one_floats_6("S") {
            Some(s) => s,
            None if params.find_float("S").is_empty() => [1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
            None => {
                return Err(Error::InvalidParameter {
                    name: String::from("S"),
                    reason: String::from("expected 6 values (xx, yy, zz, xy, xz, yz)"),
                })
            }
        };
        Ok(Self::new(SggxParameters::Constant(s)))
    }

    /// Returns the matrix source.
    pub fn parameters(&self) -> &SggxParameters {
        &self.params
    }

    /// Returns `(value, pdf)` for scattering towards `wo`:
    /// `D(wh) / (4 σ(wi))` with `wh` the half vector.
    ///
    /// * `mi` - The medium interaction.
    /// * `wo` - Scattered direction.
    pub fn eval_pdf(&self, mi: &MediumInteraction, wo: &Vector3f) -> (Float, Float) {
        let s = self.params.eval(&mi.p);
        let pdf = Self::pdf(&mi.wi, wo, &s);
        (pdf, pdf)
    }

    /// Returns `(wo, weight, pdf)`; `wo` is `wi` mirrored about a sampled
    /// visible normal.
    ///
    /// * `mi` - The medium interaction.
    /// * `u`  - Sample value in [0, 1)^2.
    pub fn sample(&self, mi: &MediumInteraction, u: &Point2f) -> (Vector3f, Float, Float) {
        let s = self.params.eval(&mi.p);
        let wm = sggx_sample(&mi.sh_frame, u, &s);
        let wo = mi.wi.reflect(&wm);
        let pdf = Self::pdf(&mi.wi, &wo, &s);
        (wo, if pdf > 0.0 { 1.0 } else { 0.0 }, pdf)
    }

    /// Returns `sqrt(wiᵀ S wi)` at the interaction.
    ///
    /// * `mi` - The medium interaction.
    pub fn projected_area(&self, mi: &MediumInteraction) -> Float {
        sggx_projected_area(&mi.wi, &self.params.eval(&mi.p))
    }

    /// Upper bound of `projected_area()`.
    pub fn max_projected_area(&self) -> Float {
        safe_sqrt(self.params.max_eigenvalue())
    }

    fn pdf(wi: &Vector3f, wo: &Vector3f, s: &[Float; 6]) -> Float {
        let wh = *wi + *wo;
        let len = wh.length();
        if !(len > 0.0) {
            return 0.0;
        }
        safe_div(0.25 * sggx_pdf(&(wh / len), s), sggx_projected_area(wi, s))
    }
}
