//! Tabulated Phase Function

use super::phase_function::scattered_direction;
use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::paramset::*;
use crate::pbrt::*;
use crate::sampling::*;

/// Phase function given by values at uniformly spaced cosines of the
/// scattering angle, from -1 (back scattering) to 1 (forward scattering),
/// interpolated linearly. The table is normalized on construction.
#[derive(Clone, Debug)]
pub struct TabulatedPhaseFunction {
    distr: ContinuousDistribution,
}

impl TabulatedPhaseFunction {
    /// Returns a new `TabulatedPhaseFunction`.
    ///
    /// * `values` - Non-negative values; at least two.
    pub fn new(values: &[Float]) -> Result<Self> {
        let distr = ContinuousDistribution::new([-1.0, 1.0], values)?;
        if distr.integral() == 0.0 {
            warn!("Tabulated phase function has no mass; it will not scatter");
        } else {
            debug!("Tabulated phase function: {} values, integral {}", values.len(), distr.integral());
        }
        Ok(Self { distr })
    }

    /// Create from parameters; `values` is required.
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let values = params.find_float("values");
        if values.is_empty() {
            return Err(Error::MissingParameter(String::from("values")));
        }
        Self::new(&values)
    }

    /// Number of tabulated values.
    pub fn len(&self) -> usize {
        self.distr.len()
    }

    /// Returns `true` if the table is empty. Never the case for a
    /// constructed table.
    pub fn is_empty(&self) -> bool {
        self.distr.is_empty()
    }

    /// Returns `(value, pdf)` for scattering towards `wo`.
    ///
    /// * `mi` - The medium interaction.
    /// * `wo` - Scattered direction.
    pub fn eval_pdf(&self, mi: &MediumInteraction, wo: &Vector3f) -> (Float, Float) {
        let cos_theta = -wo.dot(&mi.wi);
        let pdf = self.distr.eval_pdf_normalized(cos_theta) * INV_TWO_PI;
        (pdf, pdf)
    }

    /// Returns `(wo, weight, pdf)`; the cosine is drawn from the table and the
    /// azimuth uniformly.
    ///
    /// * `mi` - The medium interaction.
    /// * `u`  - Sample value in [0, 1)^2.
    pub fn sample(&self, mi: &MediumInteraction, u: &Point2f) -> (Vector3f, Float, Float) {
        let (cos_theta, pdf) = self.distr.sample_pdf(u[0]);
        let wo = mi.to_world(&scattered_direction(cos_theta, u[1]));
        let pdf = pdf * INV_TWO_PI;
        (wo, if pdf > 0.0 { 1.0 } else { 0.0 }, pdf)
    }
}
