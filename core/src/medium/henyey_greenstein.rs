//! Henyey-Greenstein

use super::phase_function::scattered_direction;
use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::paramset::*;
use crate::pbrt::*;

/// Henyey-Greenstein phase function.
#[derive(Copy, Clone, Debug)]
pub struct HenyeyGreenstein {
    /// The asymmetry parameter. It is the average value of the product of the
    /// phase function being approximated and the cosine of the angle between two
    /// directions. Isotropic phase functions use g = 0.
    pub g: Float,
}

impl HenyeyGreenstein {
    /// Returns a new `HenyeyGreenstein`.
    ///
    /// * `g` - The asymmetry parameter in (-1, 1).
    pub fn new(g: Float) -> Result<Self> {
        if !(g > -1.0 && g < 1.0) {
            return Err(Error::InvalidParameter {
                name: String::from("g"),
                reason: format!("asymmetry must lie in (-1, 1), got {}", g),
            });
        }
        Ok(Self { g })
    }

    /// Create from parameters; `g` defaults to 0.8.
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        Self::new(params.find_one_float("g", 0.8))
    }

    /// Returns `(value, pdf)` for scattering towards `wo`.
    ///
    /// * `mi` - The medium interaction.
    /// * `wo` - Scattered direction.
    pub fn eval_pdf(&self, mi: &MediumInteraction, wo: &Vector3f) -> (Float, Float) {
        let pdf = phase_hg(wo.dot(&mi.wi), self.g);
        (pdf, pdf)
    }

    /// Returns `(wo, weight, pdf)` for a scattered direction drawn from the
    /// phase function.
    ///
    /// * `mi` - The medium interaction.
    /// * `u`  - Sample value in [0, 1)^2.
    pub fn sample(&self, mi: &MediumInteraction, u: &Point2f) -> (Vector3f, Float, Float) {
        // Compute $\cos \theta$ for Henyey--Greenstein sample
        let g = self.g;
        let cos_theta = if abs(g) < 1e-3 {
            1.0 - 2.0 * u[0]
        } else {
            let sqr_term = (1.0 - g * g) / (1.0 - g + 2.0 * g * u[0]);
            (1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)
        };

        let wo = mi.to_world(&scattered_direction(clamp(cos_theta, -1.0, 1.0), u[1]));
        let pdf = phase_hg(-cos_theta, g);
        (wo, 1.0, pdf)
    }
}

/// Computes the Henyey-Greenstein phase function which can be used by other
/// phase function
///
/// * `cos_theta` - Cosine between `wo` and `wi` (both pointing away).
/// * `g`         - Asymmetry parameter.
#[inline]
pub fn phase_hg(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g * g) / (denom * safe_sqrt(denom))
}

#[cfg(test)]
mod tests {
    use super::super::phase_function::tests::*;
    use super::super::*;
    use crate::pbrt::*;

    #[test]
    fn rejects_out_of_range_asymmetry() {
        assert!(HenyeyGreenstein::new(1.0).is_err());
        assert!(HenyeyGreenstein::new(-1.5).is_err());
        assert!(HenyeyGreenstein::new(0.99).is_ok());
    }

    #[test]
    fn zero_asymmetry_is_isotropic() {
        assert!((phase_hg(0.3, 0.0) - INV_FOUR_PI).abs() < 1e-7);
    }

    #[test]
    fn forward_scattering_peaks_opposite_wi() {
        let hg = HenyeyGreenstein::new(0.7).unwrap();
        let mi = interaction(Vector3f::Z);
        let forward = hg.eval_pdf(&mi, &-Vector3f::Z).1;
        let backward = hg.eval_pdf(&mi, &Vector3f::Z).1;
        assert!(forward > backward);
    }

    #[test]
    fn normalized_and_consistent() {
        for &g in &[-0.6, 0.0, 0.3, 0.8] {
            let phase = PhaseFunction::HenyeyGreenstein(HenyeyGreenstein::new(g).unwrap());
            let mi = interaction(Vector3f::new(0.2, -0.4, 0.9));
            let integral = integrate_pdf(&phase, &mi, 256);
            assert!((integral - 1.0).abs() < 1e-2, "g={} integral={}", g, integral);
            check_sample_consistency(&phase, &mi);
        }
    }
}
