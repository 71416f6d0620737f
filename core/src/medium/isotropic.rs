//! Isotropic

use crate::geometry::*;
use crate::pbrt::*;
use crate::sampling::*;

/// Scatters uniformly over the sphere of directions.
#[derive(Copy, Clone, Debug, Default)]
pub struct IsotropicPhaseFunction;

impl IsotropicPhaseFunction {
    /// Returns a new `IsotropicPhaseFunction`.
    pub fn new() -> Self {
        Self
    }

    /// Returns `(wo, weight, pdf)`.
    ///
    /// * `u` - Sample value in [0, 1)^2.
    pub fn sample(&self, u: &Point2f) -> (Vector3f, Float, Float) {
        (square_to_uniform_sphere(u), 1.0, square_to_uniform_sphere_pdf())
    }

    /// Returns `(value, pdf)`.
    pub fn eval_pdf(&self) -> (Float, Float) {
        (INV_FOUR_PI, INV_FOUR_PI)
    }
}

#[cfg(test)]
mod tests {
    use super::super::phase_function::tests::*;
    use super::super::*;

    #[test]
    fn normalized_and_consistent() {
        let phase = PhaseFunction::Isotropic(IsotropicPhaseFunction::new());
        let mi = interaction(Vector3f::new(1.0, 2.0, 3.0));
        assert!((integrate_pdf(&phase, &mi, 64) - 1.0).abs() < 1e-3);
        check_sample_consistency(&phase, &mi);
        assert_eq!(phase.projected_area(&mi), 1.0);
    }
}
