//! Homogeneous Medium

use crate::phase_from_params;
use render_core::error::*;
use render_core::geometry::*;
use render_core::interaction::*;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::spectrum::*;

/// Implements a homogeneous medium representing an unbounded region of space
/// with constant coefficients throughout its extent.
pub struct HomogeneousMedium {
    /// Extinction coefficient `σt = σs + σa`, already scaled.
    sigma_t: Spectrum,

    /// Single-scattering albedo `σs / σt`.
    albedo: Spectrum,

    /// The phase function.
    phase: ArcPhaseFunction,

    /// Sample emitters from inside the medium.
    sample_emitters: bool,

    /// Policy for real/null collision probabilities.
    mode: MediumEventSamplingMode,
}

impl HomogeneousMedium {
    /// Create a new `HomogeneousMedium`.
    ///
    /// * `sigma_t`         - Extinction coefficient.
    /// * `albedo`          - Single-scattering albedo.
    /// * `scale`           - Scale applied to `sigma_t`.
    /// * `phase`           - The phase function.
    /// * `sample_emitters` - Sample emitters from inside the medium.
    /// * `mode`            - Policy for real/null collision probabilities.
    pub fn new(
        sigma_t: Spectrum,
        albedo: Spectrum,
        scale: Float,
        phase: ArcPhaseFunction,
        sample_emitters: bool,
        mode: MediumEventSamplingMode,
    ) -> Result<Self> {
        check_non_negative("sigma_t", sigma_t.samples())?;
        check_non_negative("albedo", albedo.samples())?;
        if !(scale.is_finite() && scale >= 0.0) {
            return Err(Error::InvalidParameter {
                name: String::from("scale"),
                reason: format!("must be finite and non-negative, got {}", scale),
            });
        }
        if albedo.max_value() > 1.0 {
            warn!("Medium albedo {} exceeds 1; the medium adds energy", albedo);
        }

        let sigma_t = sigma_t * scale;
        if sigma_t.is_black() {
            warn!("Homogeneous medium has zero extinction; it will never scatter");
        }
        debug!("Homogeneous medium: sigma_t {}, albedo {}, phase {}", sigma_t, albedo, phase);

        Ok(Self {
            sigma_t,
            albedo,
            phase,
            sample_emitters,
            mode,
        })
    }

    /// Create from parameters.
    ///
    /// * `params` - Keys: `sigma_t` (spectrum or float, default 1), `albedo`
    ///              (default 0.75), `scale` (1), `sample_emitters` (true),
    ///              `sampling_mode` ("analogue") and `phase.*`.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let sigma_t = params.find_one_spectrum_or_float("sigma_t", Spectrum::ONE);
        let albedo = params.find_one_spectrum_or_float("albedo", Spectrum::new(0.75));
        let scale = params.find_one_float("scale", 1.0);
        let sample_emitters = params.find_one_bool("sample_emitters", true);
        let mode = params
            .find_one_string("sampling_mode", String::from("analogue"))
            .parse::<MediumEventSamplingMode>()?;
        let phase = phase_from_params(params)?;
        Self::new(sigma_t, albedo, scale, phase, sample_emitters, mode)
    }

    /// Scaled extinction coefficient.
    pub fn sigma_t(&self) -> Spectrum {
        self.sigma_t
    }

    /// Single-scattering albedo.
    pub fn albedo(&self) -> Spectrum {
        self.albedo
    }
}

impl Medium for HomogeneousMedium {
    fn phase_function(&self) -> &ArcPhaseFunction {
        &self.phase
    }

    fn is_homogeneous(&self) -> bool {
        true
    }

    fn has_spectral_extinction(&self) -> bool {
        !self.sigma_t.is_uniform()
    }

    fn use_emitter_sampling(&self) -> bool {
        self.sample_emitters
    }

    fn sampling_mode(&self) -> MediumEventSamplingMode {
        self.mode
    }

    /// The medium fills all of space.
    fn intersect_aabb(&self, _ray: &Ray) -> (bool, Float, Float) {
        (true, 0.0, INFINITY)
    }

    fn get_majorant(&self, _mi: &MediumInteraction, active: bool) -> Spectrum {
        if active {
            self.sigma_t
        } else {
            Spectrum::ZERO
        }
    }

    /// The majorant is tight so there are no null collisions.
    fn get_scattering_coefficients(&self, _mi: &MediumInteraction, active: bool) -> (Spectrum, Spectrum, Spectrum) {
        if active {
            (self.albedo * self.sigma_t, Spectrum::ZERO, self.sigma_t)
        } else {
            (Spectrum::ZERO, Spectrum::ZERO, Spectrum::ZERO)
        }
    }
}
