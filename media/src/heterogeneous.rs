//! Heterogeneous Medium

use crate::phase_from_params;
use render_core::error::*;
use render_core::geometry::*;
use render_core::interaction::*;
use render_core::medium::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::spectrum::*;
use render_core::volume::*;
use volumes::volume_from_params;

/// Implements a medium whose extinction and albedo vary in space. Free-flight
/// sampling runs against a single spectrally uniform majorant and the gap to
/// the local extinction is made up with null collisions.
pub struct HeterogeneousMedium {
    /// Extinction before scaling. Its bounding box bounds the medium.
    sigma_t: ArcVolume,

    /// Single-scattering albedo.
    albedo: ArcVolume,

    /// Scale applied to `sigma_t`.
    scale: Float,

    /// Bound on the scaled extinction anywhere in the medium.
    majorant: Float,

    /// The phase function.
    phase: ArcPhaseFunction,

    /// Sample emitters from inside the medium.
    sample_emitters: bool,

    /// Policy for real/null collision probabilities.
    mode: MediumEventSamplingMode,
}

impl HeterogeneousMedium {
    /// Create a new `HeterogeneousMedium`.
    ///
    /// * `sigma_t`         - Extinction volume.
    /// * `albedo`          - Albedo volume.
    /// * `scale`           - Scale applied to `sigma_t`.
    /// * `phase`           - The phase function.
    /// * `sample_emitters` - Sample emitters from inside the medium.
    /// * `mode`            - Policy for real/null collision probabilities.
    pub fn new(
        sigma_t: ArcVolume,
        albedo: ArcVolume,
        scale: Float,
        phase: ArcPhaseFunction,
        sample_emitters: bool,
        mode: MediumEventSamplingMode,
    ) -> Result<Self> {
        if !(scale.is_finite() && scale >= 0.0) {
            return Err(Error::InvalidParameter {
                name: String::from("scale"),
                reason: format!("must be finite and non-negative, got {}", scale),
            });
        }

        check_non_negative_volume("sigma_t", &sigma_t)?;
        check_non_negative_volume("albedo", &albedo)?;

        let max_density = sigma_t.max();
        if !(max_density.is_finite() && max_density >= 0.0) {
            return Err(Error::InvalidParameter {
                name: String::from("sigma_t"),
                reason: format!("maximum must be finite and non-negative, got {}", max_density),
            });
        }

        // Microflake media scale extinction by the projected flake area.
        let mut majorant = scale * max_density;
        if phase.flags().contains(PhaseFunctionFlags::MICROFLAKE) {
            majorant *= phase.max_projected_area();
        }
        if majorant == 0.0 {
            warn!("Heterogeneous medium has a zero majorant; it will never scatter");
        }
        info!(
            "Heterogeneous medium: majorant {}, {} extinction channel(s), bounds {:?}",
            majorant,
            sigma_t.channels(),
            sigma_t.bbox()
        );

        Ok(Self {
            sigma_t,
            albedo,
            scale,
            majorant,
            phase,
            sample_emitters,
            mode,
        })
    }

    /// Create from parameters.
    ///
    /// * `params` - Keys: `sigma_t` (volume, default 1), `albedo` (volume,
    ///              default 0.75), `scale` (1), `sample_emitters` (true),
    ///              `sampling_mode` ("analogue") and `phase.*`. A volume is
    ///              a plain value or a nested `constant`/`grid` selected by
    ///              `<name>.type`.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let sigma_t = volume_from_params(params, "sigma_t", 1.0)?;
        let albedo = volume_from_params(params, "albedo", 0.75)?;
        let scale = params.find_one_float("scale", 1.0);
        let sample_emitters = params.find_one_bool("sample_emitters", true);
        let mode = params
            .find_one_string("sampling_mode", String::from("analogue"))
            .parse::<MediumEventSamplingMode>()?;
        let phase = phase_from_params(params)?;
        Self::new(sigma_t, albedo, scale, phase, sample_emitters, mode)
    }

    /// Bound on the scaled extinction.
    pub fn majorant(&self) -> Float {
        self.majorant
    }

    /// Scale applied to `sigma_t`.
    pub fn scale(&self) -> Float {
        self.scale
    }
}

/// Rejects volumes holding negative entries.
///
/// * `name`   - Parameter name, used in the error.
/// * `volume` - The volume.
fn check_non_negative_volume(name: &str, volume: &ArcVolume) -> Result<()> {
    let lowest = volume.min();
    if lowest.is_nan() || lowest < 0.0 {
        return Err(Error::InvalidParameter {
            name: String::from(name),
            reason: format!("entries must be non-negative, minimum is {}", lowest),
        });
    }
    Ok(())
}

impl Medium for HeterogeneousMedium {
    fn phase_function(&self) -> &ArcPhaseFunction {
        &self.phase
    }

    fn is_homogeneous(&self) -> bool {
        false
    }

    fn has_spectral_extinction(&self) -> bool {
        self.sigma_t.channels() != 1
    }

    fn use_emitter_sampling(&self) -> bool {
        self.sample_emitters
    }

    fn sampling_mode(&self) -> MediumEventSamplingMode {
        self.mode
    }

    /// Clips the ray to the extinction volume's bounds. Unbounded volumes
    /// fill all of space.
    fn intersect_aabb(&self, ray: &Ray) -> (bool, Float, Float) {
        match self.sigma_t.bbox() {
            Some(bbox) => match bbox.intersect_p(ray) {
                Some((t0, t1)) => (true, t0, t1),
                None => (false, INFINITY, -INFINITY),
            },
            None => (true, 0.0, INFINITY),
        }
    }

    fn get_majorant(&self, _mi: &MediumInteraction, active: bool) -> Spectrum {
        if active {
            Spectrum::new(self.majorant)
        } else {
            Spectrum::ZERO
        }
    }

    fn get_scattering_coefficients(&self, mi: &MediumInteraction, active: bool) -> (Spectrum, Spectrum, Spectrum) {
        if !active {
            return (Spectrum::ZERO, Spectrum::ZERO, Spectrum::ZERO);
        }

        let mut sigma_t = self.sigma_t.eval(&mi.p) * self.scale;
        if self.phase.flags().contains(PhaseFunctionFlags::MICROFLAKE) {
            sigma_t *= self.phase.projected_area(mi);
        }
        let sigma_s = self.albedo.eval(&mi.p) * sigma_t;
        let sigma_n = sigma_t.map(|s| max(self.majorant - s, 0.0));
        (sigma_s, sigma_n, sigma_t)
    }
}
