//! Medium

use crate::batch::*;
use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

mod blend;
mod henyey_greenstein;
mod isotropic;
mod phase_function;
mod sggx;
mod tabulated;

// Re-exports
pub use blend::*;
pub use henyey_greenstein::*;
pub use isotropic::*;
pub use phase_function::*;
pub use sggx::*;
pub use tabulated::*;

/// Policy used to choose between real and null collisions at a tentative
/// collision along a ray.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum MediumEventSamplingMode {
    /// Probabilities proportional to the mean of `sigma_s` and `sigma_n`.
    #[default]
    Analogue,

    /// Probabilities proportional to the largest channel of the path
    /// contribution for each event.
    Maximum,

    /// Probabilities proportional to the channel mean of the path
    /// contribution for each event.
    Mean,
}

impl FromStr for MediumEventSamplingMode {
    type Err = Error;

    /// Parses `"analogue"`, `"maximum"` or `"mean"`.
    ///
    /// * `s` - The configuration string.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "analogue" => Ok(Self::Analogue),
            "maximum" => Ok(Self::Maximum),
            "mean" => Ok(Self::Mean),
            _ => Err(Error::UnknownVariant {
                kind: "medium sampling mode",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MediumEventSamplingMode {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analogue => write!(f, "analogue"),
            Self::Maximum => write!(f, "maximum"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

/// Medium trait to handle volumetric scattering properties.
///
/// Implementations provide the majorant and the local coefficients; free-flight
/// sampling, transmittance and event probabilities are derived from those.
pub trait Medium: Send + Sync {
    /// Returns the phase function of the medium.
    fn phase_function(&self) -> &ArcPhaseFunction;

    /// Returns `true` if the coefficients do not vary in space.
    fn is_homogeneous(&self) -> bool;

    /// Returns `true` if the extinction differs between channels.
    fn has_spectral_extinction(&self) -> bool;

    /// Returns `true` if emitters should be sampled from inside the medium.
    fn use_emitter_sampling(&self) -> bool;

    /// Returns the policy used by `get_interaction_probabilities`.
    fn sampling_mode(&self) -> MediumEventSamplingMode;

    /// Returns `(hit, mint, maxt)`, the ray interval overlapping the medium.
    /// Unbounded media return `(true, 0, INFINITY)`.
    ///
    /// * `ray` - The ray.
    fn intersect_aabb(&self, ray: &Ray) -> (bool, Float, Float);

    /// Returns an upper bound of the extinction over the region `mi` was
    /// sampled in.
    ///
    /// * `mi`     - The interaction.
    /// * `active` - Inactive calls return zero.
    fn get_majorant(&self, mi: &MediumInteraction, active: bool) -> Spectrum;

    /// Returns `(sigma_s, sigma_n, sigma_t)` at `mi.p`.
    ///
    /// * `mi`     - The interaction.
    /// * `active` - Inactive calls return zeros.
    fn get_scattering_coefficients(&self, mi: &MediumInteraction, active: bool) -> (Spectrum, Spectrum, Spectrum);

    /// Samples a tentative collision distance along `ray` from the majorant of
    /// one channel. The result has `t == INFINITY` when the sample lands past
    /// the end of the segment or the ray misses the medium.
    ///
    /// * `ray`     - The ray; `t_max` bounds the segment.
    /// * `sample`  - Uniform sample in [0, 1).
    /// * `channel` - Channel whose majorant drives the exponential.
    /// * `active`  - Inactive calls return an invalid interaction.
    fn sample_interaction(&self, ray: &Ray, sample: Float, channel: usize, active: bool) -> MediumInteraction {
        debug_assert!(channel < SPECTRUM_SAMPLES, "channel {} out of range", channel);

        let mut mi = MediumInteraction {
            wi: -ray.d,
            sh_frame: Frame::new(-ray.d),
            time: ray.time,
            ..Default::default()
        };

        let (hit, mint, maxt) = self.intersect_aabb(ray);
        let active = active && hit && (mint.is_finite() || maxt.is_finite());
        if !active {
            return mi;
        }

        let mint = max(0.0, mint);
        let maxt = min(ray.t_max, maxt);

        let combined_extinction = self.get_majorant(&mi, true);
        let m = combined_extinction[channel];
        let sampled_t = mint - (1.0 - sample).ln() / m;

        // NaN (zero majorant and zero sample) fails the comparison too.
        let valid = sampled_t <= maxt;
        mi.mint = mint;
        mi.combined_extinction = combined_extinction;
        if valid {
            mi.t = sampled_t;
            mi.p = ray.at(sampled_t);
            let (sigma_s, sigma_n, sigma_t) = self.get_scattering_coefficients(&mi, true);
            mi.sigma_s = sigma_s;
            mi.sigma_n = sigma_n;
            mi.sigma_t = sigma_t;
        }
        mi
    }

    /// Returns `(tr, pdf)`: the majorant transmittance between `mi.mint` and
    /// the nearer of the two interactions, and the matching sampling density.
    /// The pdf is the survival probability when the surface comes first and
    /// the collision density otherwise.
    ///
    /// * `mi`     - A sampled medium interaction.
    /// * `si`     - The surface interaction bounding the segment.
    /// * `active` - Inactive calls return zeros.
    fn transmittance_eval_pdf(
        &self,
        mi: &MediumInteraction,
        si: &SurfaceInteraction,
        active: bool,
    ) -> (Spectrum, Spectrum) {
        if !active {
            return (Spectrum::ZERO, Spectrum::ZERO);
        }

        let t = min(mi.t, si.t) - mi.mint;
        let tr = mi.combined_extinction.map(|m| if m > 0.0 { (-t * m).exp() } else { 1.0 });
        let pdf = if si.t < mi.t { tr } else { tr * mi.combined_extinction };
        (tr, pdf)
    }

    /// Returns `((p_scatter, p_null), (w_scatter, w_null))` for a tentative
    /// collision: the probabilities of treating it as a real scattering or a
    /// null collision under `sampling_mode()`, and the coefficients divided by
    /// those probabilities. Probabilities sum to one unless both are zero;
    /// weights of impossible events are zero.
    ///
    /// * `radiance`   - Radiance estimate at the collision.
    /// * `mi`         - The interaction with its coefficients filled in.
    /// * `throughput` - Path throughput.
    fn get_interaction_probabilities(
        &self,
        radiance: &Spectrum,
        mi: &MediumInteraction,
        throughput: &Spectrum,
    ) -> ((Float, Float), (Spectrum, Spectrum)) {
        let (prob_scatter, prob_null) = match self.sampling_mode() {
            MediumEventSamplingMode::Analogue => (mi.sigma_s.average(), mi.sigma_n.average()),
            MediumEventSamplingMode::Maximum => (
                (*radiance * *throughput * mi.sigma_s).abs().max_value(),
                (*radiance * *throughput * mi.sigma_n).abs().max_value(),
            ),
            MediumEventSamplingMode::Mean => (
                (*radiance * *throughput * mi.sigma_s).abs().average(),
                (*radiance * *throughput * mi.sigma_n).abs().average(),
            ),
        };

        let c = prob_scatter + prob_null;
        let prob_scatter = sanitize(prob_scatter / c);
        let prob_null = sanitize(prob_null / c);

        let weight_scatter = (mi.sigma_s / prob_scatter).sanitize();
        let weight_null = (mi.sigma_n / prob_null).sanitize();
        ((prob_scatter, prob_null), (weight_scatter, weight_null))
    }
}

/// Atomic reference counted `Medium`.
pub type ArcMedium = Arc<dyn Medium>;

/// Samples one tentative collision per active lane.
///
/// * `medium`  - The medium.
/// * `rays`    - One ray per lane.
/// * `samples` - One uniform sample per lane.
/// * `channel` - Channel whose majorant drives the exponential.
/// * `mask`    - Active lanes.
pub fn sample_interaction_batch<M: Medium + ?Sized>(
    medium: &M,
    rays: &[Ray],
    samples: &[Float],
    channel: usize,
    mask: &Mask,
) -> Packet<MediumInteraction> {
    assert_eq!(rays.len(), samples.len(), "ray and sample widths differ");
    let lanes: Vec<usize> = (0..rays.len()).collect();
    vectorize(&lanes, mask, |&i| medium.sample_interaction(&rays[i], samples[i], channel, true))
}

/// MediumInterface represents the boundary interface between two media.
#[derive(Clone, Default)]
pub struct MediumInterface {
    /// Represent the interior of a geometric primitive.
    pub inside: Option<ArcMedium>,

    /// Represent the exterior of a geometric primitive.
    pub outside: Option<ArcMedium>,
}

impl MediumInterface {
    /// Create a medium interface between two media.
    ///
    /// * `inside`  - The interior medium.
    /// * `outside` - The exterior medium.
    pub fn new(inside: Option<ArcMedium>, outside: Option<ArcMedium>) -> Self {
        Self { inside, outside }
    }

    /// Create a medium interface that represents a vacuum.
    pub fn vacuum() -> Self {
        Self::default()
    }

    /// Returns `true` if the medium interface marks a transition between
    /// two distinct media.
    pub fn is_medium_transition(&self) -> bool {
        match (self.inside.as_ref(), self.outside.as_ref()) {
            (Some(inside), Some(outside)) => !Arc::ptr_eq(inside, outside),
            (Some(_), None) => true,
            (None, Some(_)) => true,
            (None, None) => false,
        }
    }

    /// Returns the medium a ray leaving the boundary enters.
    ///
    /// * `d` - Direction of the ray.
    /// * `n` - Boundary normal, pointing outside.
    pub fn get_medium(&self, d: &Vector3f, n: &Normal3f) -> Option<ArcMedium> {
        if d.dot(n) > 0.0 {
            self.outside.clone()
        } else {
            self.inside.clone()
        }
    }
}

impl From<ArcMedium> for MediumInterface {
    /// Create a medium interface between same media.
    ///
    /// * `medium` - The medium on either side of the interface.
    fn from(medium: ArcMedium) -> Self {
        Self {
            inside: Some(Arc::clone(&medium)),
            outside: Some(medium),
        }
    }
}
