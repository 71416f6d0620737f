//! Phase Function

use super::*;
use crate::paramset::*;
use crate::pbrt::*;
use crate::volume::*;
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Stores combination of flags describing a phase function.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct PhaseFunctionFlags: u8 {
        const ISOTROPIC = 1;
        const ANISOTROPIC = 2;
        const MICROFLAKE = 4;
    }
}

/// Direction of light transport along the path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransportMode {
    /// Paths traced from the sensor.
    #[default]
    Radiance,

    /// Paths traced from the emitters.
    Importance,
}

/// Per-query settings passed to phase functions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseFunctionContext {
    /// Transport direction.
    pub mode: TransportMode,

    /// Restricts queries to one component of a mixture. `None` uses all of
    /// them.
    pub component: Option<usize>,
}

impl PhaseFunctionContext {
    /// Returns a context restricted to one component.
    ///
    /// * `component` - Component index.
    pub fn with_component(component: usize) -> Self {
        Self {
            component: Some(component),
            ..Default::default()
        }
    }

    /// Swaps the transport direction.
    pub fn reverse(&mut self) {
        self.mode = match self.mode {
            TransportMode::Radiance => TransportMode::Importance,
            TransportMode::Importance => TransportMode::Radiance,
        };
    }
}

/// Models scattering properties in volumetric media.
///
/// Directions follow the interaction convention: `mi.wi` points away from the
/// scattering point, back where the light came from, and `wo` is the
/// scattered direction. Forward scattering is therefore `wo == -mi.wi`.
#[derive(Clone)]
pub enum PhaseFunction {
    Isotropic(IsotropicPhaseFunction),
    HenyeyGreenstein(HenyeyGreenstein),
    Tabulated(TabulatedPhaseFunction),
    Sggx(SggxPhaseFunction),
    Blend(BlendPhaseFunction),
}

/// Atomic reference counted `PhaseFunction`.
pub type ArcPhaseFunction = Arc<PhaseFunction>;

/// Builds the volume parameter `name` of a parameter set.
pub type VolumeLoader = dyn Fn(&ParamSet, &str) -> Result<ArcVolume>;

/// Loader used when the caller has none; every volume parameter is an error.
pub(crate) fn no_volume_loader(_params: &ParamSet, name: &str) -> Result<ArcVolume> {
    Err(Error::InvalidParameter {
        name: String::from(name),
        reason: String::from("volume parameters need a volume loader"),
    })
}

impl PhaseFunction {
    /// Create a phase function from parameters.
    ///
    /// * `params` - Keys: `type` (`isotropic`, `hg`, `tabulated`, `sggx`,
    ///              `blend`), then `g`, `values`, `S`, `weight` and the
    ///              nested `phase1.*` / `phase2.*` depending on the type.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        Self::from_params_with(params, &no_volume_loader)
    }

    /// Create a phase function from parameters, building volume-valued
    /// parameters (an SGGX `S` with `S.type` set) with `volumes`.
    ///
    /// * `params`  - Parameter set, see `from_params()`.
    /// * `volumes` - Builds the volume parameter of a given name.
    pub fn from_params_with(params: &ParamSet, volumes: &VolumeLoader) -> Result<Self> {
        let phase_type = params.find_one_string("type", String::from("isotropic"));
        match phase_type.as_str() {
            "isotropic" => Ok(Self::Isotropic(IsotropicPhaseFunction::new())),
            "hg" => HenyeyGreenstein::from_params(params).map(Self::HenyeyGreenstein),
            "tabulated" => TabulatedPhaseFunction::from_params(params).map(Self::Tabulated),
            "sggx" => SggxPhaseFunction::from_params_with(params, volumes).map(Self::Sggx),
            "blend" => BlendPhaseFunction::from_params_with(params, volumes).map(Self::Blend),
            _ => Err(Error::UnknownVariant {
                kind: "phase function",
                name: phase_type,
            }),
        }
    }

    /// Samples a scattered direction. Returns `(wo, weight, pdf)` where
    /// `weight` is the phase function value divided by `pdf`.
    ///
    /// * `ctx`     - Query context.
    /// * `mi`      - The medium interaction.
    /// * `sample1` - Uniform sample used to choose a mixture component.
    /// * `sample2` - Uniform sample used to pick the direction.
    /// * `active`  - Inactive calls return zeros.
    pub fn sample(
        &self,
        ctx: &PhaseFunctionContext,
        mi: &MediumInteraction,
        sample1: Float,
        sample2: &Point2f,
        active: bool,
    ) -> (Vector3f, Float, Float) {
        if !active || !self.accepts(ctx) {
            return (Vector3f::ZERO, 0.0, 0.0);
        }
        match self {
            Self::Isotropic(f) => f.sample(sample2),
            Self::HenyeyGreenstein(f) => f.sample(mi, sample2),
            Self::Tabulated(f) => f.sample(mi, sample2),
            Self::Sggx(f) => f.sample(mi, sample2),
            Self::Blend(f) => f.sample(ctx, mi, sample1, sample2),
        }
    }

    /// Returns `(value, pdf)` for scattering towards `wo`. All phase functions
    /// here are normalized, so the two agree except for blends restricted to
    /// one component.
    ///
    /// * `ctx`    - Query context.
    /// * `mi`     - The medium interaction.
    /// * `wo`     - The scattered direction.
    /// * `active` - Inactive calls return zeros.
    pub fn eval_pdf(&self, ctx: &PhaseFunctionContext, mi: &MediumInteraction, wo: &Vector3f, active: bool) -> (Float, Float) {
        if !active || !self.accepts(ctx) {
            return (0.0, 0.0);
        }
        match self {
            Self::Isotropic(f) => f.eval_pdf(),
            Self::HenyeyGreenstein(f) => f.eval_pdf(mi, wo),
            Self::Tabulated(f) => f.eval_pdf(mi, wo),
            Self::Sggx(f) => f.eval_pdf(mi, wo),
            Self::Blend(f) => f.eval_pdf(ctx, mi, wo),
        }
    }

    /// Returns the flags of all components.
    pub fn flags(&self) -> PhaseFunctionFlags {
        match self {
            Self::Isotropic(_) => PhaseFunctionFlags::ISOTROPIC,
            Self::HenyeyGreenstein(_) | Self::Tabulated(_) => PhaseFunctionFlags::ANISOTROPIC,
            Self::Sggx(_) => PhaseFunctionFlags::ANISOTROPIC | PhaseFunctionFlags::MICROFLAKE,
            Self::Blend(f) => f.flags(),
        }
    }

    /// Returns the number of components.
    pub fn component_count(&self) -> usize {
        match self {
            Self::Blend(f) => f.component_count(),
            _ => 1,
        }
    }

    /// Upper bound of `projected_area()` over the medium.
    pub fn max_projected_area(&self) -> Float {
        match self {
            Self::Sggx(f) => f.max_projected_area(),
            Self::Blend(f) => f.max_projected_area(),
            _ => 1.0,
        }
    }

    /// Returns the projected area of the scatterers seen from `mi.wi`. Media
    /// with microflake phase functions scale their extinction by it.
    ///
    /// * `mi` - The medium interaction.
    pub fn projected_area(&self, mi: &MediumInteraction) -> Float {
        match self {
            Self::Sggx(f) => f.projected_area(mi),
            Self::Blend(f) => f.projected_area(mi),
            _ => 1.0,
        }
    }

    /// Single-component functions only answer to component 0.
    fn accepts(&self, ctx: &PhaseFunctionContext) -> bool {
        match (self, ctx.component) {
            (Self::Blend(_), _) | (_, None) => true,
            (_, Some(c)) => c == 0,
        }
    }
}

impl fmt::Display for PhaseFunction {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[PhaseFunction ")?;
        match self {
            Self::Isotropic(_) => write!(f, "isotropic")?,
            Self::HenyeyGreenstein(h) => write!(f, "hg g={}", h.g)?,
            Self::Tabulated(t) => write!(f, "tabulated size={}", t.len())?,
            Self::Sggx(_) => write!(f, "sggx")?,
            Self::Blend(b) => write!(f, "blend weight={} {} {}", b.weight(), b.phases()[0], b.phases()[1])?,
        }
        write!(f, "]")
    }
}

/// Builds a local direction from the cosine of the scattering angle, measured
/// against the propagation direction `-wi`, and an azimuth sample.
///
/// * `cos_theta` - Cosine of the scattering angle.
/// * `u`         - Azimuth sample in [0, 1).
#[inline]
pub(crate) fn scattered_direction(cos_theta: Float, u: Float) -> Vector3f {
    let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
    let phi = TWO_PI * u;
    Vector3f::new(sin_theta * cos(phi), sin_theta * sin(phi), -cos_theta)
}
