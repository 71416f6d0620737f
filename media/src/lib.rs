//! Participating Media

#[macro_use]
extern crate log;

mod heterogeneous;
mod homogeneous;
pub mod tracking;

// Re-export
pub use heterogeneous::*;
pub use homogeneous::*;

use render_core::error::*;
use render_core::medium::*;
use render_core::paramset::*;
use std::sync::Arc;
use volumes::volume_from_params;

/// Builds the phase function of a medium from its `phase.*` parameters.
/// Volume-valued phase parameters such as a gridded SGGX `S` are loaded
/// with `volume_from_params`.
///
/// * `params` - Medium parameter set.
pub fn phase_from_params(params: &ParamSet) -> Result<ArcPhaseFunction> {
    let phase = PhaseFunction::from_params_with(&params.prefixed("phase."), &|p: &ParamSet, name: &str| {
        volume_from_params(p, name, 1.0)
    })?;
    Ok(Arc::new(phase))
}
