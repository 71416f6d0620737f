//! Volumes

#[macro_use]
extern crate log;

mod constant;
mod grid;

// Re-export
pub use constant::*;
pub use grid::*;

use render_core::error::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::spectrum::*;
use render_core::volume::*;
use std::sync::Arc;

/// Builds the volume parameter `name`.
///
/// A `"<name>.type"` string of `constant` or `grid` selects a nested volume
/// configured by the `"<name>.*"` keys. Otherwise `name` is read as a
/// spectrum or float and wrapped in a `ConstVolume`.
///
/// * `params`  - Parameter set.
/// * `name`    - Parameter name, e.g. `"sigma_t"`.
/// * `default` - Value when the parameter is absent.
pub fn volume_from_params(params: &ParamSet, name: &str, default: Float) -> Result<ArcVolume> {
    let volume_type = params.find_one_string(&format!("{}.type", name), String::new());
    let nested = || params.prefixed(&format!("{}.", name));
    match volume_type.as_str() {
        "" => {
            let value = params.find_one_spectrum_or_float(name, Spectrum::new(default));
            Ok(Arc::new(ConstVolume::new(value.samples())?))
        }
        "constant" => Ok(Arc::new(ConstVolume::from_params(&nested())?)),
        "grid" => {
            let grid = GridVolume::from_params(&nested())?;
            debug!("Volume '{}': grid {:?}", name, grid.resolution());
            Ok(Arc::new(grid))
        }
        _ => Err(Error::UnknownVariant {
            kind: "volume",
            name: volume_type,
        }),
    }
}
