//! Volumes

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::sync::Arc;

/// A spatially varying quantity sampled by media and phase functions. Values
/// are stored with 1, 3 or 6 channels.
pub trait Volume: Send + Sync {
    /// Number of channels per lookup.
    fn channels(&self) -> usize;

    /// Evaluates the volume as a spectrum.
    ///
    /// * `p` - World space position.
    fn eval(&self, p: &Point3f) -> Spectrum;

    /// Evaluates a single channel volume.
    ///
    /// * `p` - World space position.
    fn eval_1(&self, p: &Point3f) -> Float;

    /// Evaluates a six channel volume, e.g. the packed SGGX matrix
    /// `(xx, yy, zz, xy, xz, yz)`.
    ///
    /// * `p` - World space position.
    fn eval_6(&self, p: &Point3f) -> [Float; 6];

    /// Upper bound of every channel over the whole volume.
    fn max(&self) -> Float;

    /// Lower bound of every channel over the whole volume.
    fn min(&self) -> Float;

    /// Region where the volume is defined. `None` means unbounded.
    fn bbox(&self) -> Option<Bounds3f>;
}

/// Atomic reference counted `Volume`.
pub type ArcVolume = Arc<dyn Volume>;

/// Converts the channels of one lookup to a spectrum. Single channel values
/// are spectrally uniform; six channel values use their first three.
///
/// * `values` - Channel values.
pub fn channels_to_spectrum(values: &[Float]) -> Spectrum {
    match values.len() {
        0 => Spectrum::ZERO,
        1 | 2 => Spectrum::new(values[0]),
        _ => Spectrum::from_rgb(values[0], values[1], values[2]),
    }
}

/// Converts the channels of one lookup to a single value. Multi-channel
/// values are averaged.
///
/// * `values` - Channel values.
pub fn channels_to_float(values: &[Float]) -> Float {
    match values.len() {
        0 => 0.0,
        1 => values[0],
        n => values.iter().sum::<Float>() / n as Float,
    }
}

/// Converts the channels of one lookup to six values. Missing channels are
/// zero except that a single value fills the diagonal `(v, v, v, 0, 0, 0)`.
///
/// * `values` - Channel values.
pub fn channels_to_six(values: &[Float]) -> [Float; 6] {
    let mut out = [0.0; 6];
    if values.len() == 1 {
        out[..3].copy_from_slice(&[values[0]; 3]);
    } else {
        for (o, v) in out.iter_mut().zip(values.iter()) {
            *o = *v;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_conversions() {
        assert_eq!(channels_to_spectrum(&[2.0]), Spectrum::new(2.0));
        assert_eq!(channels_to_spectrum(&[1.0, 2.0, 3.0]), Spectrum::from_rgb(1.0, 2.0, 3.0));
        assert_eq!(channels_to_float(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(channels_to_six(&[1.0]), [1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            channels_to_six(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }
}
