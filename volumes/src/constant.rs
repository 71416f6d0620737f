//! Constant Volume

use render_core::error::*;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::spectrum::*;
use render_core::volume::*;

/// A volume with the same value everywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstVolume {
    /// 1, 3 or 6 channel values.
    values: Vec<Float>,
}

impl ConstVolume {
    /// Create a new `ConstVolume`.
    ///
    /// * `values` - 1, 3 or 6 channel values.
    pub fn new(values: &[Float]) -> Result<Self> {
        check_channels("value", values.len())?;
        Ok(Self { values: values.to_vec() })
    }

    /// Create from parameters. `value` holds 1, 3 or 6 floats (default 1.0)
    /// or a spectrum.
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let values = params.find_float("value");
        if !values.is_empty() {
            return Self::new(&values);
        }
        let s = params.find_one_spectrum("value", Spectrum::ONE);
        Self::new(s.samples())
    }
}

impl Volume for ConstVolume {
    fn channels(&self) -> usize {
        self.values.len()
    }

    fn eval(&self, _p: &Point3f) -> Spectrum {
        channels_to_spectrum(&self.values)
    }

    fn eval_1(&self, _p: &Point3f) -> Float {
        channels_to_float(&self.values)
    }

    fn eval_6(&self, _p: &Point3f) -> [Float; 6] {
        channels_to_six(&self.values)
    }

    fn max(&self) -> Float {
        self.values.iter().fold(0.0, |a, &b| max(a, b))
    }

    fn min(&self) -> Float {
        self.values.iter().fold(INFINITY, |a, &b| min(a, b))
    }

    fn bbox(&self) -> Option<Bounds3f> {
        None
    }
}

/// Validates a channel count.
///
/// * `field`    - Parameter name, used in the error.
/// * `channels` - Channel count.
pub(crate) fn check_channels(field: &str, channels: usize) -> Result<()> {
    match channels {
        1 | 3 | 6 => Ok(()),
        _ => Err(Error::InvalidParameter {
            name: field.to_string(),
            reason: format!("expected 1, 3 or 6 channels, got {}", channels),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts() {
        assert!(ConstVolume::new(&[]).is_err());
        assert!(ConstVolume::new(&[1.0, 2.0]).is_err());

        let v = ConstVolume::new(&[0.5]).unwrap();
        assert_eq!(v.eval(&Point3f::ZERO), Spectrum::new(0.5));
        assert_eq!(v.eval_6(&Point3f::ZERO), [0.5, 0.5, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(v.max(), 0.5);
        assert_eq!(v.min(), 0.5);
        assert!(v.bbox().is_none());

        let v = ConstVolume::new(&[0.2, -1.0, 3.0]).unwrap();
        assert_eq!((v.min(), v.max()), (-1.0, 3.0));
    }

    #[test]
    fn from_params_spectrum_or_floats() {
        let mut ps = ParamSet::new();
        assert_eq!(ConstVolume::from_params(&ps).unwrap().channels(), 3);

        ps.add_float("value", &[1.0, 1.0, 1.0, 0.0, 0.5, 0.0]);
        let v = ConstVolume::from_params(&ps).unwrap();
        assert_eq!(v.channels(), 6);
        assert_eq!(v.eval_6(&Point3f::ZERO)[4], 0.5);
    }
}
