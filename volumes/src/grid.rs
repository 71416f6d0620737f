//! Grid Volume

use crate::constant::check_channels;
use render_core::error::*;
use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::spectrum::*;
use render_core::volume::*;
use std::str::FromStr;

/// Reconstruction filter of a `GridVolume`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Interpolate the 8 surrounding samples.
    #[default]
    Trilinear,

    /// Use the sample of the containing voxel.
    Nearest,
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trilinear" => Ok(Self::Trilinear),
            "nearest" => Ok(Self::Nearest),
            _ => Err(Error::UnknownVariant {
                kind: "filter type",
                name: s.to_string(),
            }),
        }
    }
}

/// Implements values at a regular 3D grid of positions spanning a bounding
/// box. Samples sit at voxel centers and lookups outside the grid clamp to
/// its boundary.
#[derive(Clone, Debug)]
pub struct GridVolume {
    /// World space region covered by the grid.
    bbox: Bounds3f,

    /// Grid size in x, y and z.
    res: [usize; 3],

    /// Channels per sample.
    channels: usize,

    /// Sample values, x fastest, channels interleaved.
    data: Vec<Float>,

    /// Reconstruction filter.
    filter: FilterMode,

    /// Largest sample value.
    max: Float,

    /// Smallest sample value.
    min: Float,
}

impl GridVolume {
    /// Create a new `GridVolume`.
    ///
    /// * `bbox`     - World space region covered by the grid.
    /// * `res`      - Grid size in x, y and z.
    /// * `channels` - Channels per sample (1, 3 or 6).
    /// * `data`     - `res[0] * res[1] * res[2] * channels` finite values.
    /// * `filter`   - Reconstruction filter.
    pub fn new(bbox: Bounds3f, res: [usize; 3], channels: usize, data: Vec<Float>, filter: FilterMode) -> Result<Self> {
        check_channels("channels", channels)?;
        if res.iter().any(|&r| r == 0) {
            return Err(Error::TooFewEntries {
                field: "resolution",
                min: 1,
                actual: 0,
            });
        }
        let expected = res[0] * res[1] * res[2] * channels;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                field: "values",
                expected,
                actual: data.len(),
            });
        }
        if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::NonFiniteEntry {
                field: "values",
                index,
                value,
            });
        }

        let max = data.iter().fold(0.0, |a, &b| max(a, b));
        let min = data.iter().fold(INFINITY, |a, &b| min(a, b));
        debug!(
            "GridVolume {}x{}x{}x{} over {}, range [{}, {}]",
            res[0], res[1], res[2], channels, bbox, min, max
        );

        Ok(Self {
            bbox,
            res,
            channels,
            data,
            filter,
            max,
            min,
        })
    }

    /// Create from parameters: `resolution` (3 ints), `channels` (default 1),
    /// `values`, `p_min`/`p_max` (default unit cube) and `filter_type`
    /// (`trilinear` or `nearest`).
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let res = params.find_int("resolution");
        if res.len() != 3 {
            return Err(Error::InvalidParameter {
                name: String::from("resolution"),
                reason: format!("expected 3 values, got {}", res.len()),
            });
        }
        if res.iter().any(|&r| r < 1) {
            return Err(Error::InvalidParameter {
                name: String::from("resolution"),
                reason: String::from("entries must be positive"),
            });
        }
        let channels = params.find_one_int("channels", 1);
        let values = params.find_float("values");
        if values.is_empty() {
            return Err(Error::MissingParameter(String::from("values")));
        }

        let p_min = params.find_one_vector3f("p_min", Vector3f::ZERO);
        let p_max = params.find_one_vector3f("p_max", Vector3f::new(1.0, 1.0, 1.0));
        let filter = params.find_one_string("filter_type", String::from("trilinear")).parse()?;

        Self::new(
            Bounds3f::new(Point3f::from(p_min), Point3f::from(p_max)),
            [res[0] as usize, res[1] as usize, res[2] as usize],
            max(channels, 0) as usize,
            values,
            filter,
        )
    }

    /// Grid size in x, y and z.
    pub fn resolution(&self) -> [usize; 3] {
        self.res
    }

    /// Returns the sample values of voxel `(x, y, z)`.
    fn voxel(&self, x: usize, y: usize, z: usize) -> &[Float] {
        let i = ((z * self.res[1] + y) * self.res[0] + x) * self.channels;
        &self.data[i..i + self.channels]
    }

    /// Reconstructs all channels at `p` into `out`.
    fn lookup(&self, p: &Point3f, out: &mut [Float; 6]) {
        let local = self.bbox.offset(p);
        let c = self.channels;
        match self.filter {
            FilterMode::Nearest => {
                let idx = |axis: usize| {
                    let v = (local[axis] * self.res[axis] as Float).floor();
                    clamp(v, 0.0, (self.res[axis] - 1) as Float) as usize
                };
                out[..c].copy_from_slice(self.voxel(idx(0), idx(1), idx(2)));
            }
            FilterMode::Trilinear => {
                // Voxel coordinates and offsets; samples sit at voxel centers.
                let mut i0 = [0_usize; 3];
                let mut i1 = [0_usize; 3];
                let mut d = [0.0 as Float; 3];
                for axis in 0..3 {
                    let n = self.res[axis];
                    let s = clamp(local[axis] * n as Float - 0.5, 0.0, (n - 1) as Float);
                    let f = s.floor();
                    i0[axis] = f as usize;
                    i1[axis] = min(i0[axis] + 1, n - 1);
                    d[axis] = s - f;
                }

                out[..c].iter_mut().for_each(|v| *v = 0.0);
                for corner in 0..8 {
                    let pick = |axis: usize| corner & (1 << axis) != 0;
                    let mut w = 1.0;
                    let mut idx = [0_usize; 3];
                    for axis in 0..3 {
                        if pick(axis) {
                            w *= d[axis];
                            idx[axis] = i1[axis];
                        } else {
                            w *= 1.0 - d[axis];
                            idx[axis] = i0[axis];
                        }
                    }
                    if w == 0.0 {
                        continue;
                    }
                    for (o, v) in out[..c].iter_mut().zip(self.voxel(idx[0], idx[1], idx[2])) {
                        *o += w * v;
                    }
                }
            }
        }
    }
}

impl Volume for GridVolume {
    fn channels(&self) -> usize {
        self.channels
    }

    fn eval(&self, p: &Point3f) -> Spectrum {
        let mut out = [0.0; 6];
        self.lookup(p, &mut out);
        channels_to_spectrum(&out[..self.channels])
    }

    fn eval_1(&self, p: &Point3f) -> Float {
        let mut out = [0.0; 6];
        self.lookup(p, &mut out);
        channels_to_float(&out[..self.channels])
    }

    fn eval_6(&self, p: &Point3f) -> [Float; 6] {
        let mut out = [0.0; 6];
        self.lookup(p, &mut out);
        channels_to_six(&out[..self.channels])
    }

    fn max(&self) -> Float {
        self.max
    }

    fn min(&self) -> Float {
        self.min
    }

    fn bbox(&self) -> Option<Bounds3f> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn ramp(filter: FilterMode) -> GridVolume {
        GridVolume::new(Bounds3f::unit(), [2, 1, 1], 1, vec![1.0, 3.0], filter).unwrap()
    }

    #[test]
    fn validates_input() {
        let b = Bounds3f::unit();
        assert!(GridVolume::new(b, [2, 1, 1], 1, vec![1.0], FilterMode::Nearest).is_err());
        assert!(GridVolume::new(b, [1, 1, 1], 2, vec![1.0, 1.0], FilterMode::Nearest).is_err());
        assert!(GridVolume::new(b, [0, 1, 1], 1, vec![], FilterMode::Nearest).is_err());
        assert!(GridVolume::new(b, [1, 1, 1], 1, vec![Float::NAN], FilterMode::Nearest).is_err());
    }

    #[test]
    fn trilinear_between_centers() {
        let g = ramp(FilterMode::Trilinear);
        assert!(approx_eq!(Float, g.eval_1(&Point3f::new(0.25, 0.5, 0.5)), 1.0));
        assert!(approx_eq!(Float, g.eval_1(&Point3f::new(0.5, 0.5, 0.5)), 2.0));
        assert!(approx_eq!(Float, g.eval_1(&Point3f::new(0.625, 0.1, 0.9)), 2.5));
        assert_eq!(g.max(), 3.0);
        assert_eq!(g.min(), 1.0);
    }

    #[test]
    fn signed_values_keep_their_range() {
        // Off-diagonal SGGX entries may be negative.
        let data = vec![1.0, 1.0, 1.0, -0.5, 0.25, 0.0];
        let g = GridVolume::new(Bounds3f::unit(), [1, 1, 1], 6, data, FilterMode::Trilinear).unwrap();
        assert_eq!(g.min(), -0.5);
        assert_eq!(g.max(), 1.0);
    }

    #[test]
    fn clamps_outside_the_grid() {
        let g = ramp(FilterMode::Trilinear);
        assert!(approx_eq!(Float, g.eval_1(&Point3f::new(-4.0, 0.5, 0.5)), 1.0));
        assert!(approx_eq!(Float, g.eval_1(&Point3f::new(0.95, 7.0, 0.5)), 3.0));
    }

    #[test]
    fn nearest_picks_containing_voxel() {
        let g = ramp(FilterMode::Nearest);
        assert_eq!(g.eval_1(&Point3f::new(0.49, 0.5, 0.5)), 1.0);
        assert_eq!(g.eval_1(&Point3f::new(0.51, 0.5, 0.5)), 3.0);
        assert_eq!(g.eval_1(&Point3f::new(1.5, 0.5, 0.5)), 3.0);
    }

    #[test]
    fn trilinear_interpolates_3d() {
        // value = x + 2y + 4z at the corners of a 2x2x2 grid.
        let data: Vec<Float> = (0..8).map(|i| i as Float).collect();
        let g = GridVolume::new(Bounds3f::unit(), [2, 2, 2], 1, data, FilterMode::Trilinear).unwrap();
        let v = g.eval_1(&Point3f::new(0.5, 0.5, 0.5));
        assert!(approx_eq!(Float, v, 3.5, epsilon = 1e-6));
        let v = g.eval_1(&Point3f::new(0.75, 0.25, 0.5));
        assert!(approx_eq!(Float, v, 1.0 + 0.0 + 2.0, epsilon = 1e-6));
    }

    #[test]
    fn multichannel_grid() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let g = GridVolume::new(Bounds3f::unit(), [1, 1, 1], 6, data, FilterMode::Nearest).unwrap();
        assert_eq!(g.eval_6(&Point3f::ZERO), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(g.eval(&Point3f::ZERO), Spectrum::from_rgb(1.0, 2.0, 3.0));
        assert!(approx_eq!(Float, g.eval_1(&Point3f::ZERO), 3.5));
    }

    #[test]
    fn from_params() {
        let mut ps = ParamSet::new();
        ps.add_int("resolution", &[2, 1, 1]);
        ps.add_float("values", &[1.0, 3.0]);
        ps.add_string("filter_type", &[String::from("nearest")]);
        ps.add_vector3f("p_max", &[Vector3f::new(2.0, 1.0, 1.0)]);
        let g = GridVolume::from_params(&ps).unwrap();
        assert_eq!(g.resolution(), [2, 1, 1]);
        assert_eq!(g.eval_1(&Point3f::new(1.5, 0.5, 0.5)), 3.0);

        ps.add_string("filter_type", &[String::from("cubic")]);
        assert!(GridVolume::from_params(&ps).is_err());
    }
}
