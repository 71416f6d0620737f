//! Parameter interpolation for warp tables.

use crate::error::*;
use crate::pbrt::*;

/// Most parameter dimensions a warp table supports.
pub const MAX_PARAM_DIMENSION: usize = 4;

const MAX_CORNERS: usize = 1 << MAX_PARAM_DIMENSION;

/// Node lists of the `D` extra parameters of a warp table. Slices are stored
/// with parameter 0 varying fastest.
#[derive(Clone, Debug)]
pub struct ParamGrid<const D: usize> {
    /// Node positions per parameter.
    values: [Vec<Float>; D],

    /// Slice index stride per parameter.
    strides: [usize; D],

    /// Total number of slices.
    slices: usize,
}

/// Slices and weights of the `2^D` grid corners surrounding a parameter
/// vector.
#[derive(Copy, Clone, Debug)]
pub struct ParamCorners {
    slices: [usize; MAX_CORNERS],
    weights: [Float; MAX_CORNERS],
    len: usize,
}

impl ParamCorners {
    /// Blends a per-slice quantity with the corner weights.
    ///
    /// * `f` - Returns the quantity for a slice.
    #[inline]
    pub fn blend<F: Fn(usize) -> Float>(&self, f: F) -> Float {
        let mut acc = 0.0;
        for c in 0..self.len {
            let w = self.weights[c];
            if w != 0.0 {
                acc += w * f(self.slices[c]);
            }
        }
        acc
    }
}

impl<const D: usize> ParamGrid<D> {
    /// Validates the node lists.
    ///
    /// * `values` - Strictly increasing nodes, at least one per parameter.
    pub fn new(values: [Vec<Float>; D]) -> Result<Self> {
        if D > MAX_PARAM_DIMENSION {
            return Err(Error::InvalidParameter {
                name: "param_values".to_string(),
                reason: format!("at most {} parameter dimensions are supported", MAX_PARAM_DIMENSION),
            });
        }

        let mut strides = [0; D];
        let mut slices = 1;
        for (dim, nodes) in values.iter().enumerate() {
            if nodes.is_empty() {
                return Err(Error::TooFewEntries {
                    field: "param_values",
                    min: 1,
                    actual: 0,
                });
            }
            check_increasing("param_values", nodes)?;
            strides[dim] = slices;
            slices *= nodes.len();
        }

        Ok(Self { values, strides, slices })
    }

    /// Total number of slices.
    pub fn slices(&self) -> usize {
        self.slices
    }

    /// Node positions of parameter `dim`.
    pub fn values(&self, dim: usize) -> &[Float] {
        &self.values[dim]
    }

    /// Finds the corners surrounding `param`. Values outside a node list
    /// clamp to its boundary.
    ///
    /// * `param` - Parameter vector.
    pub fn corners(&self, param: &[Float; D]) -> ParamCorners {
        let mut index = [0_usize; D];
        let mut weight = [0.0 as Float; D];
        for dim in 0..D {
            let nodes = &self.values[dim];
            if nodes.len() > 1 {
                let i = find_interval(nodes.len(), |j| nodes[j] <= param[dim]);
                let t = (param[dim] - nodes[i]) / (nodes[i + 1] - nodes[i]);
                index[dim] = i;
                weight[dim] = clamp(t, 0.0, 1.0);
            }
        }

        let mut corners = ParamCorners {
            slices: [0; MAX_CORNERS],
            weights: [0.0; MAX_CORNERS],
            len: 1 << D,
        };
        for c in 0..corners.len {
            let mut slice = 0;
            let mut w = 1.0;
            for dim in 0..D {
                let n = self.values[dim].len();
                if c & (1 << dim) != 0 {
                    slice += min(index[dim] + 1, n - 1) * self.strides[dim];
                    w *= weight[dim];
                } else {
                    slice += index[dim] * self.strides[dim];
                    w *= 1.0 - weight[dim];
                }
            }
            corners.slices[c] = slice;
            corners.weights[c] = w;
        }
        corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_parameters_is_one_slice() {
        let grid = ParamGrid::<0>::new([]).unwrap();
        assert_eq!(grid.slices(), 1);
        let c = grid.corners(&[]);
        assert_eq!(c.blend(|s| if s == 0 { 7.0 } else { 0.0 }), 7.0);
    }

    #[test]
    fn bilinear_blend_of_slices() {
        let grid = ParamGrid::<2>::new([vec![0.0, 1.0], vec![0.0, 2.0, 4.0]]).unwrap();
        assert_eq!(grid.slices(), 6);
        // Slice value = p0 + 10 * p1 at the nodes.
        let value = |s: usize| {
            let (i0, i1) = (s % 2, s / 2);
            grid.values(0)[i0] + 10.0 * grid.values(1)[i1]
        };
        let c = grid.corners(&[0.25, 3.0]);
        assert!((c.blend(value) - 30.25).abs() < 1e-5);
    }

    #[test]
    fn out_of_range_clamps() {
        let grid = ParamGrid::<1>::new([vec![1.0, 2.0, 3.0]]).unwrap();
        let value = |s: usize| s as Float;
        assert_eq!(grid.corners(&[-5.0]).blend(value), 0.0);
        assert_eq!(grid.corners(&[9.0]).blend(value), 2.0);
    }

    #[test]
    fn rejects_bad_nodes() {
        assert!(ParamGrid::<1>::new([vec![]]).is_err());
        assert!(ParamGrid::<1>::new([vec![1.0, 0.5]]).is_err());
    }
}
