//! Marginal/conditional 2D warp table.

use super::continuous::{invert_linear_segment, linear_segment_mass};
use super::params::*;
use crate::error::*;
use crate::geometry::*;
use crate::pbrt::*;

/// Importance sampling for a 2D function on `[0, 1]^2` through an explicit
/// marginal CDF over rows and conditional CDFs within each row, optionally
/// varying with `D` interpolated parameters.
///
/// The continuous variant treats the `width × height` values as nodes of a
/// bilinear interpolant and integrates it exactly (trapezoid rule); the
/// discrete variant treats each value as a constant texel.
#[derive(Clone, Debug)]
pub struct Marginal2D<const D: usize, const CONTINUOUS: bool> {
    /// Value count `[width, height]`.
    size: [usize; 2],

    /// Parameter node lists.
    params: ParamGrid<D>,

    /// Function values, `slices × height × width`.
    data: Vec<Float>,

    /// Conditional CDF of each row (unnormalized, leading 0).
    conditional: Vec<Float>,

    /// Marginal CDF over rows (unnormalized, leading 0).
    marginal: Vec<Float>,
}

/// Marginal table over a bilinear interpolant.
pub type ContinuousMarginal2D<const D: usize> = Marginal2D<D, true>;

/// Marginal table over piecewise-constant texels.
pub type DiscreteMarginal2D<const D: usize> = Marginal2D<D, false>;

impl<const D: usize, const CONTINUOUS: bool> Marginal2D<D, CONTINUOUS> {
    /// Number of conditional CDF entries per row.
    const fn cond_width(w: usize) -> usize {
        if CONTINUOUS {
            w
        } else {
            w + 1
        }
    }

    /// Number of marginal CDF entries.
    const fn marg_len(h: usize) -> usize {
        if CONTINUOUS {
            h
        } else {
            h + 1
        }
    }

    /// Builds the table.
    ///
    /// * `size`         - Value count `[width, height]`; at least 2 each for
    ///                    the continuous variant, 1 for the discrete one.
    /// * `param_values` - Node positions of each extra parameter.
    /// * `data`         - Non-negative values laid out as
    ///                    `data[((slice * height) + y) * width + x]`.
    /// * `normalize`    - Scale each slice so it integrates to 1.
    pub fn new(size: [usize; 2], param_values: [Vec<Float>; D], data: &[Float], normalize: bool) -> Result<Self> {
        let [w, h] = size;
        let min_size = if CONTINUOUS { 2 } else { 1 };
        if w < min_size || h < min_size {
            return Err(Error::TooFewEntries {
                field: "size",
                min: min_size,
                actual: min(w, h),
            });
        }

        let params = ParamGrid::new(param_values)?;
        let slices = params.slices();
        if data.len() != slices * w * h {
            return Err(Error::SizeMismatch {
                field: "data",
                expected: slices * w * h,
                actual: data.len(),
            });
        }
        check_non_negative("data", data)?;

        let cw = Self::cond_width(w);
        let ml = Self::marg_len(h);
        let mut table = Self {
            size,
            params,
            data: data.to_vec(),
            conditional: vec![0.0; slices * h * cw],
            marginal: vec![0.0; slices * ml],
        };

        for slice in 0..slices {
            table.build_slice(slice);
            if normalize {
                table.normalize_slice(slice);
            }
        }

        debug!(
            "Marginal2D ({}): {}x{} values, {} slices",
            if CONTINUOUS { "continuous" } else { "discrete" },
            w,
            h,
            slices
        );
        Ok(table)
    }

    /// Computes the conditional and marginal CDFs of a slice.
    fn build_slice(&mut self, slice: usize) {
        let [w, h] = self.size;
        let cw = Self::cond_width(w);
        let ml = Self::marg_len(h);
        let values = &self.data[slice * w * h..(slice + 1) * w * h];

        let mut row_integrals = Vec::with_capacity(h);
        for y in 0..h {
            let row = &values[y * w..(y + 1) * w];
            let cond = &mut self.conditional[(slice * h + y) * cw..(slice * h + y + 1) * cw];
            let mut acc = 0.0_f64;
            cond[0] = 0.0;
            if CONTINUOUS {
                for x in 0..w - 1 {
                    acc += 0.5 * (row[x] as f64 + row[x + 1] as f64);
                    cond[x + 1] = acc as Float;
                }
            } else {
                for x in 0..w {
                    acc += row[x] as f64;
                    cond[x + 1] = acc as Float;
                }
            }
            row_integrals.push(acc);
        }

        let marg = &mut self.marginal[slice * ml..(slice + 1) * ml];
        let mut acc = 0.0_f64;
        marg[0] = 0.0;
        if CONTINUOUS {
            for y in 0..h - 1 {
                acc += 0.5 * (row_integrals[y] + row_integrals[y + 1]);
                marg[y + 1] = acc as Float;
            }
        } else {
            for y in 0..h {
                acc += row_integrals[y];
                marg[y + 1] = acc as Float;
            }
        }
    }

    /// Rescales a slice so its integral over `[0, 1]^2` is 1.
    fn normalize_slice(&mut self, slice: usize) {
        let [w, h] = self.size;
        let cw = Self::cond_width(w);
        let ml = Self::marg_len(h);

        let total = self.marginal[(slice + 1) * ml - 1];
        let cells = if CONTINUOUS { (w - 1) * (h - 1) } else { w * h };
        if !(total > 0.0) {
            warn!("Marginal2D: slice {} integrates to zero", slice);
            return;
        }

        let scale = cells as Float / total;
        let ranges = [
            (&mut self.data, slice * w * h..(slice + 1) * w * h),
            (&mut self.conditional, slice * h * cw..(slice + 1) * h * cw),
            (&mut self.marginal, slice * ml..(slice + 1) * ml),
        ];
        for (values, range) in ranges {
            values[range].iter_mut().for_each(|v| *v *= scale);
        }
    }

    /// Value count `[width, height]`.
    pub fn size(&self) -> [usize; 2] {
        self.size
    }

    #[inline]
    fn value(&self, corners: &ParamCorners, x: usize, y: usize) -> Float {
        let [w, h] = self.size;
        corners.blend(|s| self.data[(s * h + y) * w + x])
    }

    #[inline]
    fn cond(&self, corners: &ParamCorners, x: usize, y: usize) -> Float {
        let [w, h] = self.size;
        let cw = Self::cond_width(w);
        corners.blend(|s| self.conditional[(s * h + y) * cw + x])
    }

    #[inline]
    fn marg(&self, corners: &ParamCorners, y: usize) -> Float {
        let ml = Self::marg_len(self.size[1]);
        corners.blend(|s| self.marginal[s * ml + y])
    }

    /// Splits one coordinate of `pos` into a cell index and fraction.
    #[inline]
    fn locate(&self, v: Float, n: usize) -> (usize, Float) {
        let cells = if CONTINUOUS { n - 1 } else { n };
        let p = clamp(v, 0.0, 1.0) * cells as Float;
        let i = min(p as usize, cells - 1);
        (i, p - i as Float)
    }

    /// Warps a uniform sample to a position distributed according to the
    /// table (interpolated at `param`). Returns the position and the table
    /// value there, which is the density when the table was normalized.
    ///
    /// * `sample` - Uniform sample in [0, 1)^2.
    /// * `param`  - Parameter vector.
    /// * `active` - Inactive calls return zeros.
    pub fn sample(&self, sample: &Point2f, param: &[Float; D], active: bool) -> (Point2f, Float) {
        if !active {
            return (Point2f::zero(), 0.0);
        }
        let [w, h] = self.size;
        let corners = self.params.corners(param);
        let ml = Self::marg_len(h);
        let cw = Self::cond_width(w);

        // Row.
        let target = sample.y * self.marg(&corners, ml - 1);
        let y = find_interval(ml, |i| self.marg(&corners, i) <= target);
        let ty = if CONTINUOUS {
            let r0 = self.cond(&corners, cw - 1, y);
            let r1 = self.cond(&corners, cw - 1, y + 1);
            invert_linear_segment(r0, r1, target - self.marg(&corners, y))
        } else {
            let mass = self.marg(&corners, y + 1) - self.marg(&corners, y);
            clamp(safe_div(target - self.marg(&corners, y), mass), 0.0, 1.0)
        };

        // Column within the (interpolated) row.
        let row_cond = |x: usize| {
            if CONTINUOUS {
                lerp(ty, self.cond(&corners, x, y), self.cond(&corners, x, y + 1))
            } else {
                self.cond(&corners, x, y)
            }
        };
        let target = sample.x * row_cond(cw - 1);
        let x = find_interval(cw, |i| row_cond(i) <= target);

        if CONTINUOUS {
            let v0 = lerp(ty, self.value(&corners, x, y), self.value(&corners, x, y + 1));
            let v1 = lerp(ty, self.value(&corners, x + 1, y), self.value(&corners, x + 1, y + 1));
            let tx = invert_linear_segment(v0, v1, target - row_cond(x));
            let pos = Point2f::new(
                (x as Float + tx) / (w - 1) as Float,
                (y as Float + ty) / (h - 1) as Float,
            );
            (pos, lerp(tx, v0, v1))
        } else {
            let value = self.value(&corners, x, y);
            let tx = clamp(safe_div(target - row_cond(x), value), 0.0, 1.0);
            let pos = Point2f::new((x as Float + tx) / w as Float, (y as Float + ty) / h as Float);
            (pos, value)
        }
    }

    /// Recovers the uniform sample that `sample()` maps to `pos`. Returns it
    /// with the table value at `pos`.
    ///
    /// * `pos`    - Position in [0, 1]^2.
    /// * `param`  - Parameter vector.
    /// * `active` - Inactive calls return zeros.
    pub fn invert(&self, pos: &Point2f, param: &[Float; D], active: bool) -> (Point2f, Float) {
        if !active {
            return (Point2f::zero(), 0.0);
        }
        let [w, h] = self.size;
        let corners = self.params.corners(param);
        let ml = Self::marg_len(h);
        let cw = Self::cond_width(w);

        let (x, tx) = self.locate(pos.x, w);
        let (y, ty) = self.locate(pos.y, h);

        let (ux, uy, value) = if CONTINUOUS {
            let row_cond = |i: usize| lerp(ty, self.cond(&corners, i, y), self.cond(&corners, i, y + 1));
            let v0 = lerp(ty, self.value(&corners, x, y), self.value(&corners, x, y + 1));
            let v1 = lerp(ty, self.value(&corners, x + 1, y), self.value(&corners, x + 1, y + 1));
            let ux = safe_div(row_cond(x) + linear_segment_mass(v0, v1, tx), row_cond(cw - 1));

            let r0 = self.cond(&corners, cw - 1, y);
            let r1 = self.cond(&corners, cw - 1, y + 1);
            let uy = safe_div(
                self.marg(&corners, y) + linear_segment_mass(r0, r1, ty),
                self.marg(&corners, ml - 1),
            );
            (ux, uy, lerp(tx, v0, v1))
        } else {
            let value = self.value(&corners, x, y);
            let ux = safe_div(self.cond(&corners, x, y) + tx * value, self.cond(&corners, cw - 1, y));
            let m0 = self.marg(&corners, y);
            let m1 = self.marg(&corners, y + 1);
            let uy = safe_div(m0 + ty * (m1 - m0), self.marg(&corners, ml - 1));
            (ux, uy, value)
        };

        (Point2f::new(ux, uy), value)
    }

    /// Table value at `pos`; the density when the table was normalized.
    ///
    /// * `pos`    - Position in [0, 1]^2.
    /// * `param`  - Parameter vector.
    /// * `active` - Inactive calls return zero.
    pub fn eval(&self, pos: &Point2f, param: &[Float; D], active: bool) -> Float {
        if !active || !(0.0..=1.0).contains(&pos.x) || !(0.0..=1.0).contains(&pos.y) {
            return 0.0;
        }
        let [w, h] = self.size;
        let corners = self.params.corners(param);
        let (x, tx) = self.locate(pos.x, w);
        let (y, ty) = self.locate(pos.y, h);
        if CONTINUOUS {
            let v0 = lerp(ty, self.value(&corners, x, y), self.value(&corners, x, y + 1));
            let v1 = lerp(ty, self.value(&corners, x + 1, y), self.value(&corners, x + 1, y + 1));
            lerp(tx, v0, v1)
        } else {
            self.value(&corners, x, y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    prop_point2!(unit_square, Float, 0.0f32..1.0f32, 0.0f32..1.0f32);

    fn bumpy_data(w: usize, h: usize, slices: usize) -> Vec<Float> {
        (0..slices * w * h)
            .map(|i| {
                let (x, y, s) = (i % w, (i / w) % h, i / (w * h));
                0.5 + ((x * 7 + y * 3 + s * 5) % 5) as Float
            })
            .collect()
    }

    #[test]
    fn constant_tables_are_identity() {
        let c = ContinuousMarginal2D::<0>::new([4, 3], [], &[3.0; 12], true).unwrap();
        let d = DiscreteMarginal2D::<0>::new([4, 3], [], &[3.0; 12], true).unwrap();
        let u = Point2f::new(0.3, 0.6);
        for (p, pdf) in [c.sample(&u, &[], true), d.sample(&u, &[], true)] {
            assert!(p.max_abs_diff(&u) < 1e-5, "{}", p);
            assert!(approx_eq!(f32, pdf, 1.0, epsilon = 1e-5));
        }
    }

    #[test]
    fn discrete_texel_probabilities() {
        // Masses 1 and 3 side by side: the right texel gets 3/4 of samples.
        let d = DiscreteMarginal2D::<0>::new([2, 1], [], &[1.0, 3.0], true).unwrap();
        let (p, pdf) = d.sample(&Point2f::new(0.2, 0.5), &[], true);
        assert!(p.x < 0.5);
        assert!(approx_eq!(f32, pdf, 0.5, epsilon = 1e-6));
        let (p, pdf) = d.sample(&Point2f::new(0.3, 0.5), &[], true);
        assert!(p.x >= 0.5);
        assert!(approx_eq!(f32, pdf, 1.5, epsilon = 1e-6));
    }

    #[test]
    fn normalized_density_integrates_to_one() {
        let c = ContinuousMarginal2D::<0>::new([6, 4], [], &bumpy_data(6, 4, 1), true).unwrap();
        let n = 96;
        let mut sum = 0.0;
        for i in 0..n {
            for j in 0..n {
                let p = Point2f::new((i as Float + 0.5) / n as Float, (j as Float + 0.5) / n as Float);
                sum += c.eval(&p, &[], true);
            }
        }
        assert!(approx_eq!(f32, sum / (n * n) as Float, 1.0, epsilon = 1e-3));
    }

    #[test]
    fn inactive_and_errors() {
        let c = ContinuousMarginal2D::<0>::new([2, 2], [], &[1.0; 4], true).unwrap();
        assert_eq!(c.sample(&Point2f::new(0.5, 0.5), &[], false), (Point2f::zero(), 0.0));
        assert_eq!(c.eval(&Point2f::new(0.5, 0.5), &[], false), 0.0);
        assert!(ContinuousMarginal2D::<0>::new([1, 2], [], &[1.0; 2], true).is_err());
        assert!(DiscreteMarginal2D::<0>::new([1, 2], [], &[1.0; 2], true).is_ok());
        assert!(DiscreteMarginal2D::<1>::new([2, 2], [vec![0.0, 1.0]], &[1.0; 4], true).is_err());
    }

    proptest! {
        #[test]
        fn continuous_round_trip(u in unit_square(), p in 0.0f32..2.0f32) {
            let t = ContinuousMarginal2D::<1>::new([5, 6], [vec![0.0, 1.0, 2.0]], &bumpy_data(5, 6, 3), true).unwrap();
            let (pos, pdf) = t.sample(&u, &[p], true);
            let (back, pdf_inv) = t.invert(&pos, &[p], true);
            prop_assert!(back.max_abs_diff(&u) < 2e-3, "{} -> {} -> {}", u, pos, back);
            prop_assert!((pdf - pdf_inv).abs() < 1e-3 * pdf.max(1.0));
        }

        #[test]
        fn discrete_round_trip(u in unit_square()) {
            let t = DiscreteMarginal2D::<0>::new([7, 3], [], &bumpy_data(7, 3, 1), true).unwrap();
            let (pos, _) = t.sample(&u, &[], true);
            let (back, _) = t.invert(&pos, &[], true);
            prop_assert!(back.max_abs_diff(&u) < 1e-4, "{} -> {} -> {}", u, pos, back);
        }

        #[test]
        fn continuous_invert_then_sample(pos in unit_square()) {
            let t = ContinuousMarginal2D::<0>::new([5, 4], [], &bumpy_data(5, 4, 1), false).unwrap();
            let (u, _) = t.invert(&pos, &[], true);
            let (back, value) = t.sample(&u, &[], true);
            prop_assert!(back.max_abs_diff(&pos) < 2e-3, "{} -> {} -> {}", pos, u, back);
            prop_assert!((value - t.eval(&pos, &[], true)).abs() < 1e-2);
        }
    }
}
