//! Hierarchical 2D warp table.

use super::params::*;
use super::warp::*;
use crate::error::*;
use crate::geometry::*;
use crate::pbrt::*;

/// One level of the patch-integral pyramid: `size × size` entries per slice.
#[derive(Clone, Debug)]
struct Level {
    size: usize,
    data: Vec<Float>,
}

impl Level {
    #[inline]
    fn index(&self, slice: usize, x: usize, y: usize) -> usize {
        (slice * self.size + y) * self.size + x
    }

    #[inline]
    fn lookup(&self, corners: &ParamCorners, x: usize, y: usize) -> Float {
        corners.blend(|s| self.data[self.index(s, x, y)])
    }
}

/// Importance sampling for a bilinearly interpolated 2D function on
/// `[0, 1]^2`, optionally varying with `D` interpolated parameters.
///
/// The function is given at `width × height` nodes; each cell between four
/// nodes is a bilinear patch. Sampling first picks a patch by descending a
/// pyramid of patch integrals (a quadtree with power-of-two levels) and then
/// warps the remaining sample inside the patch with `square_to_bilinear()`.
/// Without a pyramid the patch is picked with a linear marginal/conditional
/// scan instead.
#[derive(Clone, Debug)]
pub struct Hierarchical2D<const D: usize> {
    /// Node count `[width, height]`.
    size: [usize; 2],

    /// Parameter node lists.
    params: ParamGrid<D>,

    /// Function values, `slices × height × width`.
    data: Vec<Float>,

    /// Patch-integral pyramid, finest first; empty without a hierarchy.
    levels: Vec<Level>,
}

impl<const D: usize> Hierarchical2D<D> {
    /// Builds the table.
    ///
    /// * `size`            - Node count `[width, height]`; both at least 2.
    /// * `param_values`    - Node positions of each extra parameter.
    /// * `data`            - Non-negative values laid out as
    ///                       `data[((slice * height) + y) * width + x]`, with
    ///                       parameter 0 varying fastest across slices.
    /// * `build_hierarchy` - Precompute the patch-integral pyramid.
    /// * `normalize`       - Scale each slice so it integrates to 1.
    pub fn new(
        size: [usize; 2],
        param_values: [Vec<Float>; D],
        data: &[Float],
        build_hierarchy: bool,
        normalize: bool,
    ) -> Result<Self> {
        let [w, h] = size;
        if w < 2 || h < 2 {
            return Err(Error::TooFewEntries {
                field: "size",
                min: 2,
                actual: min(w, h),
            });
        }

        let params = ParamGrid::new(param_values)?;
        let slices = params.slices();
        let slice_size = w * h;
        if data.len() != slices * slice_size {
            return Err(Error::SizeMismatch {
                field: "data",
                expected: slices * slice_size,
                actual: data.len(),
            });
        }
        check_non_negative("data", data)?;

        let mut table = Self {
            size,
            params,
            data: data.to_vec(),
            levels: Vec::new(),
        };

        if normalize {
            for slice in 0..slices {
                let integral = table.slice_integral(slice);
                let values = &mut table.data[slice * slice_size..(slice + 1) * slice_size];
                if integral > 0.0 {
                    let scale = 1.0 / integral;
                    values.iter_mut().for_each(|v| *v *= scale);
                } else {
                    warn!("Hierarchical2D: slice {} integrates to zero", slice);
                }
            }
        }

        if build_hierarchy {
            table.build_levels();
        }

        debug!(
            "Hierarchical2D: {}x{} nodes, {} slices, {} levels",
            w,
            h,
            slices,
            table.levels.len()
        );
        Ok(table)
    }

    /// Integral of a slice over `[0, 1]^2`.
    fn slice_integral(&self, slice: usize) -> Float {
        let [w, h] = self.size;
        let mut sum = 0.0_f64;
        for y in 0..h - 1 {
            for x in 0..w - 1 {
                sum += self.patch_integral_raw(slice, x, y) as f64;
            }
        }
        (sum / ((w - 1) * (h - 1)) as f64) as Float
    }

    #[inline]
    fn value_raw(&self, slice: usize, x: usize, y: usize) -> Float {
        let [w, h] = self.size;
        self.data[(slice * h + y) * w + x]
    }

    #[inline]
    fn patch_integral_raw(&self, slice: usize, x: usize, y: usize) -> Float {
        0.25 * (self.value_raw(slice, x, y)
            + self.value_raw(slice, x + 1, y)
            + self.value_raw(slice, x, y + 1)
            + self.value_raw(slice, x + 1, y + 1))
    }

    fn build_levels(&mut self) {
        let [w, h] = self.size;
        let slices = self.params.slices();
        let mut size = round_up_pow2(max(w - 1, h - 1));

        // Finest level: patch integrals, zero-padded to a power of two.
        let mut finest = Level {
            size,
            data: vec![0.0; slices * size * size],
        };
        for slice in 0..slices {
            for y in 0..h - 1 {
                for x in 0..w - 1 {
                    let i = finest.index(slice, x, y);
                    finest.data[i] = self.patch_integral_raw(slice, x, y);
                }
            }
        }
        self.levels.push(finest);

        while size > 1 {
            let prev = &self.levels[self.levels.len() - 1];
            size /= 2;
            let mut level = Level {
                size,
                data: vec![0.0; slices * size * size],
            };
            for slice in 0..slices {
                for y in 0..size {
                    for x in 0..size {
                        let i = level.index(slice, x, y);
                        level.data[i] = prev.data[prev.index(slice, 2 * x, 2 * y)]
                            + prev.data[prev.index(slice, 2 * x + 1, 2 * y)]
                            + prev.data[prev.index(slice, 2 * x, 2 * y + 1)]
                            + prev.data[prev.index(slice, 2 * x + 1, 2 * y + 1)];
                    }
                }
            }
            self.levels.push(level);
        }
    }

    /// Node count `[width, height]`.
    pub fn size(&self) -> [usize; 2] {
        self.size
    }

    /// Returns `true` if the patch-integral pyramid was built.
    pub fn has_hierarchy(&self) -> bool {
        !self.levels.is_empty()
    }

    #[inline]
    fn value(&self, corners: &ParamCorners, x: usize, y: usize) -> Float {
        corners.blend(|s| self.value_raw(s, x, y))
    }

    #[inline]
    fn patch_corners(&self, corners: &ParamCorners, x: usize, y: usize) -> [Float; 4] {
        [
            self.value(corners, x, y),
            self.value(corners, x + 1, y),
            self.value(corners, x, y + 1),
            self.value(corners, x + 1, y + 1),
        ]
    }

    #[inline]
    fn patch_integral(&self, corners: &ParamCorners, x: usize, y: usize) -> Float {
        let [v00, v10, v01, v11] = self.patch_corners(corners, x, y);
        0.25 * (v00 + v10 + v01 + v11)
    }

    /// Splits `pos` into a patch index and the position inside the patch.
    fn locate(&self, pos: &Point2f) -> ((usize, usize), Point2f) {
        let [w, h] = self.size;
        let px = clamp(pos.x, 0.0, 1.0) * (w - 1) as Float;
        let py = clamp(pos.y, 0.0, 1.0) * (h - 1) as Float;
        let ix = min(px as usize, w - 2);
        let iy = min(py as usize, h - 2);
        ((ix, iy), Point2f::new(px - ix as Float, py - iy as Float))
    }

    /// Row integrals of the patch grid, used without a pyramid.
    fn row_integrals(&self, corners: &ParamCorners) -> Vec<Float> {
        let [w, h] = self.size;
        (0..h - 1)
            .map(|y| (0..w - 1).map(|x| self.patch_integral(corners, x, y)).sum())
            .collect()
    }

    /// Selects a patch and returns it with the rescaled sample.
    fn select_patch(&self, corners: &ParamCorners, mut u: Point2f) -> ((usize, usize), Point2f) {
        if self.levels.is_empty() {
            let [w, _] = self.size;
            let rows = self.row_integrals(corners);
            let y = scan_select(&rows, &mut u.y);
            let cols: Vec<Float> = (0..w - 1).map(|x| self.patch_integral(corners, x, y)).collect();
            let x = scan_select(&cols, &mut u.x);
            return ((x, y), u);
        }

        let (mut x, mut y) = (0, 0);
        for level in self.levels.iter().rev().skip(1) {
            x *= 2;
            y *= 2;

            let v00 = level.lookup(corners, x, y);
            let v10 = level.lookup(corners, x + 1, y);
            let v01 = level.lookup(corners, x, y + 1);
            let v11 = level.lookup(corners, x + 1, y + 1);

            let (c0, c1) = if choose_upper(v00 + v10, v01 + v11, &mut u.y) {
                y += 1;
                (v01, v11)
            } else {
                (v00, v10)
            };
            if choose_upper(c0, c1, &mut u.x) {
                x += 1;
            }
        }
        ((x, y), u)
    }

    /// Inverse of `select_patch()`.
    fn unselect_patch(&self, corners: &ParamCorners, patch: (usize, usize), mut u: Point2f) -> Point2f {
        let (mut x, mut y) = patch;
        if self.levels.is_empty() {
            let [w, _] = self.size;
            let cols: Vec<Float> = (0..w - 1).map(|i| self.patch_integral(corners, i, y)).collect();
            u.x = scan_unselect(&cols, x, u.x);
            let rows = self.row_integrals(corners);
            u.y = scan_unselect(&rows, y, u.y);
            return u;
        }

        for level in self.levels.iter().take(self.levels.len() - 1) {
            let (bx, by) = (x & 1, y & 1);
            let (x0, y0) = (x - bx, y - by);

            let v00 = level.lookup(corners, x0, y0);
            let v10 = level.lookup(corners, x0 + 1, y0);
            let v01 = level.lookup(corners, x0, y0 + 1);
            let v11 = level.lookup(corners, x0 + 1, y0 + 1);

            // Undo the column choice first; it was made last.
            let (c0, c1) = if by == 1 { (v01, v11) } else { (v00, v10) };
            u.x = unchoose(c0, c1, bx == 1, u.x);
            u.y = unchoose(v00 + v10, v01 + v11, by == 1, u.y);

            x /= 2;
            y /= 2;
        }
        u
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

        let ((x, y), u) = self.select_patch(&corners, *sample);
        let [v00, v10, v01, v11] = self.patch_corners(&corners, x, y);
        let (local, _) = square_to_bilinear(v00, v10, v01, v11, &u);

        let pos = Point2f::new(
            (x as Float + local.x) / (w - 1) as Float,
            (y as Float + local.y) / (h - 1) as Float,
        );
        (pos, bilinear_value(v00, v10, v01, v11, &local))
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
        let corners = self.params.corners(param);

        let ((x, y), local) = self.locate(pos);
        let [v00, v10, v01, v11] = self.patch_corners(&corners, x, y);
        let (u, _) = square_to_bilinear_inverse(v00, v10, v01, v11, &local);

        let u = self.unselect_patch(&corners, (x, y), u);
        (u, bilinear_value(v00, v10, v01, v11, &local))
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
        let corners = self.params.corners(param);
        let ((x, y), local) = self.locate(pos);
        let [v00, v10, v01, v11] = self.patch_corners(&corners, x, y);
        bilinear_value(v00, v10, v01, v11, &local)
    }
}

#[inline]
fn bilinear_value(v00: Float, v10: Float, v01: Float, v11: Float, p: &Point2f) -> Float {
    lerp(p.y, lerp(p.x, v00, v10), lerp(p.x, v01, v11))
}

/// Picks between two children with masses `r0` and `r1` and rescales `u` to
/// the chosen child. Returns `true` for the second child. A side without
/// mass is never chosen unless both are empty.
#[inline]
pub(crate) fn choose_upper(r0: Float, r1: Float, u: &mut Float) -> bool {
    let total = r0 + r1;
    if !(total > 0.0) {
        return false;
    }
    let x = *u * total;
    if r1 > 0.0 && (x >= r0 || r0 <= 0.0) {
        *u = clamp((x - r0) / r1, 0.0, ONE_MINUS_EPSILON);
        true
    } else {
        *u = clamp(x / r0, 0.0, ONE_MINUS_EPSILON);
        false
    }
}

/// Inverse of `choose_upper()`.
#[inline]
pub(crate) fn unchoose(r0: Float, r1: Float, upper: bool, u: Float) -> Float {
    let total = r0 + r1;
    if !(total > 0.0) {
        return u;
    }
    if upper {
        (r0 + u * r1) / total
    } else {
        u * r0 / total
    }
}

/// Linear-scan version of `choose_upper()` over any number of entries.
pub(crate) fn scan_select(weights: &[Float], u: &mut Float) -> usize {
    let total: Float = weights.iter().sum();
    let last = match weights.iter().rposition(|&w| w > 0.0) {
        Some(last) if total > 0.0 => last,
        _ => return 0,
    };

    let x = *u * total;
    let mut acc = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 && (x < acc + w || i == last) {
            *u = clamp((x - acc) / w, 0.0, ONE_MINUS_EPSILON);
            return i;
        }
        acc += w;
    }
    last
}

/// Inverse of `scan_select()`.
pub(crate) fn scan_unselect(weights: &[Float], index: usize, u: Float) -> Float {
    let total: Float = weights.iter().sum();
    if !(total > 0.0) {
        return u;
    }
    let before: Float = weights[..index].iter().sum();
    (before + u * weights[index]) / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    prop_point2!(unit_square, Float, 0.0f32..1.0f32, 0.0f32..1.0f32);

    fn ramp_data(w: usize, h: usize, slices: usize) -> Vec<Float> {
        let mut data = Vec::with_capacity(w * h * slices);
        for s in 0..slices {
            for y in 0..h {
                for x in 0..w {
                    data.push(1.0 + x as Float + 2.0 * y as Float * (s + 1) as Float + ((x * y) % 3) as Float);
                }
            }
        }
        data
    }

    #[test]
    fn constant_table_is_identity() {
        let t = Hierarchical2D::<0>::new([3, 5], [], &vec![2.0; 15], true, true).unwrap();
        let (p, pdf) = t.sample(&Point2f::new(0.3, 0.8), &[], true);
        assert!(p.max_abs_diff(&Point2f::new(0.3, 0.8)) < 1e-5);
        assert!(approx_eq!(f32, pdf, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn inactive_returns_zeros() {
        let t = Hierarchical2D::<0>::new([2, 2], [], &[1.0, 2.0, 3.0, 4.0], true, true).unwrap();
        assert_eq!(t.sample(&Point2f::new(0.5, 0.5), &[], false), (Point2f::zero(), 0.0));
        assert_eq!(t.invert(&Point2f::new(0.5, 0.5), &[], false), (Point2f::zero(), 0.0));
        assert_eq!(t.eval(&Point2f::new(0.5, 0.5), &[], false), 0.0);
    }

    #[test]
    fn normalized_density_integrates_to_one() {
        let t = Hierarchical2D::<0>::new([5, 4], [], &ramp_data(5, 4, 1), true, true).unwrap();
        let n = 64;
        let mut sum = 0.0;
        for i in 0..n {
            for j in 0..n {
                let p = Point2f::new((i as Float + 0.5) / n as Float, (j as Float + 0.5) / n as Float);
                sum += t.eval(&p, &[], true);
            }
        }
        assert!(approx_eq!(f32, sum / (n * n) as Float, 1.0, epsilon = 1e-3));
    }

    #[test]
    fn construction_errors() {
        assert!(matches!(
            Hierarchical2D::<0>::new([1, 4], [], &[1.0; 4], true, true),
            Err(Error::TooFewEntries { .. })
        ));
        assert!(matches!(
            Hierarchical2D::<0>::new([2, 2], [], &[1.0; 3], true, true),
            Err(Error::SizeMismatch { .. })
        ));
        assert!(matches!(
            Hierarchical2D::<0>::new([2, 2], [], &[1.0, 1.0, -1.0, 1.0], true, true),
            Err(Error::NegativeEntry { .. })
        ));
    }

    #[test]
    fn scan_selection_round_trip() {
        let w = [0.0, 1.0, 0.0, 3.0, 0.0];
        let mut u = 0.5;
        let i = scan_select(&w, &mut u);
        assert_eq!(i, 3);
        assert!(approx_eq!(f32, scan_unselect(&w, i, u), 0.5, epsilon = 1e-6));
        let mut u = 0.999;
        assert_eq!(scan_select(&w, &mut u), 3);
    }

    proptest! {
        #[test]
        fn sample_invert_round_trip(u in unit_square(), p in 0.0f32..1.0f32) {
            for &hierarchy in &[true, false] {
                let t = Hierarchical2D::<1>::new([6, 5], [vec![0.0, 1.0]], &ramp_data(6, 5, 2), hierarchy, true).unwrap();
                let (pos, pdf) = t.sample(&u, &[p], true);
                let (back, pdf_inv) = t.invert(&pos, &[p], true);
                prop_assert!(back.max_abs_diff(&u) < 2e-3, "{} -> {} -> {}", u, pos, back);
                prop_assert!((pdf - pdf_inv).abs() < 1e-3 * pdf.max(1.0));
                prop_assert!((pdf - t.eval(&pos, &[p], true)).abs() < 1e-3 * pdf.max(1.0));
            }
        }

        #[test]
        fn invert_sample_round_trip(pos in unit_square(), p in -0.5f32..1.5f32) {
            let t = Hierarchical2D::<1>::new([4, 7], [vec![0.0, 1.0]], &ramp_data(4, 7, 2), true, true).unwrap();
            let (u, _) = t.invert(&pos, &[p], true);
            prop_assume!(u.x < ONE_MINUS_EPSILON && u.y < ONE_MINUS_EPSILON);
            let (back, _) = t.sample(&u, &[p], true);
            prop_assert!(back.max_abs_diff(&pos) < 2e-3, "{} -> {} -> {}", pos, u, back);
        }

        #[test]
        fn sampled_value_matches_eval(u in unit_square()) {
            let data = ramp_data(5, 3, 1);
            let a = Hierarchical2D::<0>::new([5, 3], [], &data, true, true).unwrap();
            let b = Hierarchical2D::<0>::new([5, 3], [], &data, false, true).unwrap();
            for t in [&a, &b] {
                let (pos, pdf) = t.sample(&u, &[], true);
                prop_assert!(pdf > 0.0);
                prop_assert!((pdf - a.eval(&pos, &[], true)).abs() < 1e-3 * pdf.max(1.0));
            }
        }
    }
}
