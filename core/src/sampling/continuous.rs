//! Continuous Distributions.

use crate::error::*;
use crate::pbrt::*;
use itertools::Itertools;

/// Solves `y0·t + (y1 - y0)·t²/2 = v` for `t ∈ [0, 1]`, the fraction of a
/// linear segment holding mass `v` (in units of the segment width). The
/// stable form never divides by zero: a segment with no mass returns 0.
#[inline]
pub(crate) fn invert_linear_segment(y0: Float, y1: Float, v: Float) -> Float {
    let den = y0 + safe_sqrt(y0 * y0 + 2.0 * v * (y1 - y0));
    clamp(safe_div(2.0 * v, den), 0.0, 1.0)
}

/// Mass of the first `t` of a linear segment, in units of the segment width.
#[inline]
pub(crate) fn linear_segment_mass(y0: Float, y1: Float, t: Float) -> Float {
    t * (y0 + 0.5 * (y1 - y0) * t)
}

/// Trapezoidal running integral of `pdf` where `width(i)` is the spacing
/// between node `i` and `i + 1`. Returns the CDF (leading 0 included) and the
/// index range `[start, end)` of intervals with positive mass.
fn integrate<W>(pdf: &[Float], width: W) -> (Vec<Float>, usize, usize)
where
    W: Fn(usize) -> Float,
{
    let mut cdf = Vec::with_capacity(pdf.len());
    cdf.push(0.0);

    let (mut start, mut end) = (0, 0);
    let mut acc = 0.0_f64;
    for (i, (y0, y1)) in pdf.iter().tuple_windows().enumerate() {
        let mass = 0.5 * (*y0 as f64 + *y1 as f64) * width(i) as f64;
        if mass > 0.0 {
            if end == start {
                start = i;
            }
            end = i + 1;
        }
        acc += mass;
        cdf.push(acc as Float);
    }
    (cdf, start, end)
}

/// Piecewise-linear density over a range `[min, max]` with uniformly spaced
/// nodes.
#[derive(Clone, Debug)]
pub struct ContinuousDistribution {
    /// Domain.
    range: [Float; 2],

    /// Density at each node (unnormalized).
    pdf: Vec<Float>,

    /// Running integral of `pdf` at each node.
    cdf: Vec<Float>,

    /// Intervals `[start, end)` carrying positive mass.
    valid: (usize, usize),

    /// Spacing between nodes.
    interval_size: Float,

    /// `1 / interval_size`.
    inv_interval_size: Float,

    /// Integral of `pdf` over the domain.
    integral: Float,

    /// `1 / integral`, or 0 when the integral vanishes.
    normalization: Float,

    /// Largest density value.
    max: Float,
}

impl ContinuousDistribution {
    /// Creates a distribution from density values at `pdf.len()` uniformly
    /// spaced nodes covering `range`.
    ///
    /// * `range` - Domain `[min, max]`; `min < max`.
    /// * `pdf`   - Non-negative density values; at least two.
    pub fn new(range: [Float; 2], pdf: &[Float]) -> Result<Self> {
        if pdf.len() < 2 {
            return Err(Error::TooFewEntries {
                field: "pdf",
                min: 2,
                actual: pdf.len(),
            });
        }
        if !(range[0] < range[1]) || !range[0].is_finite() || !range[1].is_finite() {
            return Err(Error::InvalidRange {
                field: "range",
                min: range[0],
                max: range[1],
            });
        }

        let mut distr = Self {
            range,
            pdf: pdf.to_vec(),
            cdf: Vec::new(),
            valid: (0, 0),
            interval_size: 0.0,
            inv_interval_size: 0.0,
            integral: 0.0,
            normalization: 0.0,
            max: 0.0,
        };
        distr.update()?;
        Ok(distr)
    }

    /// Recomputes the CDF, integral, normalization and maximum after the
    /// density values were edited through `pdf_mut()`.
    pub fn update(&mut self) -> Result<()> {
        check_non_negative("pdf", &self.pdf)?;

        let n = self.pdf.len();
        self.interval_size = (self.range[1] - self.range[0]) / (n - 1) as Float;
        self.inv_interval_size = 1.0 / self.interval_size;

        let interval_size = self.interval_size;
        let (cdf, start, end) = integrate(&self.pdf, |_| interval_size);
        self.cdf = cdf;
        self.valid = (start, end);
        self.integral = self.cdf[n - 1];
        self.max = self.pdf.iter().fold(0.0, |a, &b| max(a, b));
        self.normalization = if self.integral > 0.0 {
            1.0 / self.integral
        } else {
            warn!("ContinuousDistribution: density integrates to zero");
            0.0
        };
        Ok(())
    }

    /// Mutable access to the density values; call `update()` afterwards.
    pub fn pdf_mut(&mut self) -> &mut [Float] {
        &mut self.pdf
    }

    /// Domain `[min, max]`.
    pub fn range(&self) -> [Float; 2] {
        self.range
    }

    /// Integral of the unnormalized density.
    pub fn integral(&self) -> Float {
        self.integral
    }

    /// `1 / integral`, or 0.
    pub fn normalization(&self) -> Float {
        self.normalization
    }

    /// Largest density value.
    pub fn max(&self) -> Float {
        self.max
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.pdf.len()
    }

    /// Returns `true` if there are no nodes (never, once constructed).
    pub fn is_empty(&self) -> bool {
        self.pdf.is_empty()
    }

    /// Density values.
    pub fn pdf(&self) -> &[Float] {
        &self.pdf
    }

    /// Running integral at each node.
    pub fn cdf(&self) -> &[Float] {
        &self.cdf
    }

    /// Returns the interval containing `x` and the position within it, or
    /// `None` outside the domain.
    #[inline]
    fn locate(&self, x: Float) -> Option<(usize, Float)> {
        if !(x >= self.range[0] && x <= self.range[1]) {
            return None;
        }
        let xr = (x - self.range[0]) * self.inv_interval_size;
        let i = min(xr as usize, self.pdf.len() - 2);
        Some((i, xr - i as Float))
    }

    /// Unnormalized density at `x`; 0 outside the domain.
    ///
    /// * `x` - Position.
    pub fn eval_pdf(&self, x: Float) -> Float {
        match self.locate(x) {
            Some((i, t)) => lerp(t, self.pdf[i], self.pdf[i + 1]),
            None => 0.0,
        }
    }

    /// Normalized density at `x`.
    ///
    /// * `x` - Position.
    pub fn eval_pdf_normalized(&self, x: Float) -> Float {
        self.eval_pdf(x) * self.normalization
    }

    /// Unnormalized CDF at `x`, clamped outside the domain.
    ///
    /// * `x` - Position.
    pub fn eval_cdf(&self, x: Float) -> Float {
        if x < self.range[0] {
            return 0.0;
        }
        match self.locate(x) {
            Some((i, t)) => {
                self.cdf[i] + linear_segment_mass(self.pdf[i], self.pdf[i + 1], t) * self.interval_size
            }
            None => self.integral,
        }
    }

    /// Normalized CDF at `x`.
    ///
    /// * `x` - Position.
    pub fn eval_cdf_normalized(&self, x: Float) -> Float {
        self.eval_cdf(x) * self.normalization
    }

    /// Maps a uniform sample to a position distributed according to the
    /// density. An all-zero density returns the lower end of the domain.
    ///
    /// * `u` - Uniform sample in [0, 1].
    pub fn sample(&self, u: Float) -> Float {
        self.sample_interval(u).0
    }

    /// Samples a position and returns it with its normalized density.
    ///
    /// * `u` - Uniform sample in [0, 1].
    pub fn sample_pdf(&self, u: Float) -> (Float, Float) {
        let (x, value) = self.sample_interval(u);
        (x, value * self.normalization)
    }

    fn sample_interval(&self, u: Float) -> (Float, Float) {
        let target = u * self.integral;
        let (start, end) = self.valid;
        let i = find_interval_range(start, end, |i| self.cdf[i] <= target);

        let (y0, y1) = (self.pdf[i], self.pdf[i + 1]);
        let v = (target - self.cdf[i]) * self.inv_interval_size;
        let t = invert_linear_segment(y0, y1, v);

        let x = self.range[0] + (i as Float + t) * self.interval_size;
        (min(x, self.range[1]), lerp(t, y0, y1))
    }
}

/// Piecewise-linear density over explicitly given, strictly increasing
/// nodes.
#[derive(Clone, Debug)]
pub struct IrregularContinuousDistribution {
    /// Node positions.
    nodes: Vec<Float>,

    /// Density at each node (unnormalized).
    pdf: Vec<Float>,

    /// Running integral of `pdf` at each node.
    cdf: Vec<Float>,

    /// Intervals `[start, end)` carrying positive mass.
    valid: (usize, usize),

    /// Integral of `pdf` over the domain.
    integral: Float,

    /// `1 / integral`, or 0 when the integral vanishes.
    normalization: Float,

    /// Largest density value.
    max: Float,
}

impl IrregularContinuousDistribution {
    /// Creates a distribution from density values at the given nodes.
    ///
    /// * `nodes` - Strictly increasing node positions; at least two.
    /// * `pdf`   - Non-negative density value per node.
    pub fn new(nodes: &[Float], pdf: &[Float]) -> Result<Self> {
        if nodes.len() < 2 {
            return Err(Error::TooFewEntries {
                field: "nodes",
                min: 2,
                actual: nodes.len(),
            });
        }
        if pdf.len() != nodes.len() {
            return Err(Error::SizeMismatch {
                field: "pdf",
                expected: nodes.len(),
                actual: pdf.len(),
            });
        }

        let mut distr = Self {
            nodes: nodes.to_vec(),
            pdf: pdf.to_vec(),
            cdf: Vec::new(),
            valid: (0, 0),
            integral: 0.0,
            normalization: 0.0,
            max: 0.0,
        };
        distr.update()?;
        Ok(distr)
    }

    /// Recomputes the CDF, integral, normalization and maximum after nodes
    /// or density values were edited.
    pub fn update(&mut self) -> Result<()> {
        if self.nodes.len() != self.pdf.len() {
            return Err(Error::SizeMismatch {
                field: "pdf",
                expected: self.nodes.len(),
                actual: self.pdf.len(),
            });
        }
        check_increasing("nodes", &self.nodes)?;
        check_non_negative("pdf", &self.pdf)?;

        let nodes = &self.nodes;
        let (cdf, start, end) = integrate(&self.pdf, |i| nodes[i + 1] - nodes[i]);
        self.cdf = cdf;
        self.valid = (start, end);
        self.integral = self.cdf[self.cdf.len() - 1];
        self.max = self.pdf.iter().fold(0.0, |a, &b| max(a, b));
        self.normalization = if self.integral > 0.0 {
            1.0 / self.integral
        } else {
            warn!("IrregularContinuousDistribution: density integrates to zero");
            0.0
        };
        Ok(())
    }

    /// Mutable access to the node positions; call `update()` afterwards.
    pub fn nodes_mut(&mut self) -> &mut [Float] {
        &mut self.nodes
    }

    /// Mutable access to the density values; call `update()` afterwards.
    pub fn pdf_mut(&mut self) -> &mut [Float] {
        &mut self.pdf
    }

    /// Domain `[first node, last node]`.
    pub fn range(&self) -> [Float; 2] {
        [self.nodes[0], self.nodes[self.nodes.len() - 1]]
    }

    /// Integral of the unnormalized density.
    pub fn integral(&self) -> Float {
        self.integral
    }

    /// `1 / integral`, or 0.
    pub fn normalization(&self) -> Float {
        self.normalization
    }

    /// Largest density value.
    pub fn max(&self) -> Float {
        self.max
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.pdf.len()
    }

    /// Returns `true` if there are no nodes (never, once constructed).
    pub fn is_empty(&self) -> bool {
        self.pdf.is_empty()
    }

    /// Node positions.
    pub fn nodes(&self) -> &[Float] {
        &self.nodes
    }

    /// Density values.
    pub fn pdf(&self) -> &[Float] {
        &self.pdf
    }

    /// Running integral at each node.
    pub fn cdf(&self) -> &[Float] {
        &self.cdf
    }

    #[inline]
    fn locate(&self, x: Float) -> Option<(usize, Float)> {
        let [lo, hi] = self.range();
        if !(x >= lo && x <= hi) {
            return None;
        }
        let i = find_interval(self.nodes.len(), |i| self.nodes[i] <= x);
        let t = (x - self.nodes[i]) / (self.nodes[i + 1] - self.nodes[i]);
        Some((i, clamp(t, 0.0, 1.0)))
    }

    /// Unnormalized density at `x`; 0 outside the domain.
    ///
    /// * `x` - Position.
    pub fn eval_pdf(&self, x: Float) -> Float {
        match self.locate(x) {
            Some((i, t)) => lerp(t, self.pdf[i], self.pdf[i + 1]),
            None => 0.0,
        }
    }

    /// Normalized density at `x`.
    ///
    /// * `x` - Position.
    pub fn eval_pdf_normalized(&self, x: Float) -> Float {
        self.eval_pdf(x) * self.normalization
    }

    /// Unnormalized CDF at `x`, clamped outside the domain.
    ///
    /// * `x` - Position.
    pub fn eval_cdf(&self, x: Float) -> Float {
        if x < self.nodes[0] {
            return 0.0;
        }
        match self.locate(x) {
            Some((i, t)) => {
                let width = self.nodes[i + 1] - self.nodes[i];
                self.cdf[i] + linear_segment_mass(self.pdf[i], self.pdf[i + 1], t) * width
            }
            None => self.integral,
        }
    }

    /// Normalized CDF at `x`.
    ///
    /// * `x` - Position.
    pub fn eval_cdf_normalized(&self, x: Float) -> Float {
        self.eval_cdf(x) * self.normalization
    }

    /// Maps a uniform sample to a position distributed according to the
    /// density.
    ///
    /// * `u` - Uniform sample in [0, 1].
    pub fn sample(&self, u: Float) -> Float {
        self.sample_interval(u).0
    }

    /// Samples a position and returns it with its normalized density.
    ///
    /// * `u` - Uniform sample in [0, 1].
    pub fn sample_pdf(&self, u: Float) -> (Float, Float) {
        let (x, value) = self.sample_interval(u);
        (x, value * self.normalization)
    }

    fn sample_interval(&self, u: Float) -> (Float, Float) {
        let target = u * self.integral;
        let (start, end) = self.valid;
        let i = find_interval_range(start, end, |i| self.cdf[i] <= target);

        let width = self.nodes[i + 1] - self.nodes[i];
        let (y0, y1) = (self.pdf[i], self.pdf[i + 1]);
        let t = invert_linear_segment(y0, y1, (target - self.cdf[i]) / width);

        (lerp(t, self.nodes[i], self.nodes[i + 1]), lerp(t, y0, y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::collection::vec;
    use proptest::prelude::*;

    #[test]
    fn uniform_is_identity() {
        let d = ContinuousDistribution::new([0.0, 1.0], &[1.0, 1.0]).unwrap();
        for &u in &[0.0, 0.125, 0.3, 0.5, 0.77, 1.0] {
            assert_eq!(d.sample(u), u);
        }
        assert_eq!(d.integral(), 1.0);
        assert_eq!(d.eval_pdf_normalized(0.3), 1.0);
    }

    #[test]
    fn linear_ramp() {
        // pdf(x) = 2x on [0, 1]; cdf(x) = x².
        let d = ContinuousDistribution::new([0.0, 1.0], &[0.0, 2.0]).unwrap();
        assert!(approx_eq!(f32, d.sample(0.25), 0.5, epsilon = 1e-6));
        assert!(approx_eq!(f32, d.eval_cdf(0.5), 0.25, epsilon = 1e-6));
        let (x, pdf) = d.sample_pdf(0.81);
        assert!(approx_eq!(f32, x, 0.9, epsilon = 1e-5));
        assert!(approx_eq!(f32, pdf, 1.8, epsilon = 1e-4));
    }

    #[test]
    fn outside_domain() {
        let d = ContinuousDistribution::new([-1.0, 1.0], &[1.0, 3.0, 1.0]).unwrap();
        assert_eq!(d.eval_pdf(-1.5), 0.0);
        assert_eq!(d.eval_pdf(2.0), 0.0);
        assert_eq!(d.eval_cdf(-3.0), 0.0);
        assert_eq!(d.eval_cdf(3.0), d.integral());
        assert_eq!(d.max(), 3.0);
        assert_eq!(d.integral(), 4.0);
    }

    #[test]
    fn zero_segments_are_skipped() {
        let d = ContinuousDistribution::new([0.0, 3.0], &[0.0, 0.0, 1.0, 1.0]).unwrap();
        assert!(d.sample(0.0) >= 1.0);
        let z = ContinuousDistribution::new([0.0, 1.0], &[0.0, 0.0]).unwrap();
        assert_eq!(z.normalization(), 0.0);
        assert_eq!(z.sample(0.5), 0.0);
    }

    #[test]
    fn construction_errors() {
        assert!(matches!(
            ContinuousDistribution::new([0.0, 1.0], &[1.0]),
            Err(Error::TooFewEntries { .. })
        ));
        assert!(matches!(
            ContinuousDistribution::new([1.0, 1.0], &[1.0, 1.0]),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            ContinuousDistribution::new([0.0, 1.0], &[1.0, -1.0]),
            Err(Error::NegativeEntry { index: 1, .. })
        ));
        assert!(matches!(
            IrregularContinuousDistribution::new(&[0.0, 1.0, 1.0], &[1.0, 1.0, 1.0]),
            Err(Error::NonIncreasingNodes { index: 2, .. })
        ));
        assert!(matches!(
            IrregularContinuousDistribution::new(&[0.0, 1.0], &[1.0]),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn update_after_edit() {
        let mut d = ContinuousDistribution::new([0.0, 1.0], &[1.0, 1.0]).unwrap();
        d.pdf_mut()[1] = 3.0;
        d.update().unwrap();
        assert_eq!(d.integral(), 2.0);
        assert_eq!(d.max(), 3.0);
    }

    #[test]
    fn irregular_matches_regular_on_uniform_nodes() {
        let pdf = [0.5, 2.0, 1.0, 0.0, 4.0];
        let r = ContinuousDistribution::new([0.0, 2.0], &pdf).unwrap();
        let i = IrregularContinuousDistribution::new(&[0.0, 0.5, 1.0, 1.5, 2.0], &pdf).unwrap();
        assert!(approx_eq!(f32, r.integral(), i.integral(), ulps = 4));
        for k in 0..=16 {
            let u = k as Float / 16.0;
            assert!(approx_eq!(f32, r.sample(u), i.sample(u), epsilon = 1e-5));
        }
    }

    proptest! {
        #[test]
        fn cdf_inverts_sample(pdf in vec(0.0f32..10.0f32, 2..32), u in 0.0f32..=1.0f32) {
            prop_assume!(pdf.iter().tuple_windows().any(|(a, b)| a + b > 1e-3));
            let d = ContinuousDistribution::new([-2.0, 3.0], &pdf).unwrap();
            let x = d.sample(u);
            prop_assert!((-2.0..=3.0).contains(&x));
            prop_assert!((d.eval_cdf_normalized(x) - u).abs() < 1e-3, "u={} x={}", u, x);
        }

        #[test]
        fn irregular_cdf_inverts_sample(
            widths in vec(0.01f32..2.0f32, 1..16),
            pdf_seed in vec(0.0f32..10.0f32, 17),
            u in 0.0f32..=1.0f32,
        ) {
            let mut nodes = vec![0.0];
            for w in &widths {
                let last = nodes[nodes.len() - 1];
                nodes.push(last + w);
            }
            let pdf = &pdf_seed[..nodes.len()];
            prop_assume!(pdf.iter().tuple_windows().any(|(a, b)| a + b > 1e-3));
            let d = IrregularContinuousDistribution::new(&nodes, pdf).unwrap();
            let x = d.sample(u);
            prop_assert!((d.eval_cdf_normalized(x) - u).abs() < 1e-3, "u={} x={}", u, x);
        }
    }
}
