//! Discrete Distribution.

use crate::batch::*;
use crate::error::*;
use crate::pbrt::*;
use std::ops::Index;

/// Piecewise-constant probability mass function over `0..n` with its CDF,
/// sampled by inverse-CDF search.
///
/// Entries are appended one at a time and the table is finalized with
/// `normalize()`. Sampling only considers indices in `range()`, the sub-range
/// between the first and last entry with positive mass, so zero-mass entries
/// at either end are never returned.
#[derive(Clone, Debug, Default)]
pub struct DiscreteDistribution {
    /// Probability mass of each entry (raw until normalized).
    pmf: Vec<Float>,

    /// Running sum of `pmf`; `cdf[0] = 0` and `cdf.len() = pmf.len() + 1`.
    cdf: Vec<Float>,

    /// Raw total mass.
    sum: Float,

    /// `1 / sum`, or 0 for an all-zero distribution.
    normalization: Float,

    /// Set once `normalize()` has rescaled the table.
    normalized: bool,

    /// First index with positive mass.
    range_start: usize,

    /// One past the last index with positive mass.
    range_end: usize,
}

impl DiscreteDistribution {
    /// Returns an empty distribution.
    pub fn new() -> Self {
        Self {
            cdf: vec![0.0],
            ..Default::default()
        }
    }

    /// Returns an empty distribution with room for `n` entries.
    ///
    /// * `n` - Number of entries.
    pub fn with_capacity(n: usize) -> Self {
        let mut cdf = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        Self {
            pmf: Vec::with_capacity(n),
            cdf,
            ..Default::default()
        }
    }

    /// Builds and normalizes a distribution from a mass function.
    ///
    /// * `pmf` - Non-negative masses.
    pub fn from_pmf(pmf: &[Float]) -> Result<Self> {
        let mut distr = Self::with_capacity(pmf.len());
        for &p in pmf {
            distr.append(p)?;
        }
        distr.normalize()?;
        Ok(distr)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.pmf.clear();
        self.cdf.clear();
        self.cdf.push(0.0);
        self.sum = 0.0;
        self.normalization = 0.0;
        self.normalized = false;
        self.range_start = 0;
        self.range_end = 0;
    }

    /// Reserves room for `n` additional entries.
    ///
    /// * `n` - Number of entries.
    pub fn reserve(&mut self, n: usize) {
        self.pmf.reserve(n);
        self.cdf.reserve(n);
    }

    /// Appends an entry. Clears the normalized state.
    ///
    /// * `p` - Mass of the new entry; must be finite and non-negative.
    pub fn append(&mut self, p: Float) -> Result<()> {
        let index = self.pmf.len();
        if !p.is_finite() {
            return Err(Error::NonFiniteEntry {
                field: "pmf",
                index,
                value: p,
            });
        }
        if p < 0.0 {
            return Err(Error::NegativeEntry {
                field: "pmf",
                index,
                value: p,
            });
        }

        if self.normalized {
            self.denormalize();
        }

        if p > 0.0 {
            if self.range_end == self.range_start {
                self.range_start = index;
            }
            self.range_end = index + 1;
        }

        self.sum += p;
        self.pmf.push(p);
        self.cdf.push(self.sum);
        Ok(())
    }

    /// Rescales the table so the masses sum to 1 and returns the raw sum.
    ///
    /// An all-zero table is legal: its normalization becomes 0, the valid
    /// range collapses to empty and sampling returns index 0 with zero mass.
    pub fn normalize(&mut self) -> Result<Float> {
        let n = self.pmf.len();
        if n == 0 {
            return Err(Error::EmptyDistribution { field: "pmf" });
        }
        if self.normalized {
            return Ok(self.sum);
        }

        if self.sum > 0.0 {
            self.normalization = 1.0 / self.sum;
            for v in self.cdf.iter_mut() {
                *v *= self.normalization;
            }
            for v in self.pmf.iter_mut() {
                *v *= self.normalization;
            }
            // Remove roundoff drift at the end of the table.
            for v in self.cdf[self.range_end..].iter_mut() {
                *v = 1.0;
            }
            self.normalized = true;
        } else {
            warn!("DiscreteDistribution: all {} entries are zero", n);
            self.normalization = 0.0;
            self.range_start = 0;
            self.range_end = 0;
        }
        Ok(self.sum)
    }

    /// Restores raw masses so that further entries can be appended.
    fn denormalize(&mut self) {
        let mut acc = 0.0;
        for (i, p) in self.pmf.iter_mut().enumerate() {
            *p *= self.sum;
            acc += *p;
            self.cdf[i + 1] = acc;
        }
        self.sum = acc;
        self.normalized = false;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.pmf.len()
    }

    /// Returns `true` if no entries were appended.
    pub fn is_empty(&self) -> bool {
        self.pmf.is_empty()
    }

    /// Raw total mass.
    pub fn sum(&self) -> Float {
        self.sum
    }

    /// `1 / sum`, or 0 for an all-zero table.
    pub fn normalization(&self) -> Float {
        self.normalization
    }

    /// Returns `true` once the table has been normalized.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Index range `[start, end)` of entries that can be sampled.
    pub fn range(&self) -> (usize, usize) {
        (self.range_start, self.range_end)
    }

    /// The CDF table, `len() + 1` entries starting at 0.
    pub fn cdf(&self) -> &[Float] {
        &self.cdf
    }

    /// Returns the mass of entry `index`.
    ///
    /// * `index` - Entry index.
    #[inline]
    pub fn eval_pmf(&self, index: usize) -> Float {
        self.cdf[index + 1] - self.cdf[index]
    }

    /// Returns the CDF value at the end of entry `index`.
    ///
    /// * `index` - Entry index.
    #[inline]
    pub fn eval_cdf(&self, index: usize) -> Float {
        self.cdf[index + 1]
    }

    /// Returns the masses of several entries.
    ///
    /// * `indices` - Entry indices.
    pub fn gather(&self, indices: &[usize]) -> Vec<Float> {
        indices.iter().map(|&i| self.eval_pmf(i)).collect()
    }

    /// Maps a uniform sample to the CDF scale of the table.
    #[inline]
    fn scale_sample(&self, u: Float) -> Float {
        if self.normalized {
            u
        } else {
            u * self.sum
        }
    }

    /// Returns the last index `i` in the valid range with `cdf[i] <= u`.
    ///
    /// * `u` - Uniform sample in [0, 1].
    pub fn sample(&self, u: Float) -> usize {
        let u = self.scale_sample(u);
        find_interval_range(self.range_start, self.range_end, |i| self.cdf[i] <= u)
    }

    /// Samples an index and returns it with its probability.
    ///
    /// * `u` - Uniform sample in [0, 1].
    pub fn sample_pdf(&self, u: Float) -> (usize, Float) {
        let index = self.sample(u);
        (index, self.eval_pmf(index) * self.pmf_scale())
    }

    /// Samples an index and rescales `u` to a fresh uniform sample relative
    /// to the chosen entry's interval.
    ///
    /// * `u` - Uniform sample in [0, 1]; replaced by the rescaled sample.
    pub fn sample_reuse(&self, u: &mut Float) -> usize {
        let index = self.sample(*u);
        let scaled = self.scale_sample(*u);
        let pmf = self.eval_pmf(index);
        *u = min(safe_div(scaled - self.cdf[index], pmf), ONE_MINUS_EPSILON);
        index
    }

    /// `sample_reuse()` that also returns the probability of the index.
    ///
    /// * `u` - Uniform sample in [0, 1]; replaced by the rescaled sample.
    pub fn sample_reuse_pdf(&self, u: &mut Float) -> (usize, Float) {
        let index = self.sample_reuse(u);
        (index, self.eval_pmf(index) * self.pmf_scale())
    }

    /// Samples one index per active lane.
    ///
    /// * `u`    - One uniform sample per lane.
    /// * `mask` - Active lanes.
    pub fn sample_batch(&self, u: &[Float], mask: &Mask) -> Packet<usize> {
        vectorize(u, mask, |&u| self.sample(u))
    }

    /// Factor turning a stored mass into a probability.
    #[inline]
    fn pmf_scale(&self) -> Float {
        if self.normalized {
            1.0
        } else {
            safe_div(1.0, self.sum)
        }
    }
}

impl Index<usize> for DiscreteDistribution {
    type Output = Float;

    /// Returns the mass of entry `i` (raw until the table is normalized).
    ///
    /// * `i` - Entry index.
    fn index(&self, i: usize) -> &Self::Output {
        &self.pmf[i]
    }
}
