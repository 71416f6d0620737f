//! Halton Sampler.

use render_core::geometry::*;
use render_core::low_discrepancy::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::sampler::*;
use std::sync::Arc;

/// Implements a low-discrepancy sampler using scrambled Halton sequences.
/// Dimension `d` of sample `i` is the radical inverse of `i` in the `d`-th
/// prime base with a random digit permutation per base. Dimensions past the
/// prime table wrap around.
#[derive(Clone)]
pub struct HaltonSampler {
    /// Digit permutations shared by clones with the same seed.
    radical_inverse: Arc<RadicalInverse>,

    /// Seed of the permutations.
    seed: u64,

    /// Current sample index.
    index: u64,

    /// Next dimension of the current sample.
    dim: usize,
}

impl HaltonSampler {
    /// Create a new `HaltonSampler`.
    ///
    /// * `seed` - Seed for the digit permutations.
    pub fn new(seed: u64) -> Self {
        Self {
            radical_inverse: Arc::new(RadicalInverse::new(seed)),
            seed,
            index: 0,
            dim: 0,
        }
    }

    /// Create from parameters; `seed` defaults to 0.
    ///
    /// * `params` - Parameter set.
    pub fn from_params(params: &ParamSet) -> Self {
        let seed = params.find_one_int("seed", 0);
        if seed < 0 {
            warn!("Negative sampler seed {}; using its magnitude", seed);
        }
        Self::new(seed.unsigned_abs() as u64)
    }

    /// Starts sample vector `index` at its first dimension.
    ///
    /// * `index` - Sample index.
    pub fn start_sample(&mut self, index: u64) {
        self.index = index;
        self.dim = 0;
    }

    /// Current sample index.
    pub fn sample_index(&self) -> u64 {
        self.index
    }

    fn next_dimension(&mut self) -> usize {
        let dim = self.dim % self.radical_inverse.bases();
        self.dim += 1;
        dim
    }
}

impl Sampler for HaltonSampler {
    /// Returns the sample value for the next dimension of the current sample vector.
    fn next_1d(&mut self) -> Float {
        let dim = self.next_dimension();
        self.radical_inverse.eval_scrambled(dim, self.index)
    }

    /// Returns the sample value for the next two dimensions of the current sample vector.
    fn next_2d(&mut self) -> Point2f {
        let x = self.next_1d();
        let y = self.next_1d();
        Point2f::new(x, y)
    }

    /// Rebuilds the permutations and restarts at sample 0.
    ///
    /// * `seed` - The seed.
    fn seed(&mut self, seed: u64) {
        if seed != self.seed {
            self.radical_inverse = Arc::new(RadicalInverse::new(seed));
            self.seed = seed;
        }
        self.start_sample(0);
    }

    /// Generates a new instance of an initial `Sampler` for use by a rendering thread.
    ///
    /// * `seed` - The seed for the digit permutations.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        let mut sampler = self.clone();
        sampler.seed(seed);
        Box::new(sampler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_two_dimension_is_stratified() {
        let mut s = HaltonSampler::new(3);
        let n = 64;
        let mut hit = vec![false; n];
        for i in 0..n as u64 {
            s.start_sample(i);
            let v = s.next_1d();
            assert!((0.0..1.0).contains(&v));
            let cell = (v * n as Float) as usize;
            assert!(!hit[cell], "two samples in cell {}", cell);
            hit[cell] = true;
        }
    }

    #[test]
    fn dimensions_use_successive_bases() {
        let mut s = HaltonSampler::new(0);
        s.start_sample(5);
        let a = s.next_2d();
        let ri = RadicalInverse::new(0);
        assert_eq!(a.x, ri.eval_scrambled(0, 5));
        assert_eq!(a.y, ri.eval_scrambled(1, 5));
        assert_eq!(s.next_1d(), ri.eval_scrambled(2, 5));
    }

    #[test]
    fn clone_with_same_seed_matches() {
        let mut a = HaltonSampler::new(11);
        let mut b = a.clone_sampler(11);
        for _ in 0..8 {
            assert_eq!(a.next_1d(), b.next_1d());
        }
        a.seed(12);
        assert_eq!(a.sample_index(), 0);
    }
}
