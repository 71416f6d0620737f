//! Independent Sampler.

use render_core::geometry::*;
use render_core::paramset::*;
use render_core::pbrt::*;
use render_core::rng::*;
use render_core::sampler::*;

/// Implements a sampler that uses a PRNG to generate uniformly random samples.
#[derive(Clone)]
pub struct IndependentSampler {
    /// The random number generator.
    rng: RNG,
}

impl IndependentSampler {
    /// Create a new `IndependentSampler`.
    ///
    /// * `seed` - Seed for the random number generator.
    pub fn new(seed: u64) -> Self {
        Self { rng: RNG::new(seed) }
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
}

impl Default for IndependentSampler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Sampler for IndependentSampler {
    /// Returns the sample value for the next dimension of the current sample vector.
    fn next_1d(&mut self) -> Float {
        self.rng.uniform_float()
    }

    /// Returns the sample value for the next two dimensions of the current sample vector.
    fn next_2d(&mut self) -> Point2f {
        let x = self.rng.uniform_float();
        let y = self.rng.uniform_float();
        Point2f::new(x, y)
    }

    /// Restarts the random sequence.
    ///
    /// * `seed` - The seed.
    fn seed(&mut self, seed: u64) {
        self.rng = RNG::new(seed);
    }

    /// Generates a new instance of an initial `Sampler` for use by a rendering thread.
    ///
    /// * `seed` - The seed for the random number generator.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = IndependentSampler::new(7);
        let mut b: Box<dyn Sampler> = a.clone_sampler(7);
        for _ in 0..32 {
            assert_eq!(a.next_1d(), b.next_1d());
        }
        a.seed(9);
        b.seed(9);
        assert_eq!(a.next_2d(), b.next_2d());
    }

    #[test]
    fn mean_is_one_half() {
        let mut s = IndependentSampler::default();
        let n = 20_000;
        let mean = (0..n).map(|_| s.next_1d() as f64).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.01);
    }

    proptest! {
        #[test]
        fn values_in_unit_interval(seed in 0u64..1000) {
            let mut s = IndependentSampler::new(seed);
            for _ in 0..64 {
                let v = s.next_1d();
                prop_assert!((0.0..1.0).contains(&v));
                let p = s.next_2d();
                prop_assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
            }
        }
    }
}
