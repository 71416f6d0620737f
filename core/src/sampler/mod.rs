//! Sampler

use crate::geometry::*;
use crate::pbrt::*;

/// Source of uniformly distributed sample values in `[0, 1)`. Each call
/// consumes the next dimension(s) of the current sample vector.
pub trait Sampler: Send {
    /// Returns the sample value for the next dimension of the current sample
    /// vector.
    fn next_1d(&mut self) -> Float;

    /// Returns the sample value for the next two dimensions of the current
    /// sample vector.
    fn next_2d(&mut self) -> Point2f;

    /// Restarts the sequence deterministically from the given seed.
    ///
    /// * `seed` - The seed.
    fn seed(&mut self, seed: u64);

    /// Generates a new, independently seeded instance for use by another
    /// rendering thread.
    ///
    /// * `seed` - The seed for the new instance.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler>;
}

// Implement `Sampler` so `Box<dyn Sampler>` can be passed around where
// `&mut dyn Sampler` is expected, which is what `clone_sampler()` returns.
impl<S: Sampler + ?Sized> Sampler for Box<S> {
    #[inline]
    fn next_1d(&mut self) -> Float {
        (**self).next_1d()
    }

    #[inline]
    fn next_2d(&mut self) -> Point2f {
        (**self).next_2d()
    }

    #[inline]
    fn seed(&mut self, seed: u64) {
        (**self).seed(seed)
    }

    #[inline]
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        (**self).clone_sampler(seed)
    }
}
