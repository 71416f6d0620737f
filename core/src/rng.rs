//! Random Number Generator.

use crate::pbrt::*;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 pseudo-random number generator.
#[derive(Clone, Debug)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl Default for RNG {
    /// Return a new instance of `RNG` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl RNG {
    /// Create a new `RNG` on the given stream.
    ///
    /// * `sequence_index` - The stream to select.
    pub fn new(sequence_index: u64) -> Self {
        let mut rng = Self { state: 0, inc: 0 };
        rng.seed(PCG32_DEFAULT_STATE, sequence_index);
        rng
    }

    /// Reinitialize the generator with an initial state and a stream index.
    ///
    /// * `init_state` - Initial state.
    /// * `init_seq`   - Stream index.
    pub fn seed(&mut self, init_state: u64, init_seq: u64) {
        self.state = 0;
        self.inc = init_seq.wrapping_shl(1) | 1;
        self.uniform_u32();
        self.state = self.state.wrapping_add(init_state);
        self.uniform_u32();
    }

    /// Returns a uniformly distributed u32 value.
    #[inline(always)]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value in `[0, bound)` without modulo
    /// bias.
    ///
    /// * `bound` - Exclusive upper bound; must be positive.
    pub fn bounded_u32(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.uniform_u32();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    /// Returns a uniformly distributed value over the half open interval [0.0, 1.0).
    pub fn uniform_float(&mut self) -> Float {
        min(self.uniform_u32() as Float * hexf32!("0x1.0p-32"), ONE_MINUS_EPSILON)
    }

    /// Multi-step advance of the generator in `O(log delta)`.
    ///
    /// * `delta` - Number of steps; wraps around the period.
    pub fn advance(&mut self, delta: i64) {
        let (mut cur_mult, mut cur_plus) = (PCG32_MULT, self.inc);
        let (mut acc_mult, mut acc_plus) = (1_u64, 0_u64);
        let mut delta = delta as u64;
        while delta > 0 {
            if delta & 1 != 0 {
                acc_mult = acc_mult.wrapping_mul(cur_mult);
                acc_plus = acc_plus.wrapping_mul(cur_mult).wrapping_add(cur_plus);
            }
            cur_plus = cur_mult.wrapping_add(1).wrapping_mul(cur_plus);
            cur_mult = cur_mult.wrapping_mul(cur_mult);
            delta /= 2;
        }
        self.state = acc_mult.wrapping_mul(self.state).wrapping_add(acc_plus);
    }

    /// Randomly permute a slice in place (Fisher-Yates).
    ///
    /// * `v` - The slice to shuffle.
    pub fn shuffle<T>(&mut self, v: &mut [T]) {
        for i in (1..v.len()).rev() {
            let other = self.bounded_u32((i + 1) as u32) as usize;
            v.swap(i, other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_are_in_unit_interval() {
        let mut rng = RNG::new(7);
        for _ in 0..10_000 {
            let u = rng.uniform_float();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn streams_differ() {
        let mut a = RNG::new(1);
        let mut b = RNG::new(2);
        let va: Vec<u32> = (0..8).map(|_| a.uniform_u32()).collect();
        let vb: Vec<u32> = (0..8).map(|_| b.uniform_u32()).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn advance_matches_stepping() {
        let mut a = RNG::new(3);
        let mut b = a.clone();
        for _ in 0..37 {
            a.uniform_u32();
        }
        b.advance(37);
        assert_eq!(a.uniform_u32(), b.uniform_u32());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = RNG::default();
        let mut v: Vec<u16> = (0..31).collect();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..31).collect::<Vec<u16>>());
    }
}
