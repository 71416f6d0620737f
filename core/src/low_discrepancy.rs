//! Low Discrepancy Sequences
//!
//! Radical inverse in prime bases, with optional random digit scrambling.
//! These feed the Halton sampler and any warp that wants stratified input.

use crate::pbrt::*;
use crate::rng::RNG;

/// Number of prime bases available.
pub const PRIME_TABLE_SIZE: usize = 256;

/// The first `PRIME_TABLE_SIZE` primes.
#[rustfmt::skip]
pub const PRIMES: [u16; PRIME_TABLE_SIZE] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53,
    59, 61, 67, 71, 73, 79, 83, 89, 97, 101, 103, 107, 109, 113, 127, 131,
    137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193, 197, 199, 211, 223,
    227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307, 311,
    313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409,
    419, 421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503,
    509, 521, 523, 541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613,
    617, 619, 631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701, 709, 719,
    727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797, 809, 811, 821, 823, 827,
    829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911, 919, 929, 937, 941,
    947, 953, 967, 971, 977, 983, 991, 997, 1009, 1013, 1019, 1021, 1031, 1033, 1039, 1049,
    1051, 1061, 1063, 1069, 1087, 1091, 1093, 1097, 1103, 1109, 1117, 1123, 1129, 1151, 1153, 1163,
    1171, 1181, 1187, 1193, 1201, 1213, 1217, 1223, 1229, 1231, 1237, 1249, 1259, 1277, 1279, 1283,
    1289, 1291, 1297, 1301, 1303, 1307, 1319, 1321, 1327, 1361, 1367, 1373, 1381, 1399, 1409, 1423,
    1427, 1429, 1433, 1439, 1447, 1451, 1453, 1459, 1471, 1481, 1483, 1487, 1489, 1493, 1499, 1511,
    1523, 1531, 1543, 1549, 1553, 1559, 1567, 1571, 1579, 1583, 1597, 1601, 1607, 1609, 1613, 1619,
];

/// `PRIME_SUMS[i]` is the sum of the first `i` primes: the offset of the
/// permutation for base index `i` within a concatenated permutation table.
lazy_static! {
    pub static ref PRIME_SUMS: Vec<usize> = {
        let mut sums = Vec::with_capacity(PRIME_TABLE_SIZE + 1);
        let mut acc = 0_usize;
        sums.push(acc);
        for &p in PRIMES.iter() {
            acc += p as usize;
            sums.push(acc);
        }
        sums
    };
}

/// Reverses the bits of a 32-bit integer.
#[inline(always)]
pub fn reverse_bits_32(n: u32) -> u32 {
    n.reverse_bits()
}

/// Reverses the bits of a 64-bit integer.
#[inline(always)]
pub fn reverse_bits_64(n: u64) -> u64 {
    n.reverse_bits()
}

/// Reflects the base-`b` digits of `a` about the radix point. Base index 0
/// (base 2) reverses bits directly.
///
/// * `base_index` - Index into `PRIMES`.
/// * `a`          - Sample index.
pub fn radical_inverse(base_index: usize, a: u64) -> Float {
    assert!(
        base_index < PRIME_TABLE_SIZE,
        "radical_inverse() supports at most {} bases",
        PRIME_TABLE_SIZE
    );
    if base_index == 0 {
        return min(
            (reverse_bits_64(a) as f64 * hexf64!("0x1.0p-64")) as Float,
            ONE_MINUS_EPSILON,
        );
    }

    let base = PRIMES[base_index] as u64;
    let inv_base = 1.0 / base as f64;
    let mut reversed_digits = 0_u64;
    let mut inv_base_n = 1.0_f64;
    let mut a = a;
    while a != 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed_digits = reversed_digits * base + digit;
        inv_base_n *= inv_base;
        a = next;
    }
    min((reversed_digits as f64 * inv_base_n) as Float, ONE_MINUS_EPSILON)
}

/// Radical inverse with every digit (including the infinite tail of zero
/// digits) mapped through a permutation of `0..base`.
///
/// * `base_index` - Index into `PRIMES`.
/// * `a`          - Sample index.
/// * `perm`       - Digit permutation for the base.
pub fn scrambled_radical_inverse(base_index: usize, a: u64, perm: &[u16]) -> Float {
    let base = PRIMES[base_index] as u64;
    debug_assert!(perm.len() >= base as usize);

    let inv_base = 1.0 / base as f64;
    let mut reversed_digits = 0_u64;
    let mut inv_base_n = 1.0_f64;
    let mut a = a;
    while a != 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed_digits = reversed_digits * base + perm[digit as usize] as u64;
        inv_base_n *= inv_base;
        a = next;
    }

    // The remaining (zero) digits all map to `perm[0]`: a geometric series.
    let tail = inv_base * perm[0] as f64 / (1.0 - inv_base);
    min(
        (inv_base_n * (reversed_digits as f64 + tail)) as Float,
        ONE_MINUS_EPSILON,
    )
}

/// Recovers the sample index from the first `n_digits` reversed base-`base`
/// digits produced by `radical_inverse`.
///
/// * `base`     - The base.
/// * `inverse`  - Digits of the radical inverse read as an integer.
/// * `n_digits` - Number of digits.
pub fn inverse_radical_inverse(base: u64, inverse: u64, n_digits: u64) -> u64 {
    let mut inverse = inverse;
    let mut index = 0_u64;
    for _ in 0..n_digits {
        let digit = inverse % base;
        inverse /= base;
        index = index * base + digit;
    }
    index
}

/// Builds one random digit permutation per prime base, concatenated in
/// `PRIMES` order (see `PRIME_SUMS`).
///
/// * `rng` - Random number generator.
pub fn compute_radical_inverse_permutations(rng: &mut RNG) -> Vec<u16> {
    let mut perms: Vec<u16> = Vec::with_capacity(PRIME_SUMS[PRIME_TABLE_SIZE]);
    for &p in PRIMES.iter() {
        let start = perms.len();
        perms.extend(0..p);
        rng.shuffle(&mut perms[start..]);
    }
    perms
}

/// Radical inverse evaluator for all prime bases with a fixed set of random
/// digit permutations.
#[derive(Clone)]
pub struct RadicalInverse {
    /// Concatenated digit permutations.
    permutations: Vec<u16>,

    /// Inverse of each permutation, same layout as `permutations`.
    inverse_permutations: Vec<u16>,
}

impl RadicalInverse {
    /// Creates the permutation tables from a seeded random number generator.
    ///
    /// * `seed` - Seed; equal seeds give identical tables.
    pub fn new(seed: u64) -> Self {
        let mut rng = RNG::new(seed);
        let permutations = compute_radical_inverse_permutations(&mut rng);

        let mut inverse_permutations = vec![0_u16; permutations.len()];
        for (i, &p) in PRIMES.iter().enumerate() {
            let offset = PRIME_SUMS[i];
            for d in 0..p as usize {
                inverse_permutations[offset + permutations[offset + d] as usize] = d as u16;
            }
        }

        debug!(
            "Built radical inverse permutations for {} bases ({} entries)",
            PRIME_TABLE_SIZE,
            permutations.len()
        );
        Self {
            permutations,
            inverse_permutations,
        }
    }

    /// Number of supported bases.
    pub fn bases(&self) -> usize {
        PRIME_TABLE_SIZE
    }

    /// Unscrambled radical inverse of `index` in base `PRIMES[dim]`.
    ///
    /// * `dim`   - Base index.
    /// * `index` - Sample index.
    pub fn eval(&self, dim: usize, index: u64) -> Float {
        radical_inverse(dim, index)
    }

    /// Scrambled radical inverse of `index` in base `PRIMES[dim]`.
    ///
    /// * `dim`   - Base index.
    /// * `index` - Sample index.
    pub fn eval_scrambled(&self, dim: usize, index: u64) -> Float {
        scrambled_radical_inverse(dim, index, self.permutation(dim))
    }

    /// Digit permutation for base index `dim`.
    ///
    /// * `dim` - Base index.
    pub fn permutation(&self, dim: usize) -> &[u16] {
        assert!(dim < PRIME_TABLE_SIZE, "base index {} out of range", dim);
        &self.permutations[PRIME_SUMS[dim]..PRIME_SUMS[dim + 1]]
    }

    /// Inverse digit permutation for base index `dim`.
    ///
    /// * `dim` - Base index.
    pub fn inverse_permutation(&self, dim: usize) -> &[u16] {
        assert!(dim < PRIME_TABLE_SIZE, "base index {} out of range", dim);
        &self.inverse_permutations[PRIME_SUMS[dim]..PRIME_SUMS[dim + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn base_two_reverses_bits() {
        assert_eq!(radical_inverse(0, 0), 0.0);
        assert_eq!(radical_inverse(0, 1), 0.5);
        assert_eq!(radical_inverse(0, 2), 0.25);
        assert_eq!(radical_inverse(0, 3), 0.75);
        assert_eq!(radical_inverse(0, 4), 0.125);
    }

    #[test]
    fn base_three_digits() {
        assert!(approx_eq!(f32, radical_inverse(1, 1), 1.0 / 3.0, ulps = 2));
        assert!(approx_eq!(f32, radical_inverse(1, 2), 2.0 / 3.0, ulps = 2));
        assert!(approx_eq!(f32, radical_inverse(1, 3), 1.0 / 9.0, ulps = 2));
        assert!(approx_eq!(f32, radical_inverse(1, 5), 7.0 / 9.0, ulps = 2));
    }

    #[test]
    fn inverse_recovers_index() {
        // 11 in base 3 is 102; reversed digits read as 201_3 = 19.
        assert_eq!(inverse_radical_inverse(3, 19, 3), 11);
    }

    #[test]
    fn prime_sums_are_offsets() {
        assert_eq!(PRIME_SUMS[0], 0);
        assert_eq!(PRIME_SUMS[1], 2);
        assert_eq!(PRIME_SUMS[3], 10);
        assert_eq!(PRIME_SUMS[PRIME_TABLE_SIZE], 191755);
    }

    #[test]
    fn permutations_are_bijective() {
        let ri = RadicalInverse::new(0);
        for dim in [0, 1, 5, PRIME_TABLE_SIZE - 1] {
            let p = ri.permutation(dim);
            let inv = ri.inverse_permutation(dim);
            assert_eq!(p.len(), PRIMES[dim] as usize);
            for d in 0..p.len() {
                assert_eq!(inv[p[d] as usize] as usize, d);
            }
        }
    }

    #[test]
    fn scrambled_values_stay_in_unit_interval() {
        let ri = RadicalInverse::new(42);
        for dim in 0..16 {
            for i in 0..512_u64 {
                let v = ri.eval_scrambled(dim, i);
                assert!((0.0..1.0).contains(&v), "dim {} index {} -> {}", dim, i, v);
            }
        }
    }

    #[test]
    fn identity_permutation_matches_plain_inverse() {
        let identity: Vec<u16> = (0..5).collect();
        for i in 1..200_u64 {
            assert!(approx_eq!(
                f32,
                scrambled_radical_inverse(2, i, &identity),
                radical_inverse(2, i),
                epsilon = 1e-6
            ));
        }
    }
}
