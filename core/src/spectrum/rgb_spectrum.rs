//! RGB Spectrum

use crate::pbrt::*;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub};

/// Number of channels in an `RGBSpectrum`.
pub const RGB_SAMPLES: usize = 3;

/// Spectral quantity sampled at three colour channels. Channel `i` is what
/// free-flight sampling refers to when it is handed a `channel` index.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// All channels zero.
    pub const ZERO: Self = Self { c: [0.0; RGB_SAMPLES] };

    /// All channels one.
    pub const ONE: Self = Self { c: [1.0; RGB_SAMPLES] };

    /// Create a spectrally uniform value.
    ///
    /// * `v` - Value for every channel.
    pub fn new(v: Float) -> Self {
        Self { c: [v; RGB_SAMPLES] }
    }

    /// Create a spectrum from its three channel values.
    pub fn from_rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the channel values.
    pub fn samples(&self) -> &[Float; RGB_SAMPLES] {
        &self.c
    }

    /// Applies `f` to every channel.
    ///
    /// * `f` - Function to apply.
    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self {
            c: [f(self.c[0]), f(self.c[1]), f(self.c[2])],
        }
    }

    /// Combines two spectra channel by channel.
    ///
    /// * `other` - Second operand.
    /// * `f`     - Combining function.
    pub fn zip_map<F: Fn(Float, Float) -> Float>(&self, other: &Self, f: F) -> Self {
        Self {
            c: [
                f(self.c[0], other.c[0]),
                f(self.c[1], other.c[1]),
                f(self.c[2], other.c[2]),
            ],
        }
    }

    /// Returns `true` if all channels are zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }

    /// Returns `true` if any channel is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns `true` if every channel holds the same value.
    pub fn is_uniform(&self) -> bool {
        self.c.iter().all(|&v| v == self.c[0])
    }

    /// Largest channel value.
    pub fn max_value(&self) -> Float {
        self.c.iter().fold(-INFINITY, |a, &b| max(a, b))
    }

    /// Smallest channel value.
    pub fn min_value(&self) -> Float {
        self.c.iter().fold(INFINITY, |a, &b| min(a, b))
    }

    /// Mean of the channel values.
    pub fn average(&self) -> Float {
        self.c.iter().sum::<Float>() / RGB_SAMPLES as Float
    }

    /// Per-channel `e^x`.
    pub fn exp(&self) -> Self {
        self.map(Float::exp)
    }

    /// Per-channel absolute value.
    pub fn abs(&self) -> Self {
        self.map(Float::abs)
    }

    /// Per-channel clamp.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        self.map(|v| clamp(v, low, high))
    }

    /// Replaces NaN and infinite channels by zero.
    pub fn sanitize(&self) -> Self {
        self.map(sanitize)
    }

    /// Per-channel division where a zero denominator yields zero.
    ///
    /// * `den` - Denominator.
    pub fn safe_div(&self, den: &Self) -> Self {
        self.zip_map(den, safe_div)
    }

    /// Per-channel select: channels of `a` where `mask` is `true`,
    /// otherwise channels of `b`.
    pub fn select(mask: [bool; RGB_SAMPLES], a: &Self, b: &Self) -> Self {
        Self {
            c: [
                if mask[0] { a.c[0] } else { b.c[0] },
                if mask[1] { a.c[1] } else { b.c[1] },
                if mask[2] { a.c[2] } else { b.c[2] },
            ],
        }
    }
}

impl From<Float> for RGBSpectrum {
    fn from(v: Float) -> Self {
        Self::new(v)
    }
}

impl From<[Float; RGB_SAMPLES]> for RGBSpectrum {
    fn from(c: [Float; RGB_SAMPLES]) -> Self {
        Self { c }
    }
}

/// Generates channel-wise binary operators against another spectrum and
/// against a scalar.
macro_rules! spectrum_binop {
    ($trait: ident, $func: ident, $op: tt) => {
        impl $trait for RGBSpectrum {
            type Output = Self;

            fn $func(self, other: Self) -> Self::Output {
                self.zip_map(&other, |a, b| a $op b)
            }
        }

        impl $trait<Float> for RGBSpectrum {
            type Output = Self;

            fn $func(self, f: Float) -> Self::Output {
                self.map(|a| a $op f)
            }
        }

        impl $trait<RGBSpectrum> for Float {
            type Output = RGBSpectrum;

            fn $func(self, s: RGBSpectrum) -> Self::Output {
                s.map(|a| self $op a)
            }
        }
    };
}

spectrum_binop!(Add, add, +);
spectrum_binop!(Sub, sub, -);
spectrum_binop!(Mul, mul, *);
spectrum_binop!(Div, div, /);

impl AddAssign for RGBSpectrum {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Neg for RGBSpectrum {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(|v| -v)
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    /// Returns the value of channel `i`.
    ///
    /// * `i` - Channel index.
    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    /// Returns a mutable reference to channel `i`.
    ///
    /// * `i` - Channel index.
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

impl fmt::Display for RGBSpectrum {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reductions() {
        let s = RGBSpectrum::from_rgb(1.0, -2.0, 4.0);
        assert_eq!(s.max_value(), 4.0);
        assert_eq!(s.min_value(), -2.0);
        assert_eq!(s.average(), 1.0);
        assert!(!s.is_uniform());
        assert!(RGBSpectrum::new(3.0).is_uniform());
    }

    #[test]
    fn arithmetic_with_scalars() {
        let s = RGBSpectrum::from_rgb(1.0, 2.0, 3.0);
        assert_eq!(2.0 * s, RGBSpectrum::from_rgb(2.0, 4.0, 6.0));
        assert_eq!(s / 2.0, RGBSpectrum::from_rgb(0.5, 1.0, 1.5));
        assert_eq!(1.0 - s, RGBSpectrum::from_rgb(0.0, -1.0, -2.0));
    }

    #[test]
    fn sanitize_and_safe_div_remove_non_finite() {
        let num = RGBSpectrum::from_rgb(1.0, 0.0, 2.0);
        let den = RGBSpectrum::from_rgb(0.0, 0.0, 4.0);
        assert_eq!(num.safe_div(&den), RGBSpectrum::from_rgb(0.0, 0.0, 0.5));
        let bad = RGBSpectrum::from_rgb(Float::NAN, INFINITY, 1.0);
        assert_eq!(bad.sanitize(), RGBSpectrum::from_rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn select_mixes_channels() {
        let a = RGBSpectrum::new(1.0);
        let b = RGBSpectrum::new(2.0);
        assert_eq!(
            RGBSpectrum::select([true, false, true], &a, &b),
            RGBSpectrum::from_rgb(1.0, 2.0, 1.0)
        );
    }
}
