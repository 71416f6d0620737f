//! Spectrum

mod rgb_spectrum;

// Re-export
pub use rgb_spectrum::*;

/// Media and phase functions operate on `RGBSpectrum` values.
pub type Spectrum = RGBSpectrum;

/// Number of samples used in `Spectrum`.
pub const SPECTRUM_SAMPLES: usize = RGB_SAMPLES;
