//! Samplers

#[macro_use]
extern crate log;

mod halton;
mod independent;

// Re-export.
pub use halton::*;
pub use independent::*;
