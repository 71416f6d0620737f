//! Core

extern crate bitflags;
#[macro_use]
extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Declared first so its test macros are visible to the other modules.
#[macro_use]
pub mod geometry;

pub mod batch;
pub mod error;
pub mod interaction;
pub mod low_discrepancy;
pub mod medium;
pub mod paramset;
pub mod pbrt;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod spectrum;
pub mod stats;
pub mod volume;
