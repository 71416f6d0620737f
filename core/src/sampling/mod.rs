//! Sampling

mod continuous;
mod discrete;
mod hierarchical2d;
mod marginal2d;
mod params;
mod warp;

// Re-export
pub use continuous::*;
pub use discrete::*;
pub use hierarchical2d::*;
pub use marginal2d::*;
pub use params::*;
pub use warp::*;
