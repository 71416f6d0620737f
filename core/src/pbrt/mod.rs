//! Numeric prelude shared by every crate in the workspace.

mod common;
mod interval;

// Re-export
pub use common::*;
pub use interval::*;
