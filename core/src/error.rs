//! Errors

use crate::pbrt::Float;
use thiserror::Error;

/// Construction-time validation failures. Degenerate but legal runtime states
/// never produce one of these; they resolve to zero weights instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{field}: entry {index} is negative ({value})")]
    NegativeEntry {
        field: &'static str,
        index: usize,
        value: Float,
    },

    #[error("{field}: entry {index} is not finite ({value})")]
    NonFiniteEntry {
        field: &'static str,
        index: usize,
        value: Float,
    },

    #[error("{field}: no entries")]
    EmptyDistribution { field: &'static str },

    #[error("{field}: expected {expected} entries, got {actual}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field}: needs at least {min} entries, got {actual}")]
    TooFewEntries {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field}: nodes must be strictly increasing (entry {index})")]
    NonIncreasingNodes { field: &'static str, index: usize },

    #[error("{field}: invalid range [{min}, {max}]")]
    InvalidRange { field: &'static str, min: Float, max: Float },

    #[error("parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("unknown {kind} '{name}'")]
    UnknownVariant { kind: &'static str, name: String },
}

/// Result type for fallible construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Validates that every entry of a table is finite and non-negative.
///
/// * `field`  - Name of the table, used in the error.
/// * `values` - Table entries.
pub fn check_non_negative(field: &'static str, values: &[Float]) -> Result<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(Error::NonFiniteEntry { field, index, value });
        }
        if value < 0.0 {
            return Err(Error::NegativeEntry { field, index, value });
        }
    }
    Ok(())
}

/// Validates that a node list is strictly increasing.
///
/// * `field` - Name of the node list, used in the error.
/// * `nodes` - Node positions.
pub fn check_increasing(field: &'static str, nodes: &[Float]) -> Result<()> {
    for (index, w) in nodes.windows(2).enumerate() {
        if !(w[1] > w[0]) {
            return Err(Error::NonIncreasingNodes { field, index: index + 1 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_entry_reports_index() {
        let err = check_non_negative("pdf", &[1.0, 0.0, -2.0]).unwrap_err();
        assert_eq!(
            err,
            Error::NegativeEntry {
                field: "pdf",
                index: 2,
                value: -2.0
            }
        );
        assert_eq!(err.to_string(), "pdf: entry 2 is negative (-2)");
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(matches!(
            check_non_negative("pdf", &[Float::NAN]),
            Err(Error::NonFiniteEntry { index: 0, .. })
        ));
    }

    #[test]
    fn repeated_node_is_rejected() {
        assert!(check_increasing("nodes", &[0.0, 0.5, 1.0]).is_ok());
        assert_eq!(
            check_increasing("nodes", &[0.0, 0.5, 0.5]),
            Err(Error::NonIncreasingNodes {
                field: "nodes",
                index: 2
            })
        );
    }
}
