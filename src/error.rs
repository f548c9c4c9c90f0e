//! Layout failure modes.
//!
//! The engine has exactly one way to fail: the upstream translator handed
//! it a tree that violates the construction contract. Everything else the
//! search encounters is a decision, not an error.

use std::fmt;

/// Error aborting a layout computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The document tree violates a construction rule, e.g. a last level
    /// marked `CheckInner` whose behaviour does not prefer breaking its
    /// last inner level.
    MalformedTree(&'static str),
    /// An internal invariant did not hold while searching, e.g. inner
    /// levels were broken but no non-empty inner level could be found.
    Inconsistency(&'static str),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::MalformedTree(detail) => {
                write!(f, "malformed document tree: {detail}")
            }
            LayoutError::Inconsistency(detail) => {
                write!(f, "layout invariant violated: {detail}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        let err = LayoutError::MalformedTree("bad breakability");
        assert_eq!(
            err.to_string(),
            "malformed document tree: bad breakability"
        );
    }
}
