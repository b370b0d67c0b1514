//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::{Node, NodeKind, Path};

/// Structural type mismatch found while merging two trees.
///
/// Carries the path from the root to the conflicting key together with the
/// value seen in each input.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "unable to merge incompatible values for key \"{path}\": in={}, out={}",
    .input.kind(),
    .output.kind()
)]
pub struct ConflictError {
    pub path: Path,
    pub input: Node,
    pub output: Node,
}

impl ConflictError {
    pub fn new(path: Path, input: Node, output: Node) -> Self {
        Self {
            path,
            input,
            output,
        }
    }
}

/// Domain errors raised by the tree operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("key is not an object: \"{path}\" holds a {kind}")]
    NotAMapping { path: Path, kind: NodeKind },
}
