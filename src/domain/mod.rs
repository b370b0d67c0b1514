//! Domain layer: the tree model and the operations over it
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod merge;
pub mod node;
pub mod options;
pub mod serialize;
pub mod setter;
pub mod walk;

pub use error::{ConflictError, DomainError};
pub use merge::merge;
pub use node::{Mapping, Node, NodeKind, Path, Scalar, ELIDED_SEGMENT};
pub use options::{normalize_keys, parse_key_options, Direction, KeyOptions, BASE64_OPTION};
pub use setter::set_flat_key_value;
pub use walk::{flatten, for_each_leaf, walk, FlatMap, Leaf};
