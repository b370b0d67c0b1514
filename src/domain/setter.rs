//! Dotted-key assignment into a tree.

use tracing::trace;

use crate::domain::error::DomainError;
use crate::domain::node::{Mapping, Node, Path};

/// Sets, updates or deletes the leaf named by `dotted_key`.
///
/// Intermediate mappings are created as needed (an explicit null counts as
/// missing). An empty `value` deletes the final key; mappings left empty by the
/// deletion are kept. A non-mapping value on the way fails with
/// [`DomainError::NotAMapping`]; mappings created before that point remain.
pub fn set_flat_key_value(
    root: &mut Mapping,
    dotted_key: &str,
    value: &str,
) -> Result<(), DomainError> {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = root;
    let mut path = Path::new();
    for segment in parents {
        path.push(*segment);
        let entry = current
            .entry((*segment).to_string())
            .or_insert_with(Node::mapping);
        if entry.is_null() {
            *entry = Node::mapping();
        }
        current = match entry {
            Node::Mapping(child) => child,
            other => {
                return Err(DomainError::NotAMapping {
                    path,
                    kind: other.kind(),
                })
            }
        };
    }

    if value.is_empty() {
        trace!(key = dotted_key, "deleting key");
        current.remove(*last);
    } else {
        trace!(key = dotted_key, "setting key");
        current.insert((*last).to_string(), Node::from(value));
    }

    Ok(())
}
