//! Two-way recursive merge.

use std::collections::VecDeque;

use tracing::trace;

use crate::domain::error::ConflictError;
use crate::domain::node::{Mapping, Node, Path};

/// Folds `input` into `out` in place.
///
/// Per key of `input`:
/// - a mapping is assigned when `out` has nothing there, merged recursively
///   into a mapping, and conflicts with anything else;
/// - a sequence is assigned when `out` has nothing there, appended to a
///   sequence (`out` elements first, no dedup), and conflicts with anything else;
/// - a scalar always overwrites.
///
/// An explicit null in `out` counts as nothing. Mappings are processed
/// breadth-first and the first conflict aborts the merge. Changes made
/// before the conflict stay in `out`: clone it first if you need rollback.
pub fn merge(input: Mapping, out: &mut Mapping) -> Result<(), ConflictError> {
    let mut queue = VecDeque::from([(Path::new(), input)]);

    while let Some((path, input)) = queue.pop_front() {
        // only paths that name a mapping on both sides are ever queued
        let Some(target) = descend_mut(out, &path) else {
            continue;
        };
        trace!(path = %path, keys = input.len(), "merging mapping");

        for (key, value) in input {
            let child = path.child(key.as_str());
            match value {
                Node::Mapping(incoming) => match target.get_mut(&key) {
                    Some(Node::Mapping(_)) => queue.push_back((child, incoming)),
                    Some(existing) if !existing.is_null() => {
                        return Err(ConflictError::new(
                            child,
                            Node::Mapping(incoming),
                            existing.clone(),
                        ));
                    }
                    _ => {
                        target.insert(key, Node::Mapping(incoming));
                    }
                },
                Node::Sequence(incoming) => match target.get_mut(&key) {
                    Some(Node::Sequence(existing)) => existing.extend(incoming),
                    Some(existing) if !existing.is_null() => {
                        return Err(ConflictError::new(
                            child,
                            Node::Sequence(incoming),
                            existing.clone(),
                        ));
                    }
                    _ => {
                        target.insert(key, Node::Sequence(incoming));
                    }
                },
                scalar @ Node::Scalar(_) => {
                    target.insert(key, scalar);
                }
            }
        }
    }

    Ok(())
}

fn descend_mut<'a>(root: &'a mut Mapping, path: &Path) -> Option<&'a mut Mapping> {
    path.segments()
        .iter()
        .try_fold(root, |mapping, segment| match mapping.get_mut(segment) {
            Some(Node::Mapping(child)) => Some(child),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: serde_json::Value) -> Mapping {
        serde_json::from_value::<Node>(value)
            .unwrap()
            .into_mapping()
            .unwrap()
    }

    #[test]
    fn given_mapping_over_scalar_when_merging_then_conflict_at_key() {
        let mut out = mapping(json!({"a": 1}));

        let err = merge(mapping(json!({"a": {"b": 2}})), &mut out).unwrap_err();

        assert_eq!(err.path.segments(), ["a"]);
        assert_eq!(err.input, Node::Mapping(mapping(json!({"b": 2}))));
        assert_eq!(err.output, Node::from(1_i64));
    }

    #[test]
    fn given_sequences_when_merging_then_concatenates_out_first() {
        let mut out = mapping(json!({"a": [3]}));

        merge(mapping(json!({"a": [1, 2]})), &mut out).unwrap();
        assert_eq!(out, mapping(json!({"a": [3, 1, 2]})));

        merge(mapping(json!({"a": [1, 2]})), &mut out).unwrap();
        assert_eq!(out, mapping(json!({"a": [3, 1, 2, 1, 2]})));
    }

    #[test]
    fn given_missing_branch_when_merging_then_assigns_whole_subtree() {
        let mut out = Mapping::new();
        merge(mapping(json!({"a": {"x": 1}})), &mut out).unwrap();
        assert_eq!(out, mapping(json!({"a": {"x": 1}})));
    }

    #[test]
    fn given_scalar_over_structure_when_merging_then_scalar_wins() {
        let mut out = mapping(json!({"a": {"deep": true}, "b": [1], "c": "old"}));

        merge(mapping(json!({"a": 1, "b": null, "c": "new"})), &mut out).unwrap();

        assert_eq!(out, mapping(json!({"a": 1, "b": null, "c": "new"})));
    }

    #[test]
    fn given_null_in_out_when_merging_structure_then_treated_as_absent() {
        let mut out = mapping(json!({"a": null, "b": null}));
        merge(mapping(json!({"a": {"x": 1}, "b": [1]})), &mut out).unwrap();
        assert_eq!(out, mapping(json!({"a": {"x": 1}, "b": [1]})));
    }

    #[test]
    fn given_deep_trees_when_merging_then_recurses_per_key() {
        let mut out = mapping(json!({"db": {"host": "a", "opts": {"ssl": false}}, "keep": 1}));

        merge(
            mapping(json!({"db": {"port": 5432, "opts": {"ssl": true}}})),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            out,
            mapping(json!({
                "db": {"host": "a", "port": 5432, "opts": {"ssl": true}},
                "keep": 1
            }))
        );
    }

    #[test]
    fn given_sequence_over_mapping_when_merging_then_conflict() {
        let mut out = mapping(json!({"x": {"y": {"z": {}}}}));

        let err = merge(mapping(json!({"x": {"y": {"z": [1]}}})), &mut out).unwrap_err();

        assert_eq!(err.path.to_string(), "x.y.z");
        assert_eq!(err.input.kind().as_str(), "sequence");
        assert_eq!(err.output.kind().as_str(), "mapping");
        assert!(err.to_string().contains("x.y.z"));
        assert!(err.to_string().contains("in=sequence, out=mapping"));
    }

    #[test]
    fn given_conflict_when_merging_then_earlier_changes_remain() {
        let mut out = mapping(json!({"b": "scalar"}));

        let result = merge(mapping(json!({"a": 1, "b": {"c": 2}})), &mut out);

        assert!(result.is_err());
        assert_eq!(out.get("a"), Some(&Node::from(1_i64)));
    }
}
