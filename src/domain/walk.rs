//! Leaf traversal and flattening.
//!
//! Both traversals are depth-first over sorted mapping keys. Sequences are
//! visited as if they were mappings keyed by the stringified element index,
//! so one code path covers both kinds of nesting.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::domain::node::{Mapping, Node, Path, Scalar};

/// Flat, path-keyed view of a tree.
pub type FlatMap = BTreeMap<String, Scalar>;

/// A scalar leaf handed to a [`walk`] callback.
///
/// The callback may replace the value or rename the key within its parent
/// mapping. Renaming an element of a sequence has no effect: the index key
/// only exists for traversal.
#[derive(Debug)]
pub struct Leaf<'p> {
    path: &'p Path,
    value: Node,
    renamed: Option<String>,
}

impl<'p> Leaf<'p> {
    fn new(path: &'p Path, value: Node) -> Self {
        Self {
            path,
            value,
            renamed: None,
        }
    }

    /// Full path to this leaf, key included.
    pub fn path(&self) -> &Path {
        self.path
    }

    /// Key of this leaf in its parent.
    pub fn key(&self) -> &str {
        self.path.last().unwrap_or_default()
    }

    pub fn value(&self) -> &Node {
        &self.value
    }

    /// Replaces the value in place, returning the previous one.
    pub fn replace(&mut self, value: Node) -> Node {
        std::mem::replace(&mut self.value, value)
    }

    /// Rewrites the value through `f`.
    pub fn update(&mut self, f: impl FnOnce(Node) -> Node) {
        let value = std::mem::take(&mut self.value);
        self.value = f(value);
    }

    /// Moves the value to `key` within the same parent mapping.
    pub fn rename(&mut self, key: impl Into<String>) {
        self.renamed = Some(key.into());
    }
}

/// Visits every scalar leaf of `root` with a mutable [`Leaf`].
///
/// Keys are snapshotted per mapping before descending. A leaf moved by a
/// rename is never visited again, even when its new key sorts later. A
/// rename onto an existing sibling replaces that sibling.
pub fn walk<F>(root: &mut Mapping, mut visit: F)
where
    F: FnMut(&mut Leaf<'_>),
{
    let mut path = Path::new();
    walk_mapping(root, &mut path, &mut visit);
}

fn walk_mapping<F>(mapping: &mut Mapping, path: &mut Path, visit: &mut F)
where
    F: FnMut(&mut Leaf<'_>),
{
    let keys: Vec<String> = mapping.keys().cloned().collect();
    let mut moved = BTreeSet::new();
    for key in keys {
        if moved.contains(&key) {
            continue;
        }
        path.push(key.clone());
        if matches!(mapping.get(&key), Some(Node::Scalar(_))) {
            if let Some(value) = mapping.remove(&key) {
                let mut leaf = Leaf::new(path, value);
                visit(&mut leaf);
                let Leaf { value, renamed, .. } = leaf;
                match renamed.filter(|target| *target != key) {
                    Some(target) => {
                        if mapping.contains_key(&target) {
                            trace!(path = %path, key = %target, "rename replaces existing sibling");
                        }
                        mapping.insert(target.clone(), value);
                        moved.insert(target);
                    }
                    None => {
                        mapping.insert(key, value);
                    }
                }
            }
        } else if let Some(child) = mapping.get_mut(&key) {
            walk_node(child, path, visit);
        }
        path.pop();
    }
}

fn walk_sequence<F>(items: &mut [Node], path: &mut Path, visit: &mut F)
where
    F: FnMut(&mut Leaf<'_>),
{
    for (index, item) in items.iter_mut().enumerate() {
        path.push(index.to_string());
        if item.is_scalar() {
            let mut leaf = Leaf::new(path, std::mem::take(item));
            visit(&mut leaf);
            if leaf.renamed.is_some() {
                trace!(path = %path, "ignoring rename of sequence element");
            }
            *item = leaf.value;
        } else {
            walk_node(item, path, visit);
        }
        path.pop();
    }
}

fn walk_node<F>(node: &mut Node, path: &mut Path, visit: &mut F)
where
    F: FnMut(&mut Leaf<'_>),
{
    match node {
        Node::Mapping(m) => walk_mapping(m, path, visit),
        Node::Sequence(items) => walk_sequence(items, path, visit),
        Node::Scalar(_) => {}
    }
}

/// Read-only traversal: calls `visit` with the path and value of each leaf.
pub fn for_each_leaf<F>(root: &Mapping, mut visit: F)
where
    F: FnMut(&Path, &Scalar),
{
    let mut path = Path::new();
    visit_mapping(root, &mut path, &mut visit);
}

fn visit_mapping<F>(mapping: &Mapping, path: &mut Path, visit: &mut F)
where
    F: FnMut(&Path, &Scalar),
{
    for (key, value) in mapping {
        path.push(key.as_str());
        visit_node(value, path, visit);
        path.pop();
    }
}

fn visit_node<F>(node: &Node, path: &mut Path, visit: &mut F)
where
    F: FnMut(&Path, &Scalar),
{
    match node {
        Node::Scalar(s) => visit(path, s),
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                visit_node(item, path, visit);
                path.pop();
            }
        }
        Node::Mapping(m) => visit_mapping(m, path, visit),
    }
}

/// Flattens `root` into a map keyed by `sep`-joined paths.
///
/// Elided segments (`""`, `"-"`) are dropped from keys; a leaf whose key
/// renders empty is skipped. An empty tree yields an empty map.
pub fn flatten(root: &Mapping, sep: &str) -> FlatMap {
    let mut flat = FlatMap::new();
    for_each_leaf(root, |path, value| {
        let key = path.render(sep);
        if key.is_empty() {
            trace!(path = %path, "skipping leaf with empty flat key");
            return;
        }
        flat.insert(key, value.clone());
    });
    flat
}
