//! Tree model: the common representation every format decodes into.
//!
//! A document is a [`Node`]: a scalar, an ordered sequence, or a mapping with
//! unique string keys. Mappings are `BTreeMap`s, so every traversal over them
//! runs in sorted key order without relying on hash iteration.

use std::collections::BTreeMap;
use std::fmt;

/// Key-unique mapping, iterated in sorted key order.
pub type Mapping = BTreeMap<String, Node>;

/// Leaf value of a tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A node of a decoded configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

/// Discriminant of a [`Node`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Sequence,
    Mapping,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Scalar {
    pub fn kind(&self) -> NodeKind {
        match self {
            Scalar::Null => NodeKind::Null,
            Scalar::Bool(_) => NodeKind::Bool,
            Scalar::Integer(_) => NodeKind::Integer,
            Scalar::Float(_) => NodeKind::Float,
            Scalar::String(_) => NodeKind::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Flat rendering used for env output: strings raw, `Null` as empty.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::Scalar(Scalar::Null)
    }
}

impl Node {
    /// Empty mapping node.
    pub fn mapping() -> Self {
        Node::Mapping(Mapping::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Scalar(s) => s.kind(),
            Node::Sequence(_) => NodeKind::Sequence,
            Node::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => s.as_str(),
            _ => None,
        }
    }

    /// Unwraps a mapping root, handing the node back otherwise.
    pub fn into_mapping(self) -> Result<Mapping, Node> {
        match self {
            Node::Mapping(m) => Ok(m),
            other => Err(other),
        }
    }

    /// Follows `segments` through nested mappings and sequence indices.
    pub fn pointer<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Node> {
        segments.iter().try_fold(self, |node, segment| match node {
            Node::Mapping(m) => m.get(segment.as_ref()),
            Node::Sequence(items) => segment
                .as_ref()
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i)),
            Node::Scalar(_) => None,
        })
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Node::Scalar(s)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(Scalar::String(s))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Scalar(Scalar::Integer(n))
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Scalar(Scalar::Float(n))
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl From<Mapping> for Node {
    fn from(m: Mapping) -> Self {
        Node::Mapping(m)
    }
}

/// Position of a node from the tree root.
///
/// Every raw segment is kept so traversal sees the full structure. Segments
/// equal to `""` or `"-"` are elided when the path is rendered into a flat key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

/// Segment marker that stays in the path but never in a rendered key.
pub const ELIDED_SEGMENT: &str = "-";

impl Path {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// New path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Joins the non-elided segments with `sep`.
    pub fn render(&self, sep: &str) -> String {
        self.0
            .iter()
            .filter(|s| !is_elided(s))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

fn is_elided(segment: &str) -> bool {
    segment.is_empty() || segment == ELIDED_SEGMENT
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_elided_segments_when_rendering_then_skips_them() {
        let path: Path = ["a", "-", "", "b"].into_iter().collect();
        assert_eq!(path.render("_"), "a_b");
        assert_eq!(path.len(), 4);
        assert_eq!(path.to_string(), "a.-..b");
    }

    #[test]
    fn given_only_elided_segments_when_rendering_then_empty() {
        let path: Path = ["-", ""].into_iter().collect();
        assert_eq!(path.render("."), "");
    }

    #[test]
    fn given_scalars_when_displaying_then_renders_flat_text() {
        assert_eq!(Scalar::Null.to_string(), "");
        assert_eq!(Scalar::Bool(true).to_string(), "true");
        assert_eq!(Scalar::Integer(-3).to_string(), "-3");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
        assert_eq!(Scalar::String("x y".into()).to_string(), "x y");
    }

    #[test]
    fn given_nested_node_when_following_pointer_then_finds_leaf() {
        let mut inner = Mapping::new();
        inner.insert("c".into(), Node::from(vec![Node::from(1_i64), Node::from(2_i64)]));
        let mut root = Mapping::new();
        root.insert("a".into(), Node::Mapping(inner));
        let root = Node::Mapping(root);

        assert_eq!(root.pointer(&["a", "c", "1"]), Some(&Node::from(2_i64)));
        assert_eq!(root.pointer(&["a", "x"]), None);
        assert_eq!(root.pointer(&["a", "c", "9"]), None);
    }

    #[test]
    fn given_nodes_when_asking_kind_then_reports_variant() {
        assert_eq!(Node::default().kind(), NodeKind::Null);
        assert_eq!(Node::mapping().kind().to_string(), "mapping");
        assert_eq!(Node::from(vec![]).kind(), NodeKind::Sequence);
        assert_eq!(Node::from("s").kind(), NodeKind::String);
    }
}
