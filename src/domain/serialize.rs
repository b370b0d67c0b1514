//! serde bridge for the tree model.
//!
//! Every format codec goes through these impls, so a decoder never hands the
//! core anything beyond the three node kinds.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::node::{Mapping, Node, Scalar};

/// Field name toml uses to smuggle datetimes through `deserialize_any`.
const TOML_DATETIME_FIELD: &str = "$__toml_private_datetime";

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Integer(n) => serializer.serialize_i64(*n),
            Scalar::Float(n) => serializer.serialize_f64(*n),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(s) => s.serialize(serializer),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, sequence or mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Integer(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        let scalar = match i64::try_from(v) {
            Ok(n) => Scalar::Integer(n),
            Err(_) => Scalar::Float(v as f64),
        };
        Ok(Node::Scalar(scalar))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::from(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut mapping = Mapping::new();
        while let Some(MapKey(key)) = map.next_key::<MapKey>()? {
            let value = map.next_value::<Node>()?;
            mapping.insert(key, value);
        }

        // toml datetimes arrive as a single-entry map; keep them as strings
        if mapping.len() == 1 {
            if let Some(Node::Scalar(Scalar::String(_))) = mapping.get(TOML_DATETIME_FIELD) {
                if let Some(datetime) = mapping.remove(TOML_DATETIME_FIELD) {
                    return Ok(datetime);
                }
            }
        }

        Ok(Node::Mapping(mapping))
    }
}

/// Mapping key; scalar keys of any kind (YAML `1:` or `true:`) are stringified.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MapKeyVisitor).map(MapKey)
    }
}

struct MapKeyVisitor;

impl<'de> Visitor<'de> for MapKeyVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar mapping key")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_json_value_when_deserializing_then_builds_tree() {
        let node: Node =
            serde_json::from_value(json!({"a": {"b": [1, 2.5, "x", null, true]}})).unwrap();

        let items = node.pointer(&["a", "b"]).and_then(Node::as_sequence).unwrap();
        assert_eq!(items[0], Node::from(1_i64));
        assert_eq!(items[1], Node::from(2.5));
        assert_eq!(items[2], Node::from("x"));
        assert!(items[3].is_null());
        assert_eq!(items[4], Node::from(true));
    }

    #[test]
    fn given_yaml_with_non_string_keys_when_deserializing_then_stringifies_keys() {
        let node: Node = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let root = node.as_mapping().unwrap();
        assert_eq!(root.get("1"), Some(&Node::from("one")));
        assert_eq!(root.get("true"), Some(&Node::from("yes")));
    }

    #[test]
    fn given_toml_datetime_when_deserializing_then_keeps_it_as_string() {
        let node: Node = toml::from_str("at = 1979-05-27T07:32:00Z\n").unwrap();
        assert_eq!(
            node.pointer(&["at"]),
            Some(&Node::from("1979-05-27T07:32:00Z"))
        );
    }

    #[test]
    fn given_tree_when_serializing_to_json_then_keys_are_sorted() {
        let node: Node = serde_json::from_str(r#"{"b": 1, "a": [null]}"#).unwrap();
        assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"a":[null],"b":1}"#);
    }

    #[test]
    fn given_u64_beyond_i64_when_deserializing_then_falls_back_to_float() {
        let node: Node = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(node.kind(), crate::domain::NodeKind::Float);
    }
}
