//! Key options: bracketed annotations embedded in mapping keys.
//!
//! `"password[b64]"` names the key `password` and asks for its string value to
//! be base64-encoded on output and decoded on input. Options take the form
//! `[name]` or `[name=value]` and may repeat: `"key[x=1][y=2]"`.

use std::collections::BTreeMap;

use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::trace;

use crate::domain::node::{Mapping, Node, Scalar};
use crate::domain::walk::walk;

/// Option name for base64 values.
pub const BASE64_OPTION: &str = "b64";

/// Standard alphabet with padding; decoding tolerates non-zero trailing bits.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Direction a document is travelling through a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Preparing a tree for output.
    Encode,
    /// After reading a tree in.
    Decode,
}

/// Options parsed from a single key; a later duplicate name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOptions(BTreeMap<String, String>);

impl KeyOptions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Applies the recognised options to `value`.
    ///
    /// Only string scalars are transformed; everything else passes through.
    pub fn apply(&self, value: Node, direction: Direction) -> Node {
        if !self.contains(BASE64_OPTION) {
            return value;
        }
        match value {
            Node::Scalar(Scalar::String(s)) => Node::from(match direction {
                Direction::Encode => encode_base64(s),
                Direction::Decode => decode_base64(s),
            }),
            other => other,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Splits `key` into its bare name and the options annotated on it.
///
/// Scans for the first `[` and the first `]` after it, records the token
/// between them and cuts the bracketed segment out, until no complete pair
/// is left. Unterminated brackets stay part of the bare key.
pub fn parse_key_options(key: &str) -> (String, KeyOptions) {
    let mut key = key.to_string();
    let mut options = KeyOptions::default();

    loop {
        let Some(open) = key.find('[') else {
            break;
        };
        let Some(close) = key[open..].find(']').map(|i| open + i) else {
            break;
        };

        let token = &key[open + 1..close];
        let (name, value) = token.split_once('=').unwrap_or((token, ""));
        options.insert(name, value);

        key = format!("{}{}", &key[..open], &key[close + 1..]);
    }

    (key, options)
}

/// Strips key options throughout `root`, applying their value transforms.
///
/// Only leaf keys are rewritten; an annotated key that holds a mapping or a
/// sequence keeps its annotation.
pub fn normalize_keys(root: &mut Mapping, direction: Direction) {
    walk(root, |leaf| {
        let (bare, options) = parse_key_options(leaf.key());
        if options.is_empty() {
            return;
        }
        trace!(path = %leaf.path(), key = %bare, ?direction, "applying key options");
        leaf.update(|value| options.apply(value, direction));
        leaf.rename(bare);
    });
}

/// Line breaks are skipped, so wrapped payloads decode.
fn decode_lenient(s: &str) -> Option<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    BASE64.decode(compact).ok()
}

/// Base64-encodes `s` unless it already is valid standard base64.
fn encode_base64(s: String) -> String {
    if decode_lenient(&s).is_some() {
        s
    } else {
        BASE64.encode(s.as_bytes())
    }
}

/// Decodes `s`, keeping it unchanged when it is not base64 of UTF-8 text.
fn decode_base64(s: String) -> String {
    decode_lenient(&s)
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or(s)
}
