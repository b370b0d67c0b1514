//! Document formats and their codecs.
//!
//! Parsing and printing are delegated to serde crates; this module adds the
//! shared pre/post processing: key options are decoded after reading and
//! re-encoded before writing.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::application::env;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{normalize_keys, Direction, Node};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    Toml,
    Env,
}

/// Output knobs shared by the encoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub json_compact: bool,
    pub env_prefix: String,
    pub env_separator: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            json_compact: false,
            env_prefix: String::new(),
            env_separator: "_".into(),
        }
    }
}

impl From<&Settings> for EncodeOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            json_compact: settings.json_compact,
            env_prefix: settings.env_prefix.clone(),
            env_separator: settings.env_separator.clone(),
        }
    }
}

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Env => "env",
        }
    }

    /// Infers the format from a file extension; `None` for `-` or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" | "tfstate" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            "env" => Some(Format::Env),
            _ => None,
        }
    }

    /// Parses `input`, then strips key options from a mapping root.
    pub fn decode(self, input: &[u8]) -> ApplicationResult<Node> {
        let mut node = match self {
            Format::Json => serde_json::from_slice::<Node>(input).map_err(|e| self.decode_err(e))?,
            Format::Yaml => serde_yaml::from_slice::<Node>(input).map_err(|e| self.decode_err(e))?,
            Format::Toml => {
                let text = std::str::from_utf8(input).map_err(|e| self.decode_err(e))?;
                toml::from_str::<Node>(text).map_err(|e| self.decode_err(e))?
            }
            Format::Env => {
                let text = std::str::from_utf8(input).map_err(|e| self.decode_err(e))?;
                Node::Mapping(env::parse(text).map_err(|e| self.decode_err(e))?)
            }
        };

        if let Node::Mapping(root) = &mut node {
            normalize_keys(root, Direction::Decode);
        }
        debug!(format = %self, kind = %node.kind(), "decoded document");
        Ok(node)
    }

    /// Re-applies key options to a mapping root, then prints `node`.
    pub fn encode(self, mut node: Node, options: &EncodeOptions) -> ApplicationResult<Vec<u8>> {
        if let Node::Mapping(root) = &mut node {
            normalize_keys(root, Direction::Encode);
        }

        match self {
            Format::Json if options.json_compact => {
                serde_json::to_vec(&node).map_err(|e| self.encode_err(e))
            }
            Format::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                node.serialize(&mut serializer)
                    .map_err(|e| self.encode_err(e))?;
                buf.push(b'\n');
                Ok(buf)
            }
            Format::Yaml => serde_yaml::to_string(&node)
                .map(String::into_bytes)
                .map_err(|e| self.encode_err(e)),
            Format::Toml => toml::to_string_pretty(&node)
                .map(String::into_bytes)
                .map_err(|e| self.encode_err(e)),
            Format::Env => match &node {
                Node::Mapping(root) => {
                    Ok(env::render(root, &options.env_prefix, &options.env_separator).into_bytes())
                }
                other => Err(ApplicationError::NotAMapping {
                    role: "env output",
                    kind: other.kind(),
                }),
            },
        }
    }

    fn decode_err(self, e: impl std::error::Error + Send + Sync + 'static) -> ApplicationError {
        ApplicationError::Decode {
            format: self,
            source: Box::new(e),
        }
    }

    fn encode_err(self, e: impl std::error::Error + Send + Sync + 'static) -> ApplicationError {
        ApplicationError::Encode {
            format: self,
            source: Box::new(e),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            "env" => Ok(Format::Env),
            _ => Err(ApplicationError::UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_extensions_when_inferring_format_then_maps_aliases() {
        assert_eq!(Format::from_path(&PathBuf::from("a.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(&PathBuf::from("a.TFSTATE")), Some(Format::Json));
        assert_eq!(Format::from_path(&PathBuf::from("prod.env")), Some(Format::Env));
        assert_eq!(Format::from_path(&PathBuf::from("main.tf")), None);
        assert_eq!(Format::from_path(&PathBuf::from("-")), None);
    }

    #[test]
    fn given_type_names_when_parsing_then_accepts_known_formats() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("yml".parse::<Format>().unwrap(), Format::Yaml);
        assert!(matches!(
            "hcl".parse::<Format>(),
            Err(ApplicationError::UnknownFormat(name)) if name == "hcl"
        ));
    }

    #[test]
    fn given_json_with_b64_key_when_decoding_then_value_decoded_and_key_bare() {
        let node = Format::Json
            .decode(br#"{"secret[b64]": "aGk="}"#)
            .unwrap();
        assert_eq!(node.pointer(&["secret"]), Some(&Node::from("hi")));
    }

    #[test]
    fn given_mapping_when_encoding_pretty_json_then_tab_indented() {
        let node = Format::Json.decode(br#"{"a": {"b": 1}}"#).unwrap();

        let out = Format::Json.encode(node, &EncodeOptions::default()).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "{\n\t\"a\": {\n\t\t\"b\": 1\n\t}\n}\n");
    }

    #[test]
    fn given_compact_option_when_encoding_json_then_single_line() {
        let node = Format::Json.decode(br#"{"a": [1, 2]}"#).unwrap();
        let options = EncodeOptions {
            json_compact: true,
            ..EncodeOptions::default()
        };

        let out = Format::Json.encode(node, &options).unwrap();

        assert_eq!(out, br#"{"a":[1,2]}"#);
    }

    #[test]
    fn given_scalar_root_when_encoding_env_then_not_a_mapping() {
        let err = Format::Env
            .encode(Node::from("x"), &EncodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotAMapping { .. }));
    }

    #[test]
    fn given_null_value_when_encoding_toml_then_encode_error() {
        let node = Format::Json.decode(br#"{"a": null}"#).unwrap();
        let err = Format::Toml
            .encode(node, &EncodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Encode { format: Format::Toml, .. }));
    }
}
