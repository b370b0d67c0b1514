//! Document service
//!
//! Reads documents from files or stdin, runs the tree operations on them and
//! writes the result back out.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, instrument, trace};

use crate::application::{
    ApplicationError, ApplicationResult, EncodeOptions, Format, IoResultExt,
};
use crate::config::Settings;
use crate::domain::{merge, set_flat_key_value, DomainError, Mapping, Node};
use crate::infrastructure::traits::{FileSystem, Stdio};

/// Path argument standing for stdin (input) or stdout (output).
pub const STDIO_PATH: &str = "-";

/// Service converting, merging and editing structured documents.
pub struct FormatService {
    fs: Arc<dyn FileSystem>,
    stdio: Arc<dyn Stdio>,
    settings: Arc<Settings>,
}

impl FormatService {
    pub fn new(fs: Arc<dyn FileSystem>, stdio: Arc<dyn Stdio>, settings: Arc<Settings>) -> Self {
        Self {
            fs,
            stdio,
            settings,
        }
    }

    /// Re-encodes `input` into the format of `output`.
    #[instrument(level = "debug", skip(self))]
    pub fn convert(&self, input: &Path, output: &Path) -> ApplicationResult<()> {
        let node = self.read_document(input)?;
        self.write_document(output, node)
    }

    /// Merges `mixin` into `original` and writes the result to `output`.
    ///
    /// A missing or empty `original` is treated as an empty mapping.
    #[instrument(level = "debug", skip(self))]
    pub fn merge(&self, original: &Path, mixin: &Path, output: &Path) -> ApplicationResult<()> {
        let (_, mut out) = self.read_mapping_or_empty(original, "original")?;
        let input = into_mapping(self.read_document(mixin)?, "mixin")?;

        merge(input, &mut out).map_err(DomainError::from)?;
        debug!(keys = out.len(), "merged documents");

        self.write_document(output, Node::Mapping(out))
    }

    /// Sets the dotted `key` to `value` in `file`, in place.
    ///
    /// The file keeps its format; a missing or empty file starts out empty.
    #[instrument(level = "debug", skip(self))]
    pub fn set(&self, file: &Path, key: &str, value: &str) -> ApplicationResult<()> {
        let (format, mut root) = self.read_mapping_or_empty(file, "target")?;

        set_flat_key_value(&mut root, key, value).map_err(|source| {
            ApplicationError::SetFailed {
                key: key.to_string(),
                value: value.to_string(),
                source,
            }
        })?;

        let format = match format {
            Some(format) => format,
            None => self.output_format(file)?,
        };
        self.write_as(file, format, Node::Mapping(root))
    }

    /// Reads and decodes the document at `path` (`-` for stdin).
    pub fn read_document(&self, path: &Path) -> ApplicationResult<Node> {
        let raw = self.read_bytes(path)?;
        self.decode(path, &raw).map(|(_, node)| node)
    }

    /// Encodes `node` for `path` and writes it (`-` for stdout).
    pub fn write_document(&self, path: &Path, node: Node) -> ApplicationResult<()> {
        let format = self.output_format(path)?;
        self.write_as(path, format, node)
    }

    /// Output format for `path`: its extension, else the configured `output_type`.
    pub fn output_format(&self, path: &Path) -> ApplicationResult<Format> {
        if let Some(format) = Format::from_path(path) {
            return Ok(format);
        }
        match &self.settings.output_type {
            Some(name) => name.parse(),
            None => Err(ApplicationError::UnknownFormat(
                path.display().to_string(),
            )),
        }
    }

    fn read_mapping_or_empty(
        &self,
        path: &Path,
        role: &'static str,
    ) -> ApplicationResult<(Option<Format>, Mapping)> {
        if !is_stdio(path) && !self.fs.exists(path) {
            debug!(path = %path.display(), "{} not found, starting empty", role);
            return Ok((Format::from_path(path), Mapping::new()));
        }

        let raw = self.read_bytes(path)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            debug!(path = %path.display(), "{} is empty, starting empty", role);
            return Ok((Format::from_path(path), Mapping::new()));
        }

        let (format, node) = self.decode(path, &raw)?;
        Ok((Some(format), into_mapping(node, role)?))
    }

    fn decode(&self, path: &Path, raw: &[u8]) -> ApplicationResult<(Format, Node)> {
        let unwrapped = if self.settings.decode_base64_input {
            sniff_base64(raw)
        } else {
            None
        };
        let raw = unwrapped.as_deref().unwrap_or(raw);

        match Format::from_path(path) {
            Some(format) => Ok((format, format.decode(raw)?)),
            None => self.auto_detect(raw),
        }
    }

    /// Tries each configured format in turn.
    ///
    /// A candidate yielding a bare scalar is only kept when no later one
    /// yields a structure; YAML reads almost any text as a string.
    fn auto_detect(&self, raw: &[u8]) -> ApplicationResult<(Format, Node)> {
        let order = self
            .settings
            .auto_detect_order
            .iter()
            .map(|name| name.parse::<Format>())
            .collect::<ApplicationResult<Vec<_>>>()?;

        let mut fallback = None;
        let mut last_error = None;
        for format in order {
            match format.decode(raw) {
                Ok(node) if node.is_scalar() => {
                    trace!(%format, "candidate produced a scalar");
                    if fallback.is_none() {
                        fallback = Some((format, node));
                    }
                }
                Ok(node) => {
                    debug!(%format, "detected input format");
                    return Ok((format, node));
                }
                Err(e) => {
                    trace!(%format, error = %e, "candidate rejected");
                    last_error = Some(e);
                }
            }
        }

        match (fallback, last_error) {
            (Some(found), _) => Ok(found),
            (None, Some(e)) => Err(e),
            (None, None) => Err(ApplicationError::Config {
                message: "auto_detect_order is empty".into(),
            }),
        }
    }

    fn write_as(&self, path: &Path, format: Format, node: Node) -> ApplicationResult<()> {
        let options = EncodeOptions::from(self.settings.as_ref());
        let bytes = format.encode(node, &options)?;
        debug!(path = %path.display(), %format, bytes = bytes.len(), "writing document");

        if is_stdio(path) {
            self.stdio
                .write_stdout(&bytes)
                .with_path_context("write", path)
        } else {
            self.fs.write(path, &bytes).with_path_context("write", path)
        }
    }

    fn read_bytes(&self, path: &Path) -> ApplicationResult<Vec<u8>> {
        if is_stdio(path) {
            self.stdio.read_stdin().with_path_context("read", path)
        } else {
            self.fs.read(path).with_path_context("read", path)
        }
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

fn into_mapping(node: Node, role: &'static str) -> ApplicationResult<Mapping> {
    node.into_mapping()
        .map_err(|other| ApplicationError::NotAMapping {
            role,
            kind: other.kind(),
        })
}

/// Decodes a whole document that arrived base64-encoded.
fn sniff_base64(raw: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(raw).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    let decoded = STANDARD.decode(text).ok()?;
    std::str::from_utf8(&decoded).ok()?;
    trace!(bytes = decoded.len(), "input was base64-encoded");
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_base64_document_when_sniffing_then_decoded() {
        let decoded = sniff_base64(b"eyJhIjogMX0=\n").unwrap();
        assert_eq!(decoded, br#"{"a": 1}"#);
    }

    #[test]
    fn given_json_document_when_sniffing_then_none() {
        assert_eq!(sniff_base64(br#"{"a": 1}"#), None);
        assert_eq!(sniff_base64(b"   "), None);
    }

    #[test]
    fn given_dash_when_checking_stdio_then_true() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("./-")));
    }
}
