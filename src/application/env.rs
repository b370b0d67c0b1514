//! Env-variable lists: `KEY=value` lines in and out.

use thiserror::Error;

use crate::domain::{flatten, Mapping, Node};

/// Error parsing an env list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct EnvParseError {
    pub line: usize,
    pub message: String,
}

/// Parses env content into a flat mapping of strings.
///
/// Accepts `KEY=value` and `export KEY=value` lines. Blank lines and `#`
/// comments are skipped, trailing comments and surrounding quotes are
/// stripped from values. Any other line is an error.
pub fn parse(content: &str) -> Result<Mapping, EnvParseError> {
    let mut variables = Mapping::new();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let assignment = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value)) = parse_env_line(assignment) else {
            return Err(EnvParseError {
                line: index + 1,
                message: format!("expected KEY=value, found {trimmed:?}"),
            });
        };
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(EnvParseError {
                line: index + 1,
                message: format!("invalid variable name {key:?}"),
            });
        }
        variables.insert(key.to_string(), Node::from(value));
    }

    Ok(variables)
}

/// Renders `root` as sorted `PREFIXKEY=value` lines, keys upper-cased.
pub fn render(root: &Mapping, prefix: &str, separator: &str) -> String {
    flatten(root, separator)
        .into_iter()
        .map(|(key, value)| format!("{}{}={}\n", prefix, key.to_uppercase(), value))
        .collect()
}

/// Parse a single environment variable line.
/// Returns (key, value) with trailing comments and quotes stripped from value.
fn parse_env_line(line: &str) -> Option<(&str, String)> {
    let (key, value) = line.split_once('=')?;
    let value = strip_trailing_comment(value);
    Some((key.trim(), strip_quotes(value)))
}

/// Strip trailing comment from a value, respecting quotes.
/// `'value'  # comment` → `'value'`
/// `'val#ue'` → `'val#ue'`
fn strip_trailing_comment(s: &str) -> &str {
    let s = s.trim();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for (i, c) in s.char_indices() {
        match c {
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            // only a `#` after whitespace starts a comment
            '#' if !in_single_quote
                && !in_double_quote
                && s[..i].ends_with(char::is_whitespace) =>
            {
                return s[..i].trim_end();
            }
            _ => {}
        }
    }
    s
}

/// Strip surrounding quotes (single or double) from a value.
fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    s.to_string()
}
