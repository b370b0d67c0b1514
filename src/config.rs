//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/refmt/refmt.toml`
//! 3. Environment variables: `REFMT_*` prefix
//! 4. Command-line flags (applied by the CLI)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, Format};

/// Raw settings for intermediate parsing.
///
/// `None` means "not specified, inherit from the layer below".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output_type: Option<String>,
    pub env_prefix: Option<String>,
    pub env_separator: Option<String>,
    pub json_compact: Option<bool>,
    pub decode_base64_input: Option<bool>,
    pub auto_detect_order: Option<Vec<String>>,
}

/// Unified configuration for refmt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Output format when the output path has no known extension
    pub output_type: Option<String>,
    /// Prefix for every emitted env variable
    pub env_prefix: String,
    /// Separator joining nested keys in env output
    pub env_separator: String,
    /// One-line JSON output
    pub json_compact: bool,
    /// Try decoding a whole input document as base64 before parsing
    pub decode_base64_input: bool,
    /// Formats tried in order when the input type is unknown
    pub auto_detect_order: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_type: None,
            env_prefix: String::new(),
            env_separator: "_".into(),
            json_compact: false,
            decode_base64_input: true,
            auto_detect_order: vec!["json".into(), "toml".into(), "yaml".into(), "env".into()],
        }
    }
}

/// Get the XDG config directory for refmt.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "refmt").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("refmt.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Apply a config file layer; specified values replace the current ones.
    pub fn apply(&self, raw: &RawSettings) -> Self {
        Self {
            output_type: raw.output_type.clone().or_else(|| self.output_type.clone()),
            env_prefix: raw
                .env_prefix
                .clone()
                .unwrap_or_else(|| self.env_prefix.clone()),
            env_separator: raw
                .env_separator
                .clone()
                .unwrap_or_else(|| self.env_separator.clone()),
            json_compact: raw.json_compact.unwrap_or(self.json_compact),
            decode_base64_input: raw.decode_base64_input.unwrap_or(self.decode_base64_input),
            auto_detect_order: raw
                .auto_detect_order
                .clone()
                .unwrap_or_else(|| self.auto_detect_order.clone()),
        }
    }

    /// Load settings from the global config location and the environment.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings with layered precedence, reading `config_path` if it exists.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_path.filter(|p| p.exists()) {
            let raw = load_raw_settings(path)?;
            current = current.apply(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;

        Ok(current)
    }

    /// Apply REFMT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("REFMT")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auto_detect_order"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output_type") {
            settings.output_type = Some(val);
        }
        if let Ok(val) = config.get_string("env_prefix") {
            settings.env_prefix = val;
        }
        if let Ok(val) = config.get_string("env_separator") {
            settings.env_separator = val;
        }
        if let Ok(val) = config.get_bool("json_compact") {
            settings.json_compact = val;
        }
        if let Ok(val) = config.get_bool("decode_base64_input") {
            settings.decode_base64_input = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("auto_detect_order") {
            settings.auto_detect_order = val;
        }

        Ok(settings)
    }

    /// Reject format names no codec exists for.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let names = self.output_type.iter().chain(&self.auto_detect_order);
        for name in names {
            name.parse::<Format>().map_err(|e| ApplicationError::Config {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# refmt configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/refmt/refmt.toml
#   Env:    REFMT_* environment variables (e.g. REFMT_JSON_COMPACT=true)
#   Flags:  command-line options

# Output format when the output path has no known extension (stdout)
# output_type = "yaml"

# Env output: prefix for every variable and separator for nested keys
# env_prefix = "APP_"
# env_separator = "_"

# Print JSON on a single line
# json_compact = false

# Accept whole documents that arrive base64-encoded
# decode_base64_input = true

# Formats tried in order when the input type cannot be inferred
# auto_detect_order = ["json", "toml", "yaml", "env"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_matches_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.output_type, None);
        assert_eq!(settings.env_separator, "_");
        assert!(settings.decode_base64_input);
        assert_eq!(settings.auto_detect_order, ["json", "toml", "yaml", "env"]);
    }

    #[test]
    fn given_partial_raw_settings_when_applying_then_only_specified_replace() {
        let raw = RawSettings {
            env_prefix: Some("APP_".into()),
            auto_detect_order: Some(vec!["yaml".into()]),
            ..RawSettings::default()
        };

        let result = Settings::default().apply(&raw);

        assert_eq!(result.env_prefix, "APP_");
        assert_eq!(result.auto_detect_order, ["yaml"]);
        assert_eq!(result.env_separator, "_");
        assert!(!result.json_compact);
    }

    #[test]
    fn given_unknown_output_type_when_validating_then_config_error() {
        let settings = Settings {
            output_type: Some("hcl".into()),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.output_type.is_none());
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips() {
        let settings = Settings {
            output_type: Some("yaml".into()),
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
