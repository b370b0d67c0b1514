//! Tests for REFMT_* environment overrides
//!
//! Kept in their own test binary: the variables are process-wide.

use tempfile::TempDir;

use refmt::config::Settings;

#[test]
fn given_env_vars_when_loading_then_override_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("refmt.toml");
    std::fs::write(&path, "env_prefix = \"FILE_\"\njson_compact = false\n").unwrap();

    std::env::set_var("REFMT_ENV_PREFIX", "ENV_");
    std::env::set_var("REFMT_JSON_COMPACT", "true");
    std::env::set_var("REFMT_AUTO_DETECT_ORDER", "yaml,env");

    let result = Settings::load_from(Some(&path));

    std::env::remove_var("REFMT_ENV_PREFIX");
    std::env::remove_var("REFMT_JSON_COMPACT");
    std::env::remove_var("REFMT_AUTO_DETECT_ORDER");

    let settings = result.unwrap();
    assert_eq!(settings.env_prefix, "ENV_");
    assert!(settings.json_compact);
    assert_eq!(settings.auto_detect_order, ["yaml", "env"]);
    assert_eq!(settings.env_separator, "_");
}
