//! Site configuration module.
//!
//! Handles loading, validating, and merging `academy.toml` files. Stock
//! defaults are overridden by an optional config file in the content
//! root.
//!
//! ## Config File Location
//!
//! Place `academy.toml` in the content root:
//!
//! ```text
//! content/
//! ├── academy.toml             # Overrides stock defaults (optional)
//! ├── modules/
//! ├── lessons/
//! └── scenarios/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content"  # Path to content directory
//!
//! [validation]
//! lesson_min_words = 50     # Reject lessons shorter than this
//! lesson_max_words = 10000  # Reject lessons longer than this
//!
//! [ai]
//! provider = "claude"       # Which AI backend generates draft content
//! # model = "claude-3-5-sonnet-20241022"  # Omit for the provider default
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want.
//!
//! ```toml
//! # Only tighten the lesson length floor
//! [validation]
//! lesson_min_words = 100
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `academy.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcademyConfig {
    /// Path to the content root directory.
    #[serde(default = "default_content_root")]
    pub content_root: String,
    /// Lesson-content validation bounds.
    pub validation: ValidationConfig,
    /// AI provider selection for draft-content generation.
    pub ai: AiConfig,
}

fn default_content_root() -> String {
    "content".to_string()
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            validation: ValidationConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl AcademyConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.lesson_min_words == 0 {
            return Err(ConfigError::Validation(
                "validation.lesson_min_words must be at least 1".into(),
            ));
        }
        if self.validation.lesson_min_words > self.validation.lesson_max_words {
            return Err(ConfigError::Validation(
                "validation.lesson_min_words must not exceed lesson_max_words".into(),
            ));
        }
        if self.ai.provider.is_empty() {
            return Err(ConfigError::Validation(
                "ai.provider must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Word-count bounds applied to lesson markdown during content checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Lessons with fewer words than this fail the content check.
    pub lesson_min_words: usize,
    /// Lessons with more words than this fail the content check.
    pub lesson_max_words: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            lesson_min_words: 50,
            lesson_max_words: 10_000,
        }
    }
}

/// AI backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiConfig {
    /// Provider name: `claude`, `gemini`, or `openai`.
    pub provider: String,
    /// Model override. When absent each provider uses its own default.
    pub model: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "claude".to_string(),
            model: None,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AcademyConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load an `academy.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `academy.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("academy.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AcademyConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AcademyConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `academy.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<AcademyConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Load config from an explicit file path.
///
/// Unlike [`load_config`], a missing file is an error here: pointing
/// `--config` at nothing is a mistake worth surfacing.
pub fn load_config_file(path: &Path) -> Result<AcademyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `academy.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Ops Academy Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as academy.toml in the content root. Each key only
# needs to appear when you want to override its default.
# Unknown keys will cause an error.

# Path to the content directory.
content_root = "content"

# ---------------------------------------------------------------------------
# Content validation
# ---------------------------------------------------------------------------
[validation]
# Lessons with fewer words than this fail the content check.
lesson_min_words = 50

# Lessons with more words than this fail the content check.
lesson_max_words = 10000

# ---------------------------------------------------------------------------
# AI generation
# ---------------------------------------------------------------------------
[ai]
# Which backend generates draft content: claude, gemini, or openai.
provider = "claude"

# Model override. Omit or comment out to use the provider's default.
# model = "claude-3-5-sonnet-20241022"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        AcademyConfig::default().validate().unwrap();
    }

    #[test]
    fn default_values() {
        let config = AcademyConfig::default();
        assert_eq!(config.content_root, "content");
        assert_eq!(config.validation.lesson_min_words, 50);
        assert_eq!(config.validation.lesson_max_words, 10_000);
        assert_eq!(config.ai.provider, "claude");
        assert_eq!(config.ai.model, None);
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, AcademyConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("academy.toml"),
            "[validation]\nlesson_min_words = 100\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.validation.lesson_min_words, 100);
        assert_eq!(config.validation.lesson_max_words, 10_000);
        assert_eq!(config.ai.provider, "claude");
    }

    #[test]
    fn full_override() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("academy.toml"),
            r#"
content_root = "curriculum"

[validation]
lesson_min_words = 30
lesson_max_words = 5000

[ai]
provider = "gemini"
model = "gemini-1.5-pro"
"#,
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.content_root, "curriculum");
        assert_eq!(config.validation.lesson_min_words, 30);
        assert_eq!(config.validation.lesson_max_words, 5000);
        assert_eq!(config.ai.provider, "gemini");
        assert_eq!(config.ai.model.as_deref(), Some("gemini-1.5-pro"));
    }

    #[test]
    fn unknown_top_level_key_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("academy.toml"), "contnet_root = \"x\"\n").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("academy.toml"),
            "[validation]\nlesson_min_wrods = 10\n",
        )
        .unwrap();
        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("academy.toml"), "not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(dir.path()).unwrap_err(),
            ConfigError::Toml(_)
        ));
    }

    // =========================================================================
    // load_config_file
    // =========================================================================

    #[test]
    fn explicit_file_loads_from_any_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("elsewhere.toml");
        fs::write(&path, "[validation]\nlesson_min_words = 25\n").unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.validation.lesson_min_words, 25);
        assert_eq!(config.ai.provider, "claude");
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = load_config_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    // =========================================================================
    // load_raw_config
    // =========================================================================

    #[test]
    fn raw_config_absent_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_raw_config(dir.path()).unwrap().is_none());
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_overlay_scalar_wins() {
        let base = toml::from_str::<toml::Value>("a = 1\nb = 2").unwrap();
        let overlay = toml::from_str::<toml::Value>("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_nested_tables_key_by_key() {
        let base = toml::from_str::<toml::Value>(
            "[validation]\nlesson_min_words = 50\nlesson_max_words = 10000",
        )
        .unwrap();
        let overlay = toml::from_str::<toml::Value>("[validation]\nlesson_min_words = 25").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(
            merged["validation"]["lesson_min_words"].as_integer(),
            Some(25)
        );
        assert_eq!(
            merged["validation"]["lesson_max_words"].as_integer(),
            Some(10000)
        );
    }

    #[test]
    fn merge_preserves_base_only_keys() {
        let base = toml::from_str::<toml::Value>("[ai]\nprovider = \"claude\"").unwrap();
        let overlay = toml::from_str::<toml::Value>("[validation]\nlesson_min_words = 10").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["ai"]["provider"].as_str(), Some("claude"));
        assert_eq!(
            merged["validation"]["lesson_min_words"].as_integer(),
            Some(10)
        );
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn zero_min_words_rejected() {
        let mut config = AcademyConfig::default();
        config.validation.lesson_min_words = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn min_words_above_max_rejected() {
        let mut config = AcademyConfig::default();
        config.validation.lesson_min_words = 20_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lesson_min_words"));
    }

    #[test]
    fn empty_provider_rejected() {
        let mut config = AcademyConfig::default();
        config.ai.provider = String::new();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_toml_parses_to_defaults() {
        let parsed: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value(), Some(parsed)).unwrap();
        assert_eq!(config, AcademyConfig::default());
    }

    #[test]
    fn stock_toml_loads_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("academy.toml"), stock_config_toml()).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, AcademyConfig::default());
    }
}
