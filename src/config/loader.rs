//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (NOTEBOOK_GATE__*)
//! 2. Configuration file (TOML or JSON, chosen by extension)
//! 3. Default values

use crate::access_control::PermissionResolver;
use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "notebook-gate.toml",
    "notebook-gate.json",
    ".notebook-gate.toml",
    "~/.config/notebook-gate/config.toml",
    "~/.config/notebook-gate/config.json",
    "/etc/notebook-gate/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from a JSON string
pub fn load_config_from_json_str(json_str: &str) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig =
        serde_json::from_str(json_str).map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, file_format(path)));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, file_format(&expanded)));
                break;
            }
        }
    }

    // 3. Add environment variables with NOTEBOOK_GATE prefix
    // e.g., NOTEBOOK_GATE__AUTHORIZATION__ENABLED=true
    // Double underscore (__) maps to nested keys (authorization.enabled)
    builder = builder.add_source(
        Environment::with_prefix("NOTEBOOK_GATE")
            .separator("__")
            .try_parsing(true),
    );

    // Build and deserialize
    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn file_format(path: &str) -> FileFormat {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("json") => FileFormat::Json,
        _ => FileFormat::Toml,
    }
}

/// Validate configuration values
///
/// Every pattern table is compiled once so a bad pattern fails startup
/// instead of the first request.
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    PermissionResolver::new(&config.authorization)?;

    let level = config.logging.level.to_ascii_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        return Err(ConfigError::Invalid {
            message: format!(
                "logging.level must be one of trace, debug, info, warn, error, got: {}",
                config.logging.level
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, PermissionLevel};

    #[test]
    fn test_load_config_from_str_basic() {
        let toml = r#"
[authorization]
enabled = true
default_notebook_permissions = "none"

[authorization.notebook_permissions]
"Work*" = "write"
"#;

        let config = load_config_from_str(toml).unwrap();
        assert!(config.authorization.enabled);
        assert_eq!(
            config.authorization.default_notebook_permissions,
            PermissionLevel::None
        );
        assert_eq!(
            config.authorization.notebook_permissions.get("Work*"),
            Some(&PermissionLevel::Write)
        );
    }

    #[test]
    fn test_load_config_from_json_str() {
        let json = r#"{
            "authorization": {
                "enabled": true,
                "default_notebook_permissions": "read",
                "section_permissions": {"*/Confidential": "none"}
            },
            "logging": {"level": "debug", "format": "json"}
        }"#;

        let config = load_config_from_json_str(json).unwrap();
        assert_eq!(
            config.authorization.section_permissions.get("*/Confidential"),
            Some(&PermissionLevel::None)
        );
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_permission_level() {
        let toml = r#"
[authorization.page_permissions]
"Secret*" = "admin"
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Load(msg)) if msg.contains("admin")));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let json = r#"{"authorization": {"notebook_permissions": {"/": "read"}}}"#;

        let result = load_config_from_json_str(json);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPattern { pattern, .. }) if pattern == "/"
        ));
    }

    #[test]
    fn test_invalid_log_level() {
        let toml = r#"
[logging]
level = "loud"
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_file_format_from_extension() {
        assert_eq!(file_format("config.json"), FileFormat::Json);
        assert_eq!(file_format("config.toml"), FileFormat::Toml);
        assert_eq!(file_format("config"), FileFormat::Toml);
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = load_config(Some("/nonexistent/notebook-gate.toml"));
        assert!(matches!(result, Err(ConfigError::Load(msg)) if msg.contains("not found")));
    }
}
