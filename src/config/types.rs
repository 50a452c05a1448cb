//! Configuration types for notebook-gate
//!
//! This module defines the configuration structure that can be loaded from
//! TOML or JSON files and/or environment variables.

use crate::access_control::ToolOperation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Authorization policy
    pub authorization: AuthorizationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Authorization policy configuration
///
/// Each permission table maps a pattern to a permission level. Patterns
/// support exact names, a single trailing or leading `*`, `*` inside a name
/// (does not cross `/`), and `**` (crosses `/`).
///
/// ```toml
/// [authorization]
/// enabled = true
/// default_notebook_permissions = "read"
///
/// [authorization.notebook_permissions]
/// "Work*" = "write"
/// "Private*" = "none"
///
/// [authorization.section_permissions]
/// "*/Confidential" = "none"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Whether authorization is enforced at all
    pub enabled: bool,

    /// Permission for notebooks no notebook pattern matches
    pub default_notebook_permissions: PermissionLevel,

    /// Notebook name patterns
    pub notebook_permissions: HashMap<String, PermissionLevel>,

    /// Section name patterns (bare name or `notebook/section`)
    pub section_permissions: HashMap<String, PermissionLevel>,

    /// Page title patterns
    pub page_permissions: HashMap<String, PermissionLevel>,

    /// Deny tools missing from the operation table instead of treating them as reads
    pub deny_unknown_tools: bool,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_notebook_permissions: PermissionLevel::Read,
            notebook_permissions: HashMap::new(),
            section_permissions: HashMap::new(),
            page_permissions: HashMap::new(),
            deny_unknown_tools: false,
        }
    }
}

/// Permission level granted by a pattern or default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// No access
    #[default]
    None,
    /// Read-only operations
    Read,
    /// Read and write operations
    Write,
    /// Same as `Write` for every current operation
    Full,
}

impl PermissionLevel {
    pub const fn allows_read(&self) -> bool {
        !matches!(self, PermissionLevel::None)
    }

    pub const fn allows_write(&self) -> bool {
        matches!(self, PermissionLevel::Write | PermissionLevel::Full)
    }

    /// Whether this level permits `operation`
    pub const fn allows(&self, operation: ToolOperation) -> bool {
        if operation.is_read_only() {
            self.allows_read()
        } else {
            self.allows_write()
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::None => "none",
            PermissionLevel::Read => "read",
            PermissionLevel::Write => "write",
            PermissionLevel::Full => "full",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(PermissionLevel::None),
            "read" => Ok(PermissionLevel::Read),
            "write" => Ok(PermissionLevel::Write),
            "full" => Ok(PermissionLevel::Full),
            other => Err(format!(
                "invalid permission level '{}', expected one of: none, read, write, full",
                other
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
