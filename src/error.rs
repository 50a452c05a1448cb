//! Error types for notebook-gate
//!
//! This module defines the error hierarchy used throughout the crate.
//! Configuration errors are fatal at startup, access denials are expected
//! outcomes returned to the tool dispatcher, and lookup errors never leave
//! the context extractor.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Access denied: {0}")]
    AccessDenied(#[from] AccessDeniedError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Access control denial
///
/// Denials are recoverable: the caller can select another notebook or adjust
/// the policy and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Access denied for tool '{tool}': {reason}")]
pub struct AccessDeniedError {
    pub tool: String,
    pub reason: String,
}

impl AccessDeniedError {
    pub fn no_notebook_selected(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: "no notebook selected; select a notebook before using this tool".into(),
        }
    }

    pub fn notebook_not_permitted(tool: impl Into<String>, notebook: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: format!("notebook '{}' has no access permission", notebook.into()),
        }
    }

    /// Request names a notebook other than the selected one
    pub fn cross_notebook(
        tool: impl Into<String>,
        requested: impl Into<String>,
        selected: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            reason: format!(
                "cross-notebook access attempt: requested notebook '{}' but selected notebook is '{}'",
                requested.into(),
                selected.into()
            ),
        }
    }

    pub fn insufficient_permission(
        tool: impl Into<String>,
        operation: impl std::fmt::Display,
        level: impl std::fmt::Display,
    ) -> Self {
        Self {
            tool: tool.into(),
            reason: format!(
                "operation '{}' is not permitted with '{}' permission",
                operation, level
            ),
        }
    }

    /// A copy/move destination does not accept writes
    pub fn target_not_writable(tool: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: format!("target section '{}' does not permit writes", section.into()),
        }
    }

    /// A resource ID could not be resolved to a name
    pub fn unresolved_resource(tool: impl Into<String>, kind: &str, id: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: format!(
                "could not resolve the name of {} '{}'; access denied",
                kind,
                id.into()
            ),
        }
    }

    pub fn unknown_tool(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: "tool is not in the operation table".into(),
        }
    }
}

/// Notebook selection errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Notebook name must not be empty")]
    EmptyName,

    #[error("Access to notebook '{notebook}' is denied by the authorization policy")]
    NotebookDenied { notebook: String },
}

/// Name lookup failure reported by a notebook cache fallback
#[derive(Error, Debug, Clone)]
#[error("Lookup of {kind} '{id}' failed: {message}")]
pub struct LookupError {
    pub kind: &'static str,
    pub id: String,
    pub message: String,
}

impl LookupError {
    pub fn new(kind: &'static str, id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
