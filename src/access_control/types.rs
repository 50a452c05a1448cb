//! Access control types
//!
//! Tool classification used by the authorization gate: every tool has a
//! category (which level of the notebook hierarchy it acts on) and an
//! operation type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of the hierarchy a tool acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Authentication, notebook discovery and selection. Always permitted.
    Auth,
    /// Operates on the selected notebook as a whole
    Notebook,
    /// Operates on a section
    Section,
    /// Operates on a page
    Page,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Auth => "auth",
            ToolCategory::Notebook => "notebook",
            ToolCategory::Section => "section",
            ToolCategory::Page => "page",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation type for determining read vs write access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOperation {
    /// Read operations (get, list, search)
    #[default]
    Read,
    /// Write operations (create, update, delete, copy, move)
    Write,
}

impl ToolOperation {
    pub const fn is_read_only(&self) -> bool {
        matches!(self, ToolOperation::Read)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ToolOperation::Read => "read",
            ToolOperation::Write => "write",
        }
    }

    /// Look up the operation for a tool name
    pub fn for_tool(tool_name: &str) -> Option<Self> {
        tool_spec(tool_name).map(|spec| spec.operation)
    }
}

impl fmt::Display for ToolOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static classification of one tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub category: ToolCategory,
    pub operation: ToolOperation,
}

const fn spec(name: &'static str, category: ToolCategory, operation: ToolOperation) -> ToolSpec {
    ToolSpec {
        name,
        category,
        operation,
    }
}

use ToolCategory::{Auth, Notebook, Page, Section};
use ToolOperation::{Read, Write};

/// The tool → operation table
pub const TOOL_SPECS: &[ToolSpec] = &[
    // Authentication and scope selection
    spec("getAuthStatus", Auth, Read),
    spec("initiateAuth", Auth, Write),
    spec("refreshAuth", Auth, Write),
    spec("clearAuth", Auth, Write),
    spec("listNotebooks", Auth, Read),
    spec("selectNotebook", Auth, Write),
    spec("getSelectedNotebook", Auth, Read),
    // Notebook-wide
    spec("listSections", Notebook, Read),
    spec("listSectionGroups", Notebook, Read),
    spec("searchPages", Notebook, Read),
    spec("createSectionGroup", Notebook, Write),
    // Sections
    spec("listPages", Section, Read),
    spec("createSection", Section, Write),
    // Pages
    spec("getPageContent", Page, Read),
    spec("listPageItems", Page, Read),
    spec("getPageItemContent", Page, Read),
    spec("findItem", Page, Read),
    spec("createPage", Page, Write),
    spec("quickNote", Page, Write),
    spec("updatePageContent", Page, Write),
    spec("updatePageContentAdvanced", Page, Write),
    spec("deletePage", Page, Write),
    spec("copyPage", Page, Write),
    spec("movePage", Page, Write),
];

/// Look up the static classification of a tool
pub fn tool_spec(tool_name: &str) -> Option<&'static ToolSpec> {
    TOOL_SPECS.iter().find(|spec| spec.name == tool_name)
}

/// Check if a tool belongs to the always-permitted auth category
pub fn is_auth_tool(tool_name: &str) -> bool {
    tool_spec(tool_name).is_some_and(|spec| spec.category == ToolCategory::Auth)
}
