//! Session scope
//!
//! A session works inside exactly one notebook at a time. The selected
//! notebook and the permission it resolved to at selection time are kept
//! together and replaced together.

use crate::config::PermissionLevel;
use crate::error::SessionError;
use serde::Serialize;

/// The notebook a session is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedNotebook {
    pub name: String,
    pub permission: PermissionLevel,
}

/// Why a request falls outside the session scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeViolation {
    NoNotebookSelected,
    NotebookNotPermitted { notebook: String },
    CrossNotebook { requested: String, selected: String },
}

/// Holder of the single selected notebook
#[derive(Debug, Default)]
pub struct SessionScope {
    selected: Option<SelectedNotebook>,
}

impl SessionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a notebook with its already resolved permission
    ///
    /// Leaves the current selection untouched on error.
    pub fn select(
        &mut self,
        name: &str,
        permission: PermissionLevel,
    ) -> Result<&SelectedNotebook, SessionError> {
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        if permission == PermissionLevel::None {
            return Err(SessionError::NotebookDenied {
                notebook: name.to_string(),
            });
        }

        Ok(self.selected.insert(SelectedNotebook {
            name: name.to_string(),
            permission,
        }))
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&SelectedNotebook> {
        self.selected.as_ref()
    }

    pub fn current_notebook(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.name.as_str())
    }

    /// Check a request against the scope
    ///
    /// `requested` is the notebook named by the request, if any. A request
    /// that names no notebook is checked against the selection alone.
    pub fn check(&self, requested: Option<&str>) -> Result<&SelectedNotebook, ScopeViolation> {
        let selected = self
            .selected
            .as_ref()
            .ok_or(ScopeViolation::NoNotebookSelected)?;

        if selected.permission == PermissionLevel::None {
            return Err(ScopeViolation::NotebookNotPermitted {
                notebook: selected.name.clone(),
            });
        }

        if let Some(requested) = requested.filter(|n| !n.is_empty())
            && requested != selected.name
        {
            return Err(ScopeViolation::CrossNotebook {
                requested: requested.to_string(),
                selected: selected.name.clone(),
            });
        }

        Ok(selected)
    }
}
