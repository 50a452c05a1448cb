//! Permission resolver
//!
//! Resolves the effective permission of a resource with the following
//! precedence (highest to lowest):
//! 1. Page patterns (page title, then `section/page`, then `notebook/section/page`)
//! 2. Section patterns (section name, then `notebook/section`)
//! 3. The selected notebook's permission
//!
//! The selected notebook's permission was itself resolved from notebook
//! patterns, then the configured default, when it was selected.
//!
//! A resource that is referenced by ID but whose name could not be resolved
//! resolves to `none` whenever its name could have changed the outcome.
//! The same holds for a page whose containing section is unknown while
//! section rules are configured.

use crate::access_control::context::ResourceContext;
use crate::access_control::patterns::PatternSet;
use crate::access_control::session::SelectedNotebook;
use crate::access_control::types::ToolOperation;
use crate::config::{AuthorizationConfig, PermissionLevel};
use crate::error::{AccessDeniedError, ConfigError};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Where a resolved permission came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSource {
    PagePattern(String),
    SectionPattern(String),
    NotebookPattern(String),
    Default,
    SelectedNotebook(String),
    NoNotebookSelected,
    UnresolvedPage(String),
    UnresolvedSection(String),
    /// Page ID whose containing section is unknown
    UnknownPageSection(String),
}

impl PermissionSource {
    /// The unresolved resource kind and ID, if resolution failed closed
    pub fn unresolved(&self) -> Option<(&'static str, &str)> {
        match self {
            PermissionSource::UnresolvedPage(id) => Some(("page", id)),
            PermissionSource::UnresolvedSection(id) => Some(("section", id)),
            PermissionSource::UnknownPageSection(id) => Some(("the section of page", id)),
            _ => None,
        }
    }
}

impl fmt::Display for PermissionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionSource::PagePattern(p) => write!(f, "page pattern '{}'", p),
            PermissionSource::SectionPattern(p) => write!(f, "section pattern '{}'", p),
            PermissionSource::NotebookPattern(p) => write!(f, "notebook pattern '{}'", p),
            PermissionSource::Default => write!(f, "default notebook permission"),
            PermissionSource::SelectedNotebook(n) => write!(f, "selected notebook '{}'", n),
            PermissionSource::NoNotebookSelected => write!(f, "no notebook selected"),
            PermissionSource::UnresolvedPage(id) => write!(f, "unresolved page '{}'", id),
            PermissionSource::UnresolvedSection(id) => write!(f, "unresolved section '{}'", id),
            PermissionSource::UnknownPageSection(id) => {
                write!(f, "unknown section of page '{}'", id)
            }
        }
    }
}

/// Permission plus its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub permission: PermissionLevel,
    pub source: PermissionSource,
}

impl Resolution {
    fn new(permission: PermissionLevel, source: PermissionSource) -> Self {
        Self { permission, source }
    }

    fn denied(source: PermissionSource) -> Self {
        Self::new(PermissionLevel::None, source)
    }

    /// Deny `tool` unless this resolution permits `operation`
    ///
    /// Fail-closed resolutions name the resource that could not be resolved.
    pub fn require(&self, tool: &str, operation: ToolOperation) -> Result<(), AccessDeniedError> {
        if self.permission.allows(operation) {
            return Ok(());
        }

        match self.source.unresolved() {
            Some((kind, id)) => Err(AccessDeniedError::unresolved_resource(tool, kind, id)),
            None => Err(AccessDeniedError::insufficient_permission(
                tool,
                operation,
                self.permission,
            )),
        }
    }
}

/// Compiled authorization policy
#[derive(Debug)]
pub struct PermissionResolver {
    default_permission: PermissionLevel,
    notebooks: PatternSet,
    sections: PatternSet,
    pages: PatternSet,
}

impl PermissionResolver {
    /// Compile all pattern tables of a configuration
    pub fn new(config: &AuthorizationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            default_permission: config.default_notebook_permissions,
            notebooks: compile_table(
                &config.notebook_permissions,
                "authorization.notebook_permissions",
            )?,
            sections: compile_table(
                &config.section_permissions,
                "authorization.section_permissions",
            )?,
            pages: compile_table(&config.page_permissions, "authorization.page_permissions")?,
        })
    }

    /// A resolver with no patterns and the given default
    pub fn with_default(default_permission: PermissionLevel) -> Self {
        Self {
            default_permission,
            notebooks: PatternSet::empty(),
            sections: PatternSet::empty(),
            pages: PatternSet::empty(),
        }
    }

    pub fn default_permission(&self) -> PermissionLevel {
        self.default_permission
    }

    pub fn notebook_patterns(&self) -> &PatternSet {
        &self.notebooks
    }

    pub fn section_patterns(&self) -> &PatternSet {
        &self.sections
    }

    pub fn page_patterns(&self) -> &PatternSet {
        &self.pages
    }

    /// Permission of a notebook: notebook patterns, then the default
    pub fn notebook_permission(&self, notebook: &str) -> PermissionLevel {
        self.explain_notebook(notebook).permission
    }

    pub fn explain_notebook(&self, notebook: &str) -> Resolution {
        match self.notebooks.find_match(notebook) {
            Some(hit) => {
                trace!(notebook, pattern = hit.pattern, "Matched notebook pattern");
                Resolution::new(
                    hit.permission,
                    PermissionSource::NotebookPattern(hit.pattern.to_string()),
                )
            }
            None => Resolution::new(self.default_permission, PermissionSource::Default),
        }
    }

    /// Effective permission of the resource described by `ctx`
    pub fn resolve(
        &self,
        ctx: &ResourceContext,
        selected: Option<&SelectedNotebook>,
    ) -> PermissionLevel {
        self.explain(ctx, selected).permission
    }

    /// Like [`resolve`](Self::resolve), also reporting which rule decided
    pub fn explain(
        &self,
        ctx: &ResourceContext,
        selected: Option<&SelectedNotebook>,
    ) -> Resolution {
        let notebook = ctx
            .notebook()
            .or_else(|| selected.map(|s| s.name.as_str()));

        if let Some(page_id) = ctx.unresolved_page_id() {
            // Without a notebook nothing identifies the page; with page rules
            // configured the unknown title could have matched one of them
            if ctx.notebook().is_none() || !self.pages.is_empty() {
                trace!(page_id, "Page name unresolved, failing closed");
                return Resolution::denied(PermissionSource::UnresolvedPage(page_id.to_string()));
            }
        }

        if let Some(section_id) = ctx.unresolved_section_id() {
            trace!(section_id, "Section name unresolved, failing closed");
            return Resolution::denied(PermissionSource::UnresolvedSection(
                section_id.to_string(),
            ));
        }

        if let Some(page) = ctx.page()
            && let Some(resolution) = self.match_page(notebook, ctx.section(), page)
        {
            return resolution;
        }

        // A section rule could cover the page's unknown section
        if let Some(page_id) = ctx.page_without_section()
            && !self.sections.is_empty()
        {
            trace!(page_id, "Page section unknown, failing closed");
            return Resolution::denied(PermissionSource::UnknownPageSection(page_id.to_string()));
        }

        if let Some(section) = ctx.section()
            && let Some(resolution) = self.match_section(notebook, section)
        {
            return resolution;
        }

        match selected {
            Some(selected) => {
                trace!(notebook = %selected.name, "Using selected notebook permission");
                Resolution::new(
                    selected.permission,
                    PermissionSource::SelectedNotebook(selected.name.clone()),
                )
            }
            None => Resolution::denied(PermissionSource::NoNotebookSelected),
        }
    }

    /// Resolve the copy/move destination of `ctx`, if it has one
    pub fn explain_target(
        &self,
        ctx: &ResourceContext,
        selected: Option<&SelectedNotebook>,
    ) -> Option<Resolution> {
        if !ctx.has_target() {
            return None;
        }

        if let Some(section_id) = ctx.unresolved_target_section_id() {
            return Some(Resolution::denied(PermissionSource::UnresolvedSection(
                section_id.to_string(),
            )));
        }

        let mut target = ResourceContext::new(ctx.operation);
        target.notebook_name = ctx.notebook_name.clone();
        target.section_name = ctx.target_section_name.clone();
        Some(self.explain(&target, selected))
    }

    fn match_page(
        &self,
        notebook: Option<&str>,
        section: Option<&str>,
        page: &str,
    ) -> Option<Resolution> {
        let mut candidates = vec![page.to_string()];
        if let Some(section) = section {
            candidates.push(format!("{}/{}", section, page));
            if let Some(notebook) = notebook {
                candidates.push(format!("{}/{}/{}", notebook, section, page));
            }
        }

        candidates.iter().find_map(|candidate| {
            self.pages.find_match(candidate).map(|hit| {
                trace!(candidate = %candidate, pattern = hit.pattern, "Matched page pattern");
                Resolution::new(
                    hit.permission,
                    PermissionSource::PagePattern(hit.pattern.to_string()),
                )
            })
        })
    }

    fn match_section(&self, notebook: Option<&str>, section: &str) -> Option<Resolution> {
        let mut candidates = vec![section.to_string()];
        if let Some(notebook) = notebook {
            candidates.push(format!("{}/{}", notebook, section));
        }

        candidates.iter().find_map(|candidate| {
            self.sections.find_match(candidate).map(|hit| {
                trace!(candidate = %candidate, pattern = hit.pattern, "Matched section pattern");
                Resolution::new(
                    hit.permission,
                    PermissionSource::SectionPattern(hit.pattern.to_string()),
                )
            })
        })
    }
}

/// Compile one table, naming the config field in pattern errors
fn compile_table(
    table: &HashMap<String, PermissionLevel>,
    field_path: &str,
) -> Result<PatternSet, ConfigError> {
    PatternSet::compile(table).map_err(|e| match e {
        ConfigError::InvalidPattern { pattern, reason } => ConfigError::InvalidPattern {
            pattern,
            reason: format!("in {}: {}", field_path, reason),
        },
        other => other,
    })
}
