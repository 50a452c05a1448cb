//! Resource context extraction
//!
//! Turns a tool call (name + JSON arguments) into the notebook/section/page
//! identity the resolver works on. IDs are resolved to display names through
//! the [`NotebookCache`]; when a name cannot be found the ID is kept with an
//! empty name so the resolver can fail closed.

use crate::access_control::types::{ToolCategory, ToolOperation, tool_spec};
use crate::notebook::{NotebookCache, SectionRecord};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Identity and operation of a single tool call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceContext {
    pub notebook_name: Option<String>,
    pub notebook_id: Option<String>,
    pub section_name: Option<String>,
    pub section_id: Option<String>,
    pub page_name: Option<String>,
    pub page_id: Option<String>,
    /// Destination section of a copy or move
    pub target_section_name: Option<String>,
    pub target_section_id: Option<String>,
    pub operation: ToolOperation,
}

impl ResourceContext {
    pub fn new(operation: ToolOperation) -> Self {
        Self {
            operation,
            ..Default::default()
        }
    }

    pub fn read() -> Self {
        Self::new(ToolOperation::Read)
    }

    pub fn write() -> Self {
        Self::new(ToolOperation::Write)
    }

    pub fn with_notebook(mut self, name: impl Into<String>) -> Self {
        self.notebook_name = Some(name.into());
        self
    }

    pub fn with_section(mut self, name: impl Into<String>) -> Self {
        self.section_name = Some(name.into());
        self
    }

    pub fn with_section_id(mut self, id: impl Into<String>) -> Self {
        self.section_id = Some(id.into());
        self
    }

    pub fn with_page(mut self, name: impl Into<String>) -> Self {
        self.page_name = Some(name.into());
        self
    }

    pub fn with_page_id(mut self, id: impl Into<String>) -> Self {
        self.page_id = Some(id.into());
        self
    }

    pub fn with_target_section(mut self, name: impl Into<String>) -> Self {
        self.target_section_name = Some(name.into());
        self
    }

    pub fn with_target_section_id(mut self, id: impl Into<String>) -> Self {
        self.target_section_id = Some(id.into());
        self
    }

    pub fn notebook(&self) -> Option<&str> {
        present(&self.notebook_name)
    }

    pub fn section(&self) -> Option<&str> {
        present(&self.section_name)
    }

    pub fn page(&self) -> Option<&str> {
        present(&self.page_name)
    }

    pub fn target_section(&self) -> Option<&str> {
        present(&self.target_section_name)
    }

    /// Page ID present but its name unknown
    pub fn unresolved_page_id(&self) -> Option<&str> {
        match self.page() {
            Some(_) => None,
            None => present(&self.page_id),
        }
    }

    /// Section ID present but its name unknown
    pub fn unresolved_section_id(&self) -> Option<&str> {
        match self.section() {
            Some(_) => None,
            None => present(&self.section_id),
        }
    }

    /// Page ID present but the section containing it unknown
    pub fn page_without_section(&self) -> Option<&str> {
        if self.section().is_some() || present(&self.section_id).is_some() {
            return None;
        }
        present(&self.page_id)
    }

    pub fn unresolved_target_section_id(&self) -> Option<&str> {
        match self.target_section() {
            Some(_) => None,
            None => present(&self.target_section_id),
        }
    }

    pub fn has_target(&self) -> bool {
        self.target_section().is_some() || present(&self.target_section_id).is_some()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn string_arg<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// Build the resource context for a tool call
///
/// Recognised argument keys: `sectionID`, `containerID`, `pageID`, `title`,
/// `targetSectionID` and `identifier`. Cache misses fall back to the cache's
/// `fetch_*` lookups; failures leave the name empty.
///
/// A page addressed by ID is placed in the section the cache reports for it,
/// never in a section named by the arguments. When that section is unknown
/// the context carries no section at all.
pub async fn extract_context(
    tool_name: &str,
    args: &Map<String, Value>,
    cache: &dyn NotebookCache,
) -> ResourceContext {
    let spec = tool_spec(tool_name);
    let operation = match spec {
        Some(spec) => spec.operation,
        None => {
            debug!(tool = tool_name, "Tool not in operation table, treating as read");
            ToolOperation::Read
        }
    };
    let category = spec.map(|s| s.category);

    let mut ctx = ResourceContext::new(operation);

    if let Some(notebook) = cache.current_notebook() {
        ctx.notebook_id = Some(notebook.id).filter(|s| !s.is_empty());
        ctx.notebook_name = Some(notebook.display_name).filter(|s| !s.is_empty());
    }

    if let Some(section_id) = string_arg(args, "sectionID") {
        ctx.section_name = resolve_section_name(cache, section_id).await;
        ctx.section_id = Some(section_id.to_string());
    } else if let Some(container_id) = string_arg(args, "containerID") {
        // Containers are usually notebooks or section groups; only a known
        // section contributes an identity
        if let Some(name) = cache.cached_section_name(container_id) {
            ctx.section_id = Some(container_id.to_string());
            ctx.section_name = Some(name);
        }
    }

    if let Some(page_id) = string_arg(args, "pageID") {
        ctx.page_name = resolve_page_name(cache, page_id).await;
        ctx.page_id = Some(page_id.to_string());
    }

    if let Some(target_id) = string_arg(args, "targetSectionID") {
        ctx.target_section_name = resolve_section_name(cache, target_id).await;
        ctx.target_section_id = Some(target_id.to_string());
    }

    if let Some(title) = string_arg(args, "title") {
        match category {
            Some(ToolCategory::Section) if ctx.section_id.is_none() => {
                ctx.section_name = Some(title.to_string());
            }
            Some(ToolCategory::Page) if ctx.page_id.is_none() => {
                ctx.page_name = Some(title.to_string());
            }
            _ => {}
        }
    }

    if let Some(identifier) = string_arg(args, "identifier")
        && ctx.page_id.is_none()
        && ctx.section_id.is_none()
    {
        if let Some(name) = cache.cached_page_name(identifier) {
            ctx.page_id = Some(identifier.to_string());
            ctx.page_name = Some(name);
        } else if let Some(name) = cache.cached_section_name(identifier) {
            ctx.section_id = Some(identifier.to_string());
            ctx.section_name = Some(name);
        } else {
            ctx.page_name = fetch_page_name(cache, identifier).await;
            ctx.page_id = Some(identifier.to_string());
        }
    }

    if let Some(page_id) = ctx.page_id.clone() {
        let parent = resolve_page_section(cache, &page_id).await;
        if let Some(claimed) = ctx.section_id.as_deref()
            && parent.as_ref().map(|s| s.id.as_str()) != Some(claimed)
        {
            debug!(page_id = %page_id, section_id = claimed, "Ignoring section argument for page");
        }
        match parent {
            Some(section) => {
                ctx.section_name = if section.display_name.is_empty() {
                    resolve_section_name(cache, &section.id).await
                } else {
                    Some(section.display_name)
                };
                ctx.section_id = Some(section.id);
            }
            None => {
                ctx.section_id = None;
                ctx.section_name = None;
            }
        }
    }

    debug!(tool = tool_name, context = ?ctx, "Extracted resource context");
    ctx
}

async fn resolve_section_name(cache: &dyn NotebookCache, section_id: &str) -> Option<String> {
    if let Some(name) = cache.cached_section_name(section_id) {
        return Some(name);
    }
    match cache.fetch_section_name(section_id).await {
        Ok(name) => name.filter(|s| !s.is_empty()),
        Err(e) => {
            warn!(section_id, error = %e, "Section name lookup failed");
            None
        }
    }
}

async fn resolve_page_section(cache: &dyn NotebookCache, page_id: &str) -> Option<SectionRecord> {
    if let Some(section) = cache.cached_page_section(page_id) {
        return Some(section);
    }
    match cache.fetch_page_section(page_id).await {
        Ok(section) => section.filter(|s| !s.id.is_empty()),
        Err(e) => {
            warn!(page_id, error = %e, "Page section lookup failed");
            None
        }
    }
}

async fn resolve_page_name(cache: &dyn NotebookCache, page_id: &str) -> Option<String> {
    if let Some(name) = cache.cached_page_name(page_id) {
        return Some(name);
    }
    fetch_page_name(cache, page_id).await
}

async fn fetch_page_name(cache: &dyn NotebookCache, page_id: &str) -> Option<String> {
    match cache.fetch_page_name(page_id).await {
        Ok(name) => name.filter(|s| !s.is_empty()),
        Err(e) => {
            warn!(page_id, error = %e, "Page name lookup failed");
            None
        }
    }
}
