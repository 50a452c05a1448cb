//! Authorization gate
//!
//! The public decision point. One [`Authorizer`] is shared by every tool call
//! of a session; it owns the compiled policy and the session scope behind a
//! single reader/writer lock. Checks and filters take the read lock, notebook
//! selection and policy reloads take the write lock. Name lookups that may
//! hit the network happen before any lock is taken.

use crate::access_control::context::{ResourceContext, extract_context};
use crate::access_control::patterns::{PatternKind, PatternSet};
use crate::access_control::resolver::{PermissionResolver, Resolution};
use crate::access_control::session::{ScopeViolation, SelectedNotebook, SessionScope};
use crate::access_control::types::{is_auth_tool, tool_spec};
use crate::config::{AuthorizationConfig, PermissionLevel};
use crate::error::{AccessDeniedError, ConfigError, SessionError};
use crate::notebook::{NamedResource, NotebookCache, NotebookRecord, PageRecord, SectionRecord};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Session-wide authorization state
pub struct Authorizer {
    state: RwLock<AuthState>,
}

struct AuthState {
    enabled: bool,
    deny_unknown_tools: bool,
    resolver: PermissionResolver,
    scope: SessionScope,
}

/// Serializable view of the active policy
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationSummary {
    pub enabled: bool,
    pub default_permission: PermissionLevel,
    pub deny_unknown_tools: bool,
    pub selected_notebook: Option<SelectedNotebook>,
    pub notebook_patterns: Vec<PatternSummary>,
    pub section_patterns: Vec<PatternSummary>,
    pub page_patterns: Vec<PatternSummary>,
}

/// One compiled pattern, in precedence order
#[derive(Debug, Clone, Serialize)]
pub struct PatternSummary {
    pub pattern: String,
    pub kind: PatternKind,
    pub permission: PermissionLevel,
}

fn summarize(patterns: &PatternSet) -> Vec<PatternSummary> {
    patterns
        .patterns()
        .iter()
        .map(|p| PatternSummary {
            pattern: p.source().to_string(),
            kind: p.kind(),
            permission: p.permission(),
        })
        .collect()
}

impl Authorizer {
    /// Create an authorizer from configuration
    pub fn new(config: &AuthorizationConfig) -> Result<Self, ConfigError> {
        let resolver = PermissionResolver::new(config)?;

        info!(
            enabled = config.enabled,
            default = %config.default_notebook_permissions,
            notebook_patterns = resolver.notebook_patterns().len(),
            section_patterns = resolver.section_patterns().len(),
            page_patterns = resolver.page_patterns().len(),
            "Initialized authorization"
        );

        Ok(Self {
            state: RwLock::new(AuthState {
                enabled: config.enabled,
                deny_unknown_tools: config.deny_unknown_tools,
                resolver,
                scope: SessionScope::new(),
            }),
        })
    }

    /// Create an authorizer that allows everything
    pub fn disabled() -> Self {
        Self {
            state: RwLock::new(AuthState {
                enabled: false,
                deny_unknown_tools: false,
                resolver: PermissionResolver::with_default(PermissionLevel::Full),
                scope: SessionScope::new(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.read_state().enabled
    }

    /// Replace the policy with a freshly compiled one
    ///
    /// The selected notebook is kept and its permission recomputed under the
    /// new policy; if the new policy denies it, the selection is cleared.
    pub fn reload(&self, config: &AuthorizationConfig) -> Result<(), ConfigError> {
        // Compile before locking so checks are not blocked by compilation
        let resolver = PermissionResolver::new(config)?;

        let mut state = self.write_state();
        state.enabled = config.enabled;
        state.deny_unknown_tools = config.deny_unknown_tools;
        state.resolver = resolver;

        if let Some(name) = state.scope.current_notebook().map(str::to_string) {
            let permission = state.effective_notebook_permission(&name);
            if state.scope.select(&name, permission).is_err() {
                warn!(notebook = %name, "Selected notebook denied by reloaded policy, clearing selection");
                state.scope.clear();
            }
        }

        info!(enabled = config.enabled, "Reloaded authorization policy");
        Ok(())
    }

    /// Select the notebook this session is scoped to
    ///
    /// Fails without changing the selection if the notebook resolves to `none`.
    pub fn set_current_notebook(&self, name: &str) -> Result<PermissionLevel, SessionError> {
        let mut state = self.write_state();
        let permission = state.effective_notebook_permission(name);

        match state.scope.select(name, permission) {
            Ok(selected) => {
                info!(notebook = %selected.name, permission = %selected.permission, "Selected notebook");
                Ok(selected.permission)
            }
            Err(e) => {
                warn!(notebook = name, error = %e, "Notebook selection rejected");
                Err(e)
            }
        }
    }

    pub fn current_notebook(&self) -> Option<String> {
        self.read_state()
            .scope
            .current_notebook()
            .map(str::to_string)
    }

    /// Selected notebook together with its permission
    pub fn selected_notebook(&self) -> Option<SelectedNotebook> {
        self.read_state().scope.selected().cloned()
    }

    pub fn clear_current_notebook(&self) {
        self.write_state().scope.clear();
        info!("Cleared notebook selection");
    }

    /// Permission of a notebook from notebook patterns, then the default
    pub fn notebook_permission(&self, name: &str) -> PermissionLevel {
        self.read_state().resolver.notebook_permission(name)
    }

    /// Effective permission of a resource within the current session
    pub fn resolve(&self, ctx: &ResourceContext) -> PermissionLevel {
        self.explain(ctx).permission
    }

    /// Effective permission and the rule that produced it
    pub fn explain(&self, ctx: &ResourceContext) -> Resolution {
        let state = self.read_state();
        state.resolver.explain(ctx, state.scope.selected())
    }

    /// Check whether a tool call is permitted
    pub fn is_authorized(&self, tool: &str, ctx: &ResourceContext) -> Result<(), AccessDeniedError> {
        let result = self.read_state().check(tool, ctx);
        if let Err(e) = &result {
            warn!(tool, reason = %e.reason, "Access denied");
        }
        result
    }

    /// Extract the resource context of a tool call and check it
    ///
    /// The cache lookups run before the authorization lock is taken.
    pub async fn authorize(
        &self,
        tool: &str,
        args: &Map<String, Value>,
        cache: &dyn NotebookCache,
    ) -> Result<(), AccessDeniedError> {
        if !self.is_enabled() || is_auth_tool(tool) {
            return Ok(());
        }
        let ctx = extract_context(tool, args, cache).await;
        self.is_authorized(tool, &ctx)
    }

    /// Drop notebooks the policy denies
    pub fn filter_notebooks(&self, notebooks: Vec<NotebookRecord>) -> Vec<NotebookRecord> {
        let state = self.read_state();
        if !state.enabled {
            return notebooks;
        }

        retain_logged(notebooks, "notebook", |nb| {
            state.resolver.notebook_permission(nb.name()) != PermissionLevel::None
        })
    }

    /// Drop sections of the selected notebook the policy denies
    ///
    /// Listings of any other notebook are returned unchanged.
    pub fn filter_sections(&self, notebook: &str, sections: Vec<SectionRecord>) -> Vec<SectionRecord> {
        let state = self.read_state();
        if !state.in_filter_scope(notebook) {
            return sections;
        }

        let selected = state.scope.selected();
        retain_logged(sections, "section", |section| {
            let ctx = ResourceContext::read()
                .with_notebook(notebook)
                .with_section(section.name());
            state.resolver.resolve(&ctx, selected) != PermissionLevel::None
        })
    }

    /// Drop pages of the selected notebook the policy denies
    pub fn filter_pages(
        &self,
        notebook: &str,
        section: Option<&str>,
        pages: Vec<PageRecord>,
    ) -> Vec<PageRecord> {
        let state = self.read_state();
        if !state.in_filter_scope(notebook) {
            return pages;
        }

        let selected = state.scope.selected();
        retain_logged(pages, "page", |page| {
            let mut ctx = ResourceContext::read()
                .with_notebook(notebook)
                .with_page(page.name());
            if let Some(section) = section {
                ctx = ctx.with_section(section);
            }
            state.resolver.resolve(&ctx, selected) != PermissionLevel::None
        })
    }

    /// Snapshot of the active policy and selection
    pub fn summary(&self) -> AuthorizationSummary {
        let state = self.read_state();
        AuthorizationSummary {
            enabled: state.enabled,
            default_permission: state.resolver.default_permission(),
            deny_unknown_tools: state.deny_unknown_tools,
            selected_notebook: state.scope.selected().cloned(),
            notebook_patterns: summarize(state.resolver.notebook_patterns()),
            section_patterns: summarize(state.resolver.section_patterns()),
            page_patterns: summarize(state.resolver.page_patterns()),
        }
    }

    // Poisoned locks are recovered: a panic in one tool call must not lock
    // every later call out

    fn write_state(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("authorization state lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("authorization state lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl AuthState {
    fn effective_notebook_permission(&self, name: &str) -> PermissionLevel {
        if self.enabled {
            self.resolver.notebook_permission(name)
        } else {
            PermissionLevel::Full
        }
    }

    fn in_filter_scope(&self, notebook: &str) -> bool {
        self.enabled && self.scope.current_notebook() == Some(notebook)
    }

    fn check(&self, tool: &str, ctx: &ResourceContext) -> Result<(), AccessDeniedError> {
        if !self.enabled {
            return Ok(());
        }

        if is_auth_tool(tool) {
            debug!(tool, "Auth tool, always permitted");
            return Ok(());
        }

        if self.deny_unknown_tools && tool_spec(tool).is_none() {
            return Err(AccessDeniedError::unknown_tool(tool));
        }

        let selected = self.scope.check(ctx.notebook()).map_err(|v| match v {
            ScopeViolation::NoNotebookSelected => AccessDeniedError::no_notebook_selected(tool),
            ScopeViolation::NotebookNotPermitted { notebook } => {
                AccessDeniedError::notebook_not_permitted(tool, notebook)
            }
            ScopeViolation::CrossNotebook {
                requested,
                selected,
            } => AccessDeniedError::cross_notebook(tool, requested, selected),
        })?;

        let resolution = self.resolver.explain(ctx, Some(selected));
        debug!(
            tool,
            operation = %ctx.operation,
            permission = %resolution.permission,
            source = %resolution.source,
            "Checking access"
        );
        resolution.require(tool, ctx.operation)?;

        if let Some(target) = self.resolver.explain_target(ctx, Some(selected)) {
            if let Some((kind, id)) = target.source.unresolved() {
                return Err(AccessDeniedError::unresolved_resource(tool, kind, id));
            }
            if !target.permission.allows_write() {
                return Err(AccessDeniedError::target_not_writable(
                    tool,
                    ctx.target_section().unwrap_or_default(),
                ));
            }
        }

        Ok(())
    }
}

fn retain_logged<T, F>(items: Vec<T>, kind: &str, mut keep: F) -> Vec<T>
where
    T: NamedResource,
    F: FnMut(&T) -> bool,
{
    let before = items.len();
    let kept: Vec<T> = items.into_iter().filter(|item| keep(item)).collect();
    if kept.len() != before {
        debug!(kind, removed = before - kept.len(), "Filtered listing");
    }
    kept
}
