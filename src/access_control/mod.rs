//! Access control module
//!
//! Provides pattern-based, hierarchical authorization for notebook tools.
//!
//! ## Access Control Model
//!
//! A tool call is resolved against the hierarchy with the following
//! precedence (highest to lowest):
//!
//! 1. **Page patterns** - matched against the page title
//! 2. **Section patterns** - matched against the section name, then `notebook/section`
//! 3. **Selected notebook** - the permission the notebook resolved to when selected
//!    (notebook patterns, then `default_notebook_permissions`)
//!
//! Every session is scoped to a single selected notebook. Requests naming any
//! other notebook are denied. Resources referenced by an ID whose name cannot
//! be resolved are denied rather than inheriting a broader permission.
//!
//! ## Example Configuration
//!
//! ```toml
//! [authorization]
//! enabled = true
//! default_notebook_permissions = "read"
//!
//! [authorization.notebook_permissions]
//! "Work*" = "write"
//! "Private*" = "none"
//!
//! [authorization.section_permissions]
//! "*/Confidential" = "none"
//! "Work*/Draft*" = "read"
//! ```

pub mod context;
pub mod gate;
pub mod patterns;
pub mod resolver;
pub mod session;
pub mod types;

pub use context::{ResourceContext, extract_context};
pub use gate::{AuthorizationSummary, Authorizer, PatternSummary};
pub use patterns::{Pattern, PatternKind, PatternMatch, PatternSet};
pub use resolver::{PermissionResolver, PermissionSource, Resolution};
pub use session::{ScopeViolation, SelectedNotebook, SessionScope};
pub use types::{ToolCategory, ToolOperation, ToolSpec, is_auth_tool, tool_spec};
