//! Notebook authorization gate
//!
//! Pattern-based, hierarchical authorization for tool calls against a
//! notebook → section → page tree.
//!
//! ## Features
//!
//! - **Glob-like patterns** over notebook, section and page names with a
//!   deterministic precedence when several patterns match
//! - **Hierarchical resolution**: page → section → selected notebook → default
//! - **Session scoping** to a single selected notebook
//! - **Fail-closed** handling of resources whose names cannot be resolved
//! - **Listing filters** so clients never see resources they cannot act on
//!
//! ## Example
//!
//! ```
//! use notebook_gate::access_control::{Authorizer, ResourceContext};
//! use notebook_gate::config::load_config_from_str;
//!
//! let config = load_config_from_str(r#"
//! [authorization]
//! enabled = true
//! default_notebook_permissions = "read"
//!
//! [authorization.notebook_permissions]
//! "Work*" = "write"
//! "#).unwrap();
//!
//! let auth = Authorizer::new(&config.authorization).unwrap();
//! auth.set_current_notebook("Work Projects").unwrap();
//!
//! let ctx = ResourceContext::write().with_notebook("Work Projects").with_page("Plan");
//! assert!(auth.is_authorized("createPage", &ctx).is_ok());
//!
//! let ctx = ResourceContext::read().with_notebook("Personal");
//! assert!(auth.is_authorized("listSections", &ctx).is_err());
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod notebook;

// Re-export main types
pub use access_control::{Authorizer, ResourceContext};
pub use config::{AppConfig, PermissionLevel, load_config};
pub use error::{AccessDeniedError, AppError, ConfigError, Result};
pub use notebook::NotebookCache;
