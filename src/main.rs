//! Notebook authorization gate CLI
//!
//! Validates an authorization policy and evaluates single decisions against it.

use clap::{Parser, Subcommand, ValueEnum};
use notebook_gate::{
    access_control::{Authorizer, ResourceContext, ToolOperation},
    config::{AppConfig, LogFormat, load_config},
};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Notebook authorization gate - pattern-based access control for notebook tools
#[derive(Parser, Debug)]
#[command(name = "notebook-gate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "NOTEBOOK_GATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the configured level
    #[arg(long, global = true, env = "NOTEBOOK_GATE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and compile the policy, then print its summary
    Validate,

    /// Evaluate one request against the policy
    Check {
        /// Notebook to select for the session
        #[arg(long)]
        notebook: String,

        /// Section name within the notebook
        #[arg(long)]
        section: Option<String>,

        /// Page title within the section
        #[arg(long)]
        page: Option<String>,

        /// Tool name; its operation comes from the tool table
        #[arg(long, conflicts_with = "operation")]
        tool: Option<String>,

        /// Operation to check when no tool is given
        #[arg(long, value_enum, default_value_t = OperationArg::Read)]
        operation: OperationArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OperationArg {
    Read,
    Write,
}

impl From<OperationArg> for ToolOperation {
    fn from(op: OperationArg) -> Self {
        match op {
            OperationArg::Read => ToolOperation::Read,
            OperationArg::Write => ToolOperation::Write,
        }
    }
}

fn init_logging(args: &Args, config: &AppConfig) {
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(args.config.as_deref())?;

    // Initialize logging
    init_logging(&args, &config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        enabled = config.authorization.enabled,
        "Loaded authorization policy"
    );

    let auth = Authorizer::new(&config.authorization)
        .inspect_err(|e| error!(error = %e, "Failed to compile authorization policy"))?;

    match args.command {
        Command::Validate => {
            println!("{}", serde_json::to_string_pretty(&auth.summary())?);
        }
        Command::Check {
            notebook,
            section,
            page,
            tool,
            operation,
        } => {
            let output = run_check(&auth, &notebook, section, page, tool, operation);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn run_check(
    auth: &Authorizer,
    notebook: &str,
    section: Option<String>,
    page: Option<String>,
    tool: Option<String>,
    operation: OperationArg,
) -> serde_json::Value {
    if let Err(e) = auth.set_current_notebook(notebook) {
        return json!({
            "notebook": notebook,
            "allowed": false,
            "reason": e.to_string(),
        });
    }

    let operation = tool
        .as_deref()
        .and_then(ToolOperation::for_tool)
        .unwrap_or_else(|| operation.into());

    let mut ctx = ResourceContext::new(operation).with_notebook(notebook);
    if let Some(section) = section {
        ctx = ctx.with_section(section);
    }
    if let Some(page) = page {
        ctx = ctx.with_page(page);
    }

    let resolution = auth.explain(&ctx);
    let decision = match tool.as_deref() {
        Some(tool) => auth.is_authorized(tool, &ctx),
        None => resolution.require("check", operation),
    }
    .map_err(|e| e.reason);

    json!({
        "notebook": notebook,
        "tool": tool,
        "operation": operation.as_str(),
        "permission": resolution.permission,
        "source": resolution.source.to_string(),
        "allowed": decision.is_ok(),
        "reason": decision.err(),
    })
}
