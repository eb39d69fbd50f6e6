//! `fi-mcp`: serves the FI calculations over MCP stdio.
//!
//! Settings come from `FI_MCP_*` variables (and `.env`); flags override them.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fi_core::{Settings, TracingFormat};
use fi_server::{McpServer, StdioTransport};
use fi_tools::{Catalog, DiscoveryOptions, DocPolicy, UnknownArguments, validate_all};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "fi-mcp", version, about = "Financial-independence calculations as MCP tools")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve tools and help resources over stdio (default)
    Serve,
    /// Validate every function's documentation and print the report
    Check,
    /// Print the generated tool schemas as JSON
    Schemas,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Settings")]
struct Overrides {
    /// Module to expose [env: FI_MCP_MODULE]
    #[arg(long)]
    module: Option<String>,
    /// Prefix prepended to every tool name [env: FI_MCP_TOOL_PREFIX]
    #[arg(long)]
    tool_prefix: Option<String>,
    /// exclude, degrade or strict [env: FI_MCP_DOC_POLICY]
    #[arg(long)]
    doc_policy: Option<DocPolicy>,
    /// reject or ignore [env: FI_MCP_UNKNOWN_ARGS]
    #[arg(long)]
    unknown_args: Option<UnknownArguments>,
    /// Function never exposed as a tool; repeatable [env: FI_MCP_DENYLIST]
    #[arg(long = "deny", value_name = "FUNCTION")]
    deny: Vec<String>,
    /// trace, debug, info, warn or error [env: FI_MCP_LOG_LEVEL]
    #[arg(long)]
    log_level: Option<Level>,
    /// pretty, compact or json [env: FI_MCP_LOG_FORMAT]
    #[arg(long)]
    log_format: Option<TracingFormat>,
}

impl Overrides {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(module) = self.module {
            settings = settings.with_module(module);
        }
        if let Some(prefix) = self.tool_prefix {
            settings = settings.with_tool_prefix(prefix);
        }
        if let Some(policy) = self.doc_policy {
            settings = settings.with_doc_policy(policy);
        }
        if let Some(policy) = self.unknown_args {
            settings = settings.with_unknown_arguments(policy);
        }
        if let Some(level) = self.log_level {
            settings = settings.with_log_level(level);
        }
        if let Some(format) = self.log_format {
            settings = settings.with_log_format(format);
        }
        settings.with_denylist(self.deny)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = cli
        .overrides
        .apply(Settings::from_env().context("reading FI_MCP_* settings")?);
    settings.tracing_setup().init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let mut server = McpServer::new(build_catalog(&settings)?);
            server.run(&mut StdioTransport::new()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => check(&settings),
        Command::Schemas => {
            let catalog = build_catalog(&settings)?;
            let tools: Vec<_> = catalog.tools().collect();
            let mut out = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &tools)?;
            writeln!(out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_catalog(settings: &Settings) -> anyhow::Result<Arc<Catalog>> {
    let catalog = Catalog::build(&fi_calc::library(), settings.catalog_options())
        .with_context(|| format!("building the tool catalog for module `{}`", settings.module))?;
    Ok(Arc::new(catalog))
}

fn check(settings: &Settings) -> anyhow::Result<ExitCode> {
    let options = DiscoveryOptions::default().with_denylist(settings.denylist.iter().cloned());
    let discovery = fi_calc::library().discover(&settings.module, &options)?;
    let report = validate_all(discovery.eligible());

    let mut out = std::io::stdout().lock();
    if report.is_clean() {
        writeln!(out, "{} function(s) checked, no violations", report.checked())?;
        return Ok(ExitCode::SUCCESS);
    }
    writeln!(
        out,
        "{} function(s) checked, {} violation(s):\n{report}",
        report.checked(),
        report.len()
    )?;
    Ok(ExitCode::FAILURE)
}
