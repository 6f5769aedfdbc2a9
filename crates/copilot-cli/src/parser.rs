//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the copilot backend.
#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Sitecore copilot backend: MCP registry, workspace settings and chat API")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// SQLite database file
    #[arg(long = "db-path", env = "COPILOT_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Preconfigured MCP server catalog (YAML)
    #[arg(long = "mcp-config", env = "COPILOT_MCP_CONFIG", global = true)]
    pub mcp_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
