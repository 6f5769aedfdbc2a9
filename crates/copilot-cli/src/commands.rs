//! Available subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use copilot_axum::bootstrap::DEFAULT_PORT;
use copilot_axum::llm::{ANTHROPIC_BASE_URL, OPENAI_BASE_URL};

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),

    /// Export tokens, MCP servers and instances as JSON
    Export {
        /// Output file (stdout when omitted)
        output: Option<PathBuf>,
    },

    /// Replace tokens, MCP servers and instances from an exported file
    Import {
        /// File written by `copilot export`
        file: PathBuf,
    },

    /// List registered MCP servers and presets not yet added
    Servers,

    /// List the preconfigured MCP server catalog
    Presets,
}

/// Options for `copilot serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "COPILOT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Keep settings in memory instead of the database
    #[arg(long)]
    pub in_memory: bool,

    /// Base URL of the OpenAI API
    #[arg(long, env = "COPILOT_OPENAI_BASE_URL", default_value = OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Base URL of the Anthropic API
    #[arg(long, env = "COPILOT_ANTHROPIC_BASE_URL", default_value = ANTHROPIC_BASE_URL)]
    pub anthropic_base_url: String,

    /// Maximum duration of a streamed chat response, in seconds
    #[arg(long, env = "COPILOT_CHAT_MAX_DURATION_SECS", default_value_t = 300)]
    pub chat_max_duration_secs: u64,

    /// Allowed CORS origin (repeatable); all origins when omitted
    #[arg(long = "allow-origin")]
    pub allow_origins: Vec<String>,
}
