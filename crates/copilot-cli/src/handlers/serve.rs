//! Serve command handler.

use std::time::Duration;

use anyhow::Result;
use copilot_axum::{CorsConfig, ServerConfig, start_server};

use crate::bootstrap::CliConfig;
use crate::commands::ServeArgs;

/// Build the server configuration from the resolved paths and flags.
pub fn server_config(paths: &CliConfig, args: ServeArgs) -> ServerConfig {
    let cors = if args.allow_origins.is_empty() {
        CorsConfig::AllowAll
    } else {
        CorsConfig::AllowOrigins(args.allow_origins)
    };
    ServerConfig {
        port: args.port,
        db_path: (!args.in_memory).then(|| paths.db_path.clone()),
        catalog_path: paths.catalog_path.clone(),
        openai_base_url: args.openai_base_url,
        anthropic_base_url: args.anthropic_base_url,
        chat_max_duration: Duration::from_secs(args.chat_max_duration_secs),
        cors,
    }
}

/// Execute the serve command. Runs until the server stops.
pub async fn execute(paths: &CliConfig, args: ServeArgs) -> Result<()> {
    start_server(server_config(paths, args)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ServeArgs {
        ServeArgs {
            port: 8787,
            in_memory: false,
            openai_base_url: "https://api.openai.com/v1".into(),
            anthropic_base_url: "https://api.anthropic.com/v1".into(),
            chat_max_duration_secs: 300,
            allow_origins: Vec::new(),
        }
    }

    fn paths() -> CliConfig {
        CliConfig {
            db_path: PathBuf::from("/data/copilot.db"),
            catalog_path: PathBuf::from("/data/mcp-servers.yaml"),
        }
    }

    #[test]
    fn in_memory_drops_the_database() {
        let config = server_config(&paths(), ServeArgs { in_memory: true, ..args() });
        assert!(config.db_path.is_none());
        assert_eq!(config.chat_max_duration, Duration::from_secs(300));
    }

    #[test]
    fn origins_restrict_cors() {
        let config = server_config(
            &paths(),
            ServeArgs {
                allow_origins: vec!["http://localhost:3000".into()],
                ..args()
            },
        );
        assert!(matches!(config.cors, CorsConfig::AllowOrigins(ref o) if o.len() == 1));
        assert_eq!(config.db_path, Some(PathBuf::from("/data/copilot.db")));
    }
}
