//! CLI entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use copilot_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.as_ref() else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::from_cli(&cli)?;

    match command {
        Commands::Serve(args) => handlers::serve::execute(&config, args.clone()).await?,
        Commands::Presets => handlers::presets::execute(&config).await?,
        Commands::Export { output } => {
            let ctx = bootstrap(&config).await?;
            handlers::transfer::export(&ctx, output.as_deref()).await?;
        }
        Commands::Import { file } => {
            let ctx = bootstrap(&config).await?;
            handlers::transfer::import(&ctx, file).await?;
        }
        Commands::Servers => {
            let ctx = bootstrap(&config).await?;
            handlers::servers::execute(&ctx).await?;
        }
    }
    Ok(())
}
