//! `copilot presets`: the preconfigured catalog.

use anyhow::Result;
use copilot_core::read_catalog;

use crate::bootstrap::CliConfig;

/// Unlike the HTTP endpoint, a broken catalog is reported as an error here.
pub async fn execute(config: &CliConfig) -> Result<()> {
    let catalog = read_catalog(&config.catalog_path).await?;
    if catalog.servers.is_empty() {
        println!("No preconfigured servers in {}", config.catalog_path.display());
        return Ok(());
    }
    for server in &catalog.servers {
        let label = if server.label.is_empty() { &server.name } else { &server.label };
        println!("{} ({})", label, server.name);
        println!("  {}", server.url);
        if let Some(description) = &server.description {
            println!("  {description}");
        }
    }
    Ok(())
}
