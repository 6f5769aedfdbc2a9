//! Export and import command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::bootstrap::CliContext;

/// Write the workspace bundle to `output`, or stdout.
pub async fn export(ctx: &CliContext, output: Option<&Path>) -> Result<()> {
    let bundle = ctx.workspace.export().await?;
    let json = serde_json::to_string_pretty(&bundle)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Exported {} tokens, {} servers and {} instances to {}",
                bundle.tokens.len(),
                bundle.servers.len(),
                bundle.instances.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Replace the workspace with the bundle in `file`.
pub async fn import(ctx: &CliContext, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let data: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let bundle = ctx.workspace.import(data).await?;
    println!(
        "Imported {} tokens, {} servers and {} instances",
        bundle.tokens.len(),
        bundle.servers.len(),
        bundle.instances.len()
    );
    Ok(())
}
