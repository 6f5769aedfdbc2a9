//! `copilot servers`: the registry as the settings screen shows it.

use anyhow::Result;
use copilot_core::{McpTransportType, RegistryEntry, load_catalog};

use crate::bootstrap::CliContext;

fn status(entry: &RegistryEntry) -> &'static str {
    if !entry.added {
        "preset"
    } else if entry.enabled {
        "enabled"
    } else if !entry.available {
        "needs instance"
    } else if !entry.is_active {
        "inactive"
    } else {
        "disabled"
    }
}

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let catalog = load_catalog(&ctx.catalog_path).await;
    let entries = ctx.registry.view(&catalog).await?;
    if entries.is_empty() {
        println!("No MCP servers configured.");
        return Ok(());
    }

    println!("{:<24} {:<6} {:<16} URL", "NAME", "TYPE", "STATUS");
    for entry in &entries {
        let transport = match entry.transport {
            McpTransportType::Http => "http",
            McpTransportType::Sse => "sse",
        };
        println!(
            "{:<24} {:<6} {:<16} {}",
            entry.name,
            transport,
            status(entry),
            entry.url
        );
        if !entry.missing_headers.is_empty() {
            println!("  missing headers: {}", entry.missing_headers.join(", "));
        }
    }
    Ok(())
}
