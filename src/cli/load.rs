//! Load command implementation

use anyhow::{Context, Result};
use std::path::Path;

use advancements::AdvancementContext;

/// Load every tree and print what was loaded, skipped and defaulted
pub async fn load_command(data_dir: &Path, json: bool) -> Result<()> {
    let ctx = AdvancementContext::open(data_dir)?;
    let report = ctx.reload()?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", out);
        return Ok(());
    }

    if report.loaded.is_empty() {
        println!("No advancement trees loaded.");
    } else {
        println!("Loaded {} tree(s):\n", report.loaded.len());
        for tree in ctx.manager().trees() {
            println!(
                "  {} - {} ({} advancements, auto_active: {})",
                tree.label(),
                tree.options.display.name,
                tree.len(),
                tree.options.auto_active
            );
            for advancement in tree.advancements() {
                println!(
                    "    {} [{}] {} x{}",
                    advancement.label(),
                    advancement.kind,
                    advancement.value.as_deref().unwrap_or("-"),
                    advancement.amount
                );
            }
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped:");
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.unit, skipped.reason);
        }
    }

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}
