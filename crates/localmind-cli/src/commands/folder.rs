//! Folder command implementations.

use super::AppContext;
use anyhow::Result;
use colored::Colorize;

/// Register a directory for scanning.
pub fn add(name: &str, path: &str) -> Result<()> {
    let ctx = AppContext::open()?;
    let config = ctx.folders.register(name, path)?;

    println!("{} {}", "Registered:".green().bold(), config.name);
    println!("  ID:   {}", config.id);
    println!("  Path: {}", config.path);
    Ok(())
}

/// List registered folders.
pub fn list(filter: Option<&str>) -> Result<()> {
    let ctx = AppContext::open()?;
    let folders = ctx.folders.list(filter);

    if folders.is_empty() {
        println!("No folders registered. Add one with: localmind folder add <name> <path>");
        return Ok(());
    }

    for cfg in folders {
        println!("{} {}", cfg.id.cyan(), cfg.name.bold());
        println!("  Path:    {}", cfg.path);
        println!("  Created: {}", cfg.created_at.format("%Y-%m-%d %H:%M"));
        match (cfg.last_scan_at, cfg.last_scan_status) {
            (Some(at), Some(status)) => {
                println!("  Last scan: {} ({})", at.format("%Y-%m-%d %H:%M"), status);
            }
            _ => println!("  Last scan: never"),
        }
    }
    Ok(())
}

/// Remove a folder config. Vectors already indexed are left in place.
pub fn remove(id: &str) -> Result<()> {
    let ctx = AppContext::open()?;
    let id = ctx.resolve_folder_id(id)?;
    ctx.folders.remove(&id)?;

    println!("{} {}", "Removed:".green().bold(), id);
    println!("  Indexed vectors for this folder are kept.");
    Ok(())
}
