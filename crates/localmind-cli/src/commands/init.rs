//! Init command implementation.

use anyhow::Result;
use colored::Colorize;
use localmind_config::{AppPaths, Config};

/// Create the config file and data directories.
pub fn run() -> Result<()> {
    let paths = AppPaths::new()
        .ok_or_else(|| anyhow::anyhow!("Could not determine application directories"))?;

    paths.ensure_dirs()?;

    if paths.is_initialized() {
        println!(
            "{} config already exists at {}",
            "Skipped:".yellow(),
            paths.config_file.display()
        );
    } else {
        Config::create_default_file(&paths.config_file)?;
        println!(
            "{} {}",
            "Created:".green().bold(),
            paths.config_file.display()
        );
    }

    println!("  Data dir: {}", paths.data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Set LLM_API_KEY (or llm.api_key in the config file)");
    println!("  2. localmind folder add <name> <path>");
    println!("  3. localmind scan <folder-id>");

    Ok(())
}
