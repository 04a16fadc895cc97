//! Config command implementation.

use anyhow::Result;
use colored::Colorize;
use localmind_config::{AppPaths, Config};

/// Print the active configuration.
pub fn show() -> Result<()> {
    let paths = AppPaths::new()
        .ok_or_else(|| anyhow::anyhow!("Could not determine application directories"))?;

    if paths.config_file.exists() {
        let contents = std::fs::read_to_string(&paths.config_file)?;
        println!("{}", contents);
    } else {
        println!(
            "{} no config file at {}, using defaults",
            "Note:".yellow(),
            paths.config_file.display()
        );
        println!("{}", Config::default_config_string());
    }

    Ok(())
}

/// Print the config file path.
pub fn path() -> Result<()> {
    let paths = AppPaths::new()
        .ok_or_else(|| anyhow::anyhow!("Could not determine application directories"))?;
    println!("{}", paths.config_file.display());
    Ok(())
}
