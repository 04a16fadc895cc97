//! Vectors command implementation (index browsing).

use super::AppContext;
use anyhow::Result;
use colored::Colorize;
use localmind_store::VectorIndex;

/// Page through the stored chunk records.
pub async fn run(limit: usize, offset: usize) -> Result<()> {
    let ctx = AppContext::open()?;

    let total = ctx.index.count().await?;
    let chunks = ctx.index.get(limit, offset).await?;

    if chunks.is_empty() {
        println!("Vector index is empty ({} records total).", total);
        return Ok(());
    }

    for chunk in &chunks {
        let snippet: String = chunk.text.chars().take(80).collect();
        let suffix = if chunk.text.chars().count() > 80 { "..." } else { "" };

        println!("{}", chunk.id.cyan());
        println!("  {}{}", snippet.replace('\n', " "), suffix);
        if let Some(summary) = chunk.metadata.get("doc_summary").and_then(|v| v.as_str()) {
            if !summary.is_empty() {
                let short: String = summary.chars().take(80).collect();
                println!("  {} {}", "summary:".dimmed(), short);
            }
        }
    }

    println!();
    println!(
        "Showing {}-{} of {} records",
        offset + 1,
        offset + chunks.len(),
        total
    );
    Ok(())
}
