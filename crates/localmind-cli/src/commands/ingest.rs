//! Ingest command implementation (direct single-document ingest).

use super::AppContext;
use anyhow::Result;
use colored::Colorize;

/// Ingest one file or a raw text string, bypassing folder scans.
pub async fn run(
    file: Option<&str>,
    text: Option<String>,
    doc_id: Option<String>,
    title: Option<String>,
) -> Result<()> {
    let ctx = AppContext::open()?;
    let ingestor = ctx.ingestor()?;

    let (text, title) = match (file, text) {
        (Some(path), None) => {
            let contents = std::fs::read_to_string(path)?;
            let fallback_title = title.or_else(|| {
                std::path::Path::new(path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
            });
            (contents, fallback_title)
        }
        (None, Some(text)) => (text, title),
        _ => anyhow::bail!("provide either a file path or --text"),
    };

    let outcome = ingestor.ingest_text(&text, doc_id, title).await?;

    println!("{} {}", "Ingested:".green().bold(), outcome.doc_id);
    println!("  Chunks: {}", outcome.chunks);
    Ok(())
}
