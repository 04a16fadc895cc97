//! Ask command implementation (retrieval-augmented question answering).

use super::AppContext;
use anyhow::Result;
use colored::Colorize;
use localmind_store::VectorIndex;

/// Answer a question grounded in the indexed documents.
pub async fn run(question: &str, top_k: usize, sources: bool) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("question must not be empty");
    }

    let ctx = AppContext::open()?;
    let llm = ctx.llm()?;

    let query_vector = llm
        .embed_texts(&[question.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("embedding service returned nothing"))?;

    let matches = ctx.index.query(&query_vector, top_k).await?;
    if matches.is_empty() {
        println!("The knowledge base has no relevant content yet. Ingest some documents first.");
        return Ok(());
    }

    let context: Vec<&str> = matches.iter().map(|m| m.text.as_str()).collect();
    let answer = llm
        .answer_question(question, &context.join("\n\n---\n\n"))
        .await?;

    println!("{}", answer);

    if sources {
        println!();
        println!("{}", "Sources:".bold());
        for m in &matches {
            let origin = m
                .metadata
                .get("file_path")
                .or_else(|| m.metadata.get("title"))
                .and_then(|v| v.as_str())
                .unwrap_or(&m.id);
            println!("  {:.3}  {}", m.score, origin.cyan());
        }
    }

    Ok(())
}
