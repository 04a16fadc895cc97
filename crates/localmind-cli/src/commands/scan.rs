//! Scan command implementation.

use super::AppContext;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use localmind_core::ScanStatus;
use std::time::Duration;

/// Scan a registered folder into the vector index, showing progress.
pub async fn run(folder_id: &str) -> Result<()> {
    let ctx = AppContext::open()?;
    let folder_id = ctx.resolve_folder_id(folder_id)?;
    let folder = ctx.folders.get(&folder_id)?;
    let ingestor = ctx.ingestor()?;

    println!("{} {} ({})", "Scanning:".cyan(), folder.name, folder.path);

    let (job, handle) = ingestor.submit(&folder_id)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    loop {
        if let Ok(snapshot) = ingestor.job(&job.id) {
            match snapshot.status {
                ScanStatus::Pending => pb.set_message("waiting for a scan slot".to_string()),
                ScanStatus::Running => pb.set_message(format!(
                    "processing {}/{} files",
                    snapshot.processed_files, snapshot.total_files
                )),
                _ => {}
            }
        }
        if handle.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    handle.await?;

    let job = ingestor.job(&job.id)?;
    match job.status {
        ScanStatus::Completed => {
            pb.finish_with_message(format!(
                "{} {}/{} files",
                "done,".green(),
                job.processed_files,
                job.total_files
            ));
        }
        _ => pb.finish_with_message("scan failed".red().to_string()),
    }

    println!("  Job:    {}", job.id);
    println!("  Status: {}", job.status);
    println!("  Files:  {}/{}", job.processed_files, job.total_files);
    if let Some(message) = &job.error_message {
        println!("  {} {}", "Last error:".yellow(), message);
    }
    if let (Some(finished), started) = (job.finished_at, job.started_at) {
        let elapsed = finished.signed_duration_since(started);
        println!("  Took:   {}s", elapsed.num_seconds());
    }

    Ok(())
}
