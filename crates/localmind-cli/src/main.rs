//! LocalMind CLI - Ingest local folders into a vector index and ask
//! questions over them.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// LocalMind - local documents, vectorized and askable
#[derive(Parser)]
#[command(name = "localmind")]
#[command(version)]
#[command(about = "Local document ingestion for retrieval-augmented Q&A", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize LocalMind (create config file and data directories)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage scanned folders
    #[command(subcommand)]
    Folder(FolderCommands),

    /// Scan a registered folder into the vector index
    Scan {
        /// Folder id (or unique id prefix)
        folder_id: String,
    },

    /// Ingest a single file or raw text directly
    Ingest {
        /// File to ingest
        file: Option<String>,

        /// Raw text to ingest instead of a file
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Document id (re-using one overwrites the previous ingest)
        #[arg(long)]
        doc_id: Option<String>,

        /// Document title stored in chunk metadata
        #[arg(long)]
        title: Option<String>,
    },

    /// Ask a question over the indexed documents
    Ask {
        /// Your question
        question: String,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Show the source chunks used for the answer
        #[arg(short, long)]
        sources: bool,
    },

    /// Browse the vector index
    Vectors {
        /// Maximum records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Records to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the active configuration
    Show,
    /// Print the config file path
    Path,
}

#[derive(Subcommand)]
enum FolderCommands {
    /// Register a directory for scanning
    Add {
        /// Display name
        name: String,
        /// Directory path
        path: String,
    },
    /// List registered folders
    List {
        /// Case-insensitive substring filter on name or path
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Remove a folder config (indexed vectors are kept)
    Remove {
        /// Folder id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
        },
        Commands::Folder(cmd) => match cmd {
            FolderCommands::Add { name, path } => commands::folder::add(&name, &path),
            FolderCommands::List { filter } => commands::folder::list(filter.as_deref()),
            FolderCommands::Remove { id } => commands::folder::remove(&id),
        },
        Commands::Scan { folder_id } => commands::scan::run(&folder_id).await,
        Commands::Ingest {
            file,
            text,
            doc_id,
            title,
        } => commands::ingest::run(file.as_deref(), text, doc_id, title).await,
        Commands::Ask {
            question,
            top_k,
            sources,
        } => commands::ask::run(&question, top_k, sources).await,
        Commands::Vectors { limit, offset } => commands::vectors::run(limit, offset).await,
    }
}
