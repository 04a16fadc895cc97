//! CLI command implementations.

pub mod ask;
pub mod config;
pub mod folder;
pub mod ingest;
pub mod init;
pub mod scan;
pub mod vectors;

use anyhow::Context as _;
use localmind_config::{AppPaths, Config};
use localmind_ingest::Ingestor;
use localmind_llm::LlmClient;
use localmind_store::{FolderStore, SqliteIndex};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state most commands need.
pub struct AppContext {
    pub config: Config,
    pub paths: AppPaths,
    pub folders: Arc<FolderStore>,
    pub index: Arc<SqliteIndex>,
}

impl AppContext {
    pub fn open() -> anyhow::Result<Self> {
        let paths = AppPaths::new().context("could not determine application directories")?;
        let config = Config::load()?;

        let (folders_file, index_file) = match &config.general.data_dir {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                (dir.join("folders.json"), dir.join("localmind.db"))
            }
            None => (paths.folders_file.clone(), paths.index_file.clone()),
        };

        let folders = Arc::new(FolderStore::open(folders_file));
        let index = Arc::new(SqliteIndex::open(index_file)?);

        Ok(Self {
            config,
            paths,
            folders,
            index,
        })
    }

    /// Build the LLM client; fails when no API key is configured.
    pub fn llm(&self) -> anyhow::Result<LlmClient> {
        Ok(LlmClient::from_config(&self.config.llm)?)
    }

    /// Build the full ingestion pipeline.
    pub fn ingestor(&self) -> anyhow::Result<Ingestor> {
        let llm = Arc::new(self.llm()?);
        Ok(Ingestor::new(
            self.folders.clone(),
            self.index.clone(),
            llm.clone(),
            llm,
            &self.config.scan,
        ))
    }

    /// Resolve a folder id that may be a unique prefix.
    pub fn resolve_folder_id(&self, id: &str) -> anyhow::Result<String> {
        if self.folders.get(id).is_ok() {
            return Ok(id.to_string());
        }

        let matches: Vec<String> = self
            .folders
            .list(None)
            .into_iter()
            .filter(|cfg| cfg.id.starts_with(id))
            .map(|cfg| cfg.id)
            .collect();

        match matches.as_slice() {
            [one] => Ok(one.clone()),
            [] => anyhow::bail!("no folder matches '{}'", id),
            _ => anyhow::bail!("'{}' matches multiple folders, use the full id", id),
        }
    }
}
