//! Configuration structures and loading.

use crate::error::ConfigResult;
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(crate::ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields the defaults. The `LLM_API_KEY` environment
    /// variable always overrides the file's value.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        if let Ok(key) = std::env::var("LLM_API_KEY") {
            if !key.is_empty() {
                config.llm.api_key = Some(key);
            }
        }

        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# LocalMind Configuration
# Local document ingestion for retrieval-augmented question answering

[general]
# Data directory for the folder registry and vector index
# data_dir = "~/.local/share/localmind"

[llm]
# OpenAI-compatible API base URL
base_url = "https://dashscope.aliyuncs.com/compatible-mode/v1"

# API key (the LLM_API_KEY environment variable takes precedence)
# api_key = "sk-..."

# Model for chat, summarization and answer generation
model = "qwen-plus"

# Model for generating embeddings
embedding_model = "text-embedding-v1"

# Request timeout in seconds
timeout_seconds = 120

# Characters of document text submitted for summarization
summary_input_chars = 4000

[scan]
# File extensions eligible for ingestion (lowercase, with leading dot)
supported_extensions = [".txt", ".md", ".markdown"]

# File name suffixes to skip even when the extension matches.
# Excalidraw exports are markdown-shaped but not ingestable text.
ignored_suffixes = [".excalidraw", ".excalidraw.md"]

# Maximum characters per chunk sent for embedding
chunk_max_chars = 500

# Bound on scans running at the same time
max_concurrent_scans = 2
"#
        .to_string()
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// LLM provider settings (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub embedding_model: String,
    pub timeout_seconds: u64,
    pub summary_input_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            api_key: None,
            model: "qwen-plus".to_string(),
            embedding_model: "text-embedding-v1".to_string(),
            timeout_seconds: 120,
            summary_input_chars: 4000,
        }
    }
}

/// Folder scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub supported_extensions: Vec<String>,
    pub ignored_suffixes: Vec<String>,
    pub chunk_max_chars: usize,
    pub max_concurrent_scans: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            supported_extensions: vec![
                ".txt".to_string(),
                ".md".to_string(),
                ".markdown".to_string(),
            ],
            ignored_suffixes: vec![".excalidraw".to_string(), ".excalidraw.md".to_string()],
            chunk_max_chars: 500,
            max_concurrent_scans: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.chunk_max_chars, 500);
        assert_eq!(config.scan.max_concurrent_scans, 2);
        assert!(config
            .scan
            .supported_extensions
            .contains(&".txt".to_string()));
        assert!(config
            .scan
            .ignored_suffixes
            .contains(&".excalidraw.md".to_string()));
        assert_eq!(config.llm.timeout_seconds, 120);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.llm.model, "qwen-plus");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.llm.model = "qwen-max".to_string();
        config.scan.chunk_max_chars = 800;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.llm.model, "qwen-max");
        assert_eq!(loaded.scan.chunk_max_chars, 800);
    }

    #[test]
    fn test_default_config_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.scan.chunk_max_chars, 500);
    }
}
