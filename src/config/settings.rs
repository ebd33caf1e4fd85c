//! Configuration settings for Kikitori.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub transcripts: TranscriptSettings,
    pub youtube: YoutubeSettings,
    pub embedding: EmbeddingSettings,
    pub collection: CollectionSettings,
}

/// Where transcripts are written and read back from.
///
/// Both the fetcher and the indexer resolve the same directory from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Directory holding `<video_id>.txt` files.
    pub dir: String,
    /// Caption languages in order of preference. The first available one wins.
    pub languages: Vec<String>,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            dir: "~/.kikitori/transcripts".to_string(),
            languages: vec!["ja".to_string(), "en".to_string()],
        }
    }
}

/// YouTube-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local feature-hashing embedder. Needs no network or API key.
    #[default]
    Hash,
    /// OpenAI embeddings API.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hash" | "local" => Ok(EmbeddingProvider::Hash),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Hash => write!(f, "hash"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (hash, openai).
    pub provider: EmbeddingProvider,
    /// Embedding model to use (openai only).
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
        }
    }
}

/// Vector collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Name of the collection transcripts are indexed into.
    pub name: String,
    /// Number of results returned by a query.
    pub n_results: usize,
    /// Query issued when none is given on the command line.
    pub default_query: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            name: "jlptn5-listening-comprehension".to_string(),
            n_results: 2,
            default_query: "This is a query document".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::KikitoriError;

        if self.transcripts.languages.is_empty() {
            return Err(KikitoriError::Config(
                "transcripts.languages must list at least one language".to_string(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(KikitoriError::Config(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }
        if self.collection.n_results == 0 {
            return Err(KikitoriError::Config(
                "collection.n_results must be at least 1".to_string(),
            ));
        }
        if self.collection.name.trim().is_empty() {
            return Err(KikitoriError::Config(
                "collection.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::KikitoriError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kikitori")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded transcripts directory path.
    pub fn transcripts_dir(&self) -> PathBuf {
        Self::expand_path(&self.transcripts.dir)
    }
}
