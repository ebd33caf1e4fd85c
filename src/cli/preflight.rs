//! Pre-flight checks before operations that reach external services.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{KikitoriError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Fetching requires yt-dlp.
    Fetch,
    /// Querying requires an API key when embeddings come from OpenAI.
    Query,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Fetch => {
            check_tool(&settings.youtube.ytdlp_path)?;
        }
        Operation::Query => {
            if settings.embedding.provider == EmbeddingProvider::OpenAI {
                check_api_key()?;
            }
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    if crate::openai::is_api_key_configured() {
        Ok(())
    } else {
        Err(KikitoriError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...' \
             or use embedding.provider = \"hash\""
                .to_string(),
        ))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(KikitoriError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(KikitoriError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(KikitoriError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
