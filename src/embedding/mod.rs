//! Embedding generation for similarity search.

mod hash;
mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::{KikitoriError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| KikitoriError::Embedding("Empty embedding response".to_string()))
    }

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Build the embedder selected in the settings.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::Hash => {
            Arc::new(HashEmbedder::with_dimensions(settings.dimensions as usize))
        }
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.model,
            settings.dimensions as usize,
        )?),
    };
    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_embedder() {
        let settings = EmbeddingSettings {
            dimensions: 128,
            ..Default::default()
        };
        assert_eq!(create_embedder(&settings).unwrap().dimensions(), 128);

        let settings = EmbeddingSettings {
            provider: EmbeddingProvider::OpenAI,
            dimensions: 512,
            ..Default::default()
        };
        assert_eq!(create_embedder(&settings).unwrap().dimensions(), 512);
    }
}
