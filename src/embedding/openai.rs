//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{KikitoriError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI has a limit on inputs per request.
const BATCH_SIZE: usize = 100;

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config("text-embedding-3-small", 1536)
    }

    /// Create a new OpenAI embedder with custom model and dimensions.
    pub fn with_config(model: &str, dimensions: usize) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            dimensions,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| KikitoriError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self.client.embeddings().create(request).await.map_err(|e| {
                KikitoriError::ServiceUnavailable(format!("Embedding API error: {}", e))
            })?;

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            if embeddings.len() != chunk.len() {
                return Err(KikitoriError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    embeddings.len()
                )));
            }

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OpenAIEmbedder::new().unwrap();
        assert_eq!(embedder.dimensions(), 1536);

        let embedder = OpenAIEmbedder::with_config("text-embedding-3-large", 3072).unwrap();
        assert_eq!(embedder.dimensions(), 3072);
        assert_eq!(embedder.model(), "text-embedding-3-large");
    }

    #[tokio::test]
    async fn test_empty_batch_skips_api() {
        let embedder = OpenAIEmbedder::new().unwrap();
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
