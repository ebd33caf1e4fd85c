//! Local feature-hashing embedder.
//!
//! Produces deterministic bag-of-features vectors without any model or network
//! access. Quality is far below a learned model, but similar texts do land
//! close together, which is enough for small transcript collections.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default vector size.
pub const DEFAULT_DIMENSIONS: usize = 384;

const WORD_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.8;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Hashes word unigrams, word bigrams and character trigrams into a fixed-size vector.
///
/// Character trigrams matter for Japanese captions, which carry no spaces.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_DIMENSIONS)
    }

    /// Create an embedder producing vectors of `dimensions` entries (at least 1).
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed a single text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let mut embedding = vec![0.0; self.dimensions];

        for word in &words {
            self.add_feature(&mut embedding, ("w", *word), WORD_WEIGHT);
        }

        for pair in words.windows(2) {
            self.add_feature(&mut embedding, ("b", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        for word in &words {
            let chars: Vec<char> = word.chars().collect();
            for gram in chars.windows(3) {
                self.add_feature(&mut embedding, ("c", gram), TRIGRAM_WEIGHT);
            }
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in embedding.iter_mut() {
                *val /= magnitude;
            }
        }

        embedding
    }

    /// Signed feature hashing: one bit of the hash picks the sign to reduce collision bias.
    fn add_feature<T: Hash>(&self, embedding: &mut [f32], feature: T, weight: f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let hash = hasher.finish();

        let idx = (hash % self.dimensions as u64) as usize;
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        embedding[idx] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
