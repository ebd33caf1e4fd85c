//! Vector collection abstraction for Kikitori.
//!
//! A collection is a named set of text documents with metadata and ids,
//! queried by text similarity. The indexer only talks to the [`Collection`]
//! trait; [`MemoryCollection`] is the in-process implementation.

mod memory;

pub use memory::{MemoryClient, MemoryCollection};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-document metadata (`{"source": "<file name>"}` for transcripts).
pub type Metadata = BTreeMap<String, String>;

/// Metadata key naming the file a document was read from.
pub const SOURCE_KEY: &str = "source";

/// A document as submitted to, or returned from, a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}

impl DocumentRecord {
    /// Create a record whose metadata holds only its source name.
    pub fn with_source(
        id: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(SOURCE_KEY.to_string(), source.into());
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }
}

/// Optional restrictions applied before ranking.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Every key must be present with exactly this value.
    pub metadata: Metadata,
    /// Document text must contain this substring.
    pub document_contains: Option<String>,
}

impl QueryFilter {
    /// Restrict to documents read from `source`.
    pub fn source(source: impl Into<String>) -> Self {
        let mut filter = Self::default();
        filter.metadata.insert(SOURCE_KEY.to_string(), source.into());
        filter
    }

    pub fn with_document_contains(mut self, needle: impl Into<String>) -> Self {
        self.document_contains = Some(needle.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.document_contains.is_none()
    }

    /// Whether a record passes this filter.
    pub fn matches(&self, content: &str, metadata: &Metadata) -> bool {
        let metadata_ok = self
            .metadata
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value));
        let content_ok = self
            .document_contains
            .as_deref()
            .map_or(true, |needle| content.contains(needle));
        metadata_ok && content_ok
    }
}

/// Raw query output: one inner list per query text, best match first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub ids: Vec<Vec<String>>,
    pub documents: Vec<Vec<String>>,
    pub metadatas: Vec<Vec<Metadata>>,
    /// Cosine distance (`1 - cosine similarity`); lower is closer.
    pub distances: Vec<Vec<f32>>,
}

/// A single hit, borrowed from a [`QueryResult`].
#[derive(Debug, Clone, Copy)]
pub struct QueryMatch<'a> {
    pub id: &'a str,
    pub document: &'a str,
    pub metadata: &'a Metadata,
    pub distance: f32,
}

impl QueryResult {
    /// Number of query texts answered.
    pub fn query_count(&self) -> usize {
        self.ids.len()
    }

    /// Hits for the `query_index`-th query text, best first.
    pub fn matches(&self, query_index: usize) -> Vec<QueryMatch<'_>> {
        let (Some(ids), Some(documents), Some(metadatas), Some(distances)) = (
            self.ids.get(query_index),
            self.documents.get(query_index),
            self.metadatas.get(query_index),
            self.distances.get(query_index),
        ) else {
            return Vec::new();
        };

        ids.iter()
            .zip(documents)
            .zip(metadatas)
            .zip(distances)
            .map(|(((id, document), metadata), distance)| QueryMatch {
                id,
                document,
                metadata,
                distance: *distance,
            })
            .collect()
    }
}

/// Trait for vector collection implementations.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name.
    fn name(&self) -> &str;

    /// Insert documents. The three lists are parallel and must be equally long.
    ///
    /// Returns how many documents were actually added.
    async fn add(
        &self,
        documents: Vec<String>,
        metadatas: Vec<Metadata>,
        ids: Vec<String>,
    ) -> Result<usize>;

    /// Insert records in one batch.
    async fn add_records(&self, records: Vec<DocumentRecord>) -> Result<usize> {
        let mut documents = Vec::with_capacity(records.len());
        let mut metadatas = Vec::with_capacity(records.len());
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            documents.push(record.content);
            metadatas.push(record.metadata);
            ids.push(record.id);
        }
        self.add(documents, metadatas, ids).await
    }

    /// Return the `n_results` most similar documents for each query text.
    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
        filter: Option<&QueryFilter>,
    ) -> Result<QueryResult>;

    /// Fetch stored documents by id. Unknown ids are ignored.
    async fn get(&self, ids: &[String]) -> Result<Vec<DocumentRecord>>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }

    #[test]
    fn test_filter_matches() {
        let record = DocumentRecord::with_source("x", "hello world", "x.txt");

        assert!(QueryFilter::default().matches(&record.content, &record.metadata));
        assert!(QueryFilter::source("x.txt").matches(&record.content, &record.metadata));
        assert!(!QueryFilter::source("y.txt").matches(&record.content, &record.metadata));
        assert!(QueryFilter::source("x.txt")
            .with_document_contains("world")
            .matches(&record.content, &record.metadata));
        assert!(!QueryFilter::default()
            .with_document_contains("bye")
            .matches(&record.content, &record.metadata));
    }

    #[test]
    fn test_query_result_matches() {
        let record = DocumentRecord::with_source("doc1", "text", "a.txt");
        let result = QueryResult {
            ids: vec![vec![record.id.clone()]],
            documents: vec![vec![record.content.clone()]],
            metadatas: vec![vec![record.metadata.clone()]],
            distances: vec![vec![0.25]],
        };

        let hits = result.matches(0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "doc1");
        assert_eq!(hits[0].metadata.get(SOURCE_KEY).map(String::as_str), Some("a.txt"));
        assert!(result.matches(1).is_empty());
    }
}
