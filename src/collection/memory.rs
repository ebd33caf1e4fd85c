//! In-memory collection implementation.
//!
//! Nothing survives process exit. Search is brute-force cosine distance,
//! fine for a few thousand transcripts.

use super::{cosine_similarity, Collection, DocumentRecord, Metadata, QueryFilter, QueryResult};
use crate::embedding::Embedder;
use crate::error::{KikitoriError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, instrument, warn};

struct StoredDocument {
    record: DocumentRecord,
    embedding: Vec<f32>,
}

/// In-memory collection.
pub struct MemoryCollection {
    name: String,
    embedder: Arc<dyn Embedder>,
    documents: RwLock<Vec<StoredDocument>>,
}

impl MemoryCollection {
    /// Create an empty collection that embeds text with `embedder`.
    pub fn new(name: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            name: name.into(),
            embedder,
            documents: RwLock::new(Vec::new()),
        }
    }

    fn lock_error(&self) -> KikitoriError {
        KikitoriError::Collection(format!("collection '{}' lock poisoned", self.name))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<StoredDocument>>> {
        self.documents.read().map_err(|_| self.lock_error())
    }

    fn stored_ids(&self) -> Result<HashSet<String>> {
        Ok(self.read()?.iter().map(|d| d.record.id.clone()).collect())
    }

    fn is_new(&self, existing: &HashSet<String>, id: &str) -> bool {
        if existing.contains(id) {
            warn!("Document {} already exists in '{}', skipping", id, self.name);
            return false;
        }
        true
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<StoredDocument>>> {
        self.documents.write().map_err(|_| self.lock_error())
    }
}

impl std::fmt::Debug for MemoryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.documents.read().map(|docs| docs.len()).ok();
        f.debug_struct("MemoryCollection")
            .field("name", &self.name)
            .field("count", &count)
            .finish()
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(collection = %self.name, count = documents.len()))]
    async fn add(
        &self,
        documents: Vec<String>,
        metadatas: Vec<Metadata>,
        ids: Vec<String>,
    ) -> Result<usize> {
        if documents.len() != metadatas.len() || documents.len() != ids.len() {
            return Err(KikitoriError::Collection(format!(
                "documents ({}), metadatas ({}) and ids ({}) must have the same length",
                documents.len(),
                metadatas.len(),
                ids.len()
            )));
        }

        let mut batch_ids: HashSet<&str> = HashSet::with_capacity(ids.len());
        if let Some(duplicate) = ids.iter().find(|id| !batch_ids.insert(id.as_str())) {
            return Err(KikitoriError::Collection(format!(
                "duplicate id in batch: {}",
                duplicate
            )));
        }
        drop(batch_ids);

        let existing = self.stored_ids()?;
        let records: Vec<DocumentRecord> = documents
            .into_iter()
            .zip(metadatas)
            .zip(ids)
            .map(|((content, metadata), id)| DocumentRecord { id, content, metadata })
            .filter(|record| self.is_new(&existing, &record.id))
            .collect();

        if records.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != records.len() {
            return Err(KikitoriError::Embedding(format!(
                "Expected {} embeddings, got {}",
                records.len(),
                embeddings.len()
            )));
        }

        // Another add may have stored the same ids while embeddings were computed.
        let mut store = self.write()?;
        let existing: HashSet<String> = store.iter().map(|d| d.record.id.clone()).collect();
        let before = store.len();
        store.extend(
            records
                .into_iter()
                .zip(embeddings)
                .filter(|(record, _)| self.is_new(&existing, &record.id))
                .map(|(record, embedding)| StoredDocument { record, embedding }),
        );

        let added = store.len() - before;
        debug!("Added {} documents ({} total)", added, store.len());
        Ok(added)
    }

    #[instrument(skip_all, fields(collection = %self.name, n_results = n_results))]
    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
        filter: Option<&QueryFilter>,
    ) -> Result<QueryResult> {
        if query_texts.is_empty() {
            return Err(KikitoriError::InvalidInput(
                "at least one query text is required".to_string(),
            ));
        }
        if n_results == 0 {
            return Err(KikitoriError::InvalidInput("n_results must be at least 1".to_string()));
        }

        let query_embeddings = self.embedder.embed_batch(query_texts).await?;
        let store = self.read()?;
        let mut result = QueryResult::default();

        for query_embedding in &query_embeddings {
            let mut scored: Vec<(f32, &DocumentRecord)> = store
                .iter()
                .filter(|d| {
                    filter.map_or(true, |f| f.matches(&d.record.content, &d.record.metadata))
                })
                .map(|d| (1.0 - cosine_similarity(query_embedding, &d.embedding), &d.record))
                .collect();

            // Stable sort keeps insertion order among equal distances.
            scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(n_results);

            result.ids.push(scored.iter().map(|(_, r)| r.id.clone()).collect());
            result.documents.push(scored.iter().map(|(_, r)| r.content.clone()).collect());
            result.metadatas.push(scored.iter().map(|(_, r)| r.metadata.clone()).collect());
            result.distances.push(scored.iter().map(|(d, _)| *d).collect());
        }

        Ok(result)
    }

    async fn get(&self, ids: &[String]) -> Result<Vec<DocumentRecord>> {
        let store = self.read()?;
        let by_id: HashMap<&str, &DocumentRecord> =
            store.iter().map(|d| (d.record.id.as_str(), &d.record)).collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|r| (*r).clone()))
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}

/// Holds named in-memory collections sharing one embedder.
pub struct MemoryClient {
    embedder: Arc<dyn Embedder>,
    collections: RwLock<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryClient {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn lock_error() -> KikitoriError {
        KikitoriError::Collection("client lock poisoned".to_string())
    }

    /// Create a new collection. Fails if the name is taken.
    pub fn create_collection(&self, name: &str) -> Result<Arc<MemoryCollection>> {
        let mut collections = self.collections.write().map_err(|_| Self::lock_error())?;
        if collections.contains_key(name) {
            return Err(KikitoriError::Collection(format!("collection '{}' already exists", name)));
        }

        let collection = Arc::new(MemoryCollection::new(name, self.embedder.clone()));
        collections.insert(name.to_string(), collection.clone());
        Ok(collection)
    }

    /// Return the named collection, creating it if needed.
    pub fn get_or_create_collection(&self, name: &str) -> Result<Arc<MemoryCollection>> {
        let mut collections = self.collections.write().map_err(|_| Self::lock_error())?;
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::new(name, self.embedder.clone())));
        Ok(collection.clone())
    }

    /// Return an existing collection.
    pub fn get_collection(&self, name: &str) -> Result<Arc<MemoryCollection>> {
        let collections = self.collections.read().map_err(|_| Self::lock_error())?;
        collections
            .get(name)
            .cloned()
            .ok_or_else(|| KikitoriError::NotFound(format!("collection '{}'", name)))
    }

    /// Drop a collection and its documents.
    pub fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(|_| Self::lock_error())?;
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| KikitoriError::NotFound(format!("collection '{}'", name)))
    }

    /// Names of all collections, sorted.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().map_err(|_| Self::lock_error())?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
