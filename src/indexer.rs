//! Corpus indexing: scan transcript files into a collection and query it.
//!
//! Lifecycle is construct → [`CorpusIndexer::load`] → [`CorpusIndexer::query`],
//! and both steps may be repeated on the same instance.

use crate::collection::{Collection, DocumentRecord, QueryFilter, QueryResult};
use crate::config::Settings;
use crate::error::Result;
use crate::transcript::TRANSCRIPT_EXTENSION;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Documents inserted when the transcripts directory yields nothing, so that
/// queries still have something to rank.
///
/// Ids contain a `/`, which no file name does, so they never collide with
/// transcript ids.
const FALLBACK_DOCUMENTS: [(&str, &str, &str); 2] = [
    ("example/doc1", "this is textfile1", "textfile1"),
    ("example/doc2", "This is textfile2", "textfile2"),
];

/// Records found by a directory scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// One record per readable `.txt` file, sorted by file name.
    pub records: Vec<DocumentRecord>,
    /// Files that matched but could not be read, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Read every `.txt` file in `dir` as one document.
///
/// The record id is the file name without its extension, so rescanning an
/// unchanged directory produces identical ids. A missing directory is empty.
#[instrument]
pub fn scan_directory(dir: &Path) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();

    if !dir.is_dir() {
        warn!("Directory {} does not exist", dir.display());
        return Ok(outcome);
    }

    let suffix = format!(".{}", TRANSCRIPT_EXTENSION);
    let mut candidates: Vec<(String, PathBuf)> = std::fs::read_dir(dir)?
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            name.ends_with(&suffix).then(|| (name, entry.path()))
        })
        .collect();
    candidates.sort();

    for (name, path) in candidates {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let id = name.strip_suffix(&suffix).unwrap_or(&name).to_string();
                debug!("Read {} ({} bytes)", name, content.len());
                outcome.records.push(DocumentRecord::with_source(id, content, name));
            }
            Err(e) => {
                warn!("Error reading {}: {}", name, e);
                outcome.skipped.push((path, e.to_string()));
            }
        }
    }

    Ok(outcome)
}

/// The fixed documents used when no transcripts were found.
pub fn fallback_records() -> Vec<DocumentRecord> {
    FALLBACK_DOCUMENTS
        .iter()
        .map(|(id, content, source)| DocumentRecord::with_source(*id, *content, *source))
        .collect()
}

/// Summary of one [`CorpusIndexer::load`] call.
#[derive(Debug, Clone)]
pub struct IndexReport {
    /// Documents the collection accepted.
    pub added: usize,
    /// Transcript files that could not be read.
    pub skipped: Vec<(PathBuf, String)>,
    /// Whether the fallback documents were inserted instead of transcripts.
    pub used_fallback: bool,
    /// Sources of the records submitted, in submission order.
    pub sources: Vec<String>,
}

/// Loads a transcripts directory into a collection and queries it.
pub struct CorpusIndexer {
    collection: Arc<dyn Collection>,
    dir: PathBuf,
    default_query: String,
    n_results: usize,
}

impl CorpusIndexer {
    /// Create an indexer over `dir`.
    pub fn new(collection: Arc<dyn Collection>, dir: impl Into<PathBuf>) -> Self {
        Self {
            collection,
            dir: dir.into(),
            default_query: "This is a query document".to_string(),
            n_results: 2,
        }
    }

    /// Create an indexer using the configured directory and query defaults.
    pub fn from_settings(collection: Arc<dyn Collection>, settings: &Settings) -> Self {
        Self::new(collection, settings.transcripts_dir())
            .with_default_query(&settings.collection.default_query)
            .with_n_results(settings.collection.n_results)
    }

    /// Set the query used by [`CorpusIndexer::query_default`].
    pub fn with_default_query(mut self, query: &str) -> Self {
        self.default_query = query.to_string();
        self
    }

    /// Set the result count used by [`CorpusIndexer::query_default`].
    pub fn with_n_results(mut self, n_results: usize) -> Self {
        self.n_results = n_results;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn collection(&self) -> &Arc<dyn Collection> {
        &self.collection
    }

    /// Scan the directory and submit every transcript in one batch.
    ///
    /// Falls back to two fixed example documents if no transcript was found.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn load(&self) -> Result<IndexReport> {
        let ScanOutcome { records, skipped } = scan_directory(&self.dir)?;

        let used_fallback = records.is_empty();
        let records = if used_fallback {
            info!("No transcripts found, adding example documents");
            fallback_records()
        } else {
            records
        };

        let sources: Vec<String> = records
            .iter()
            .filter_map(|r| r.source().map(str::to_string))
            .collect();

        let added = self.collection.add_records(records).await?;
        info!("Added {} documents to '{}'", added, self.collection.name());

        Ok(IndexReport {
            added,
            skipped,
            used_fallback,
            sources,
        })
    }

    /// Query the collection with a single text.
    pub async fn query(
        &self,
        query_text: &str,
        n_results: usize,
        filter: Option<&QueryFilter>,
    ) -> Result<QueryResult> {
        self.collection
            .query(&[query_text.to_string()], n_results, filter)
            .await
    }

    /// Run the configured example query.
    pub async fn query_default(&self) -> Result<QueryResult> {
        self.query(&self.default_query, self.n_results, None).await
    }
}
