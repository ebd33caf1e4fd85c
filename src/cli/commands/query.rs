//! Query command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::collection::{MemoryClient, QueryFilter, SOURCE_KEY};
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::indexer::CorpusIndexer;
use anyhow::Result;

/// Build a filter from the command-line restrictions, if any were given.
fn build_filter(source: Option<String>, contains: Option<String>) -> Option<QueryFilter> {
    let mut filter = QueryFilter::default();
    if let Some(source) = source {
        filter.metadata.insert(SOURCE_KEY.to_string(), source);
    }
    if let Some(needle) = contains {
        filter = filter.with_document_contains(needle);
    }
    (!filter.is_empty()).then_some(filter)
}

/// Run the query command.
pub async fn run_query(
    query: Option<String>,
    n_results: Option<usize>,
    source: Option<String>,
    contains: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Query, &settings)?;

    let embedder = create_embedder(&settings.embedding)?;
    let client = MemoryClient::new(embedder);
    let collection = client.create_collection(&settings.collection.name)?;
    let indexer = CorpusIndexer::from_settings(collection, &settings);

    let spinner = Output::spinner(&format!("Indexing {}...", indexer.dir().display()));
    let report = indexer.load().await;
    spinner.finish_and_clear();
    let report = report?;

    for (path, reason) in &report.skipped {
        Output::warning(&format!("Skipped {}: {}", path.display(), reason));
    }
    if report.used_fallback {
        Output::warning(&format!(
            "No transcripts in {}, indexed example documents instead",
            indexer.dir().display()
        ));
    }

    let query_text = query.unwrap_or_else(|| settings.collection.default_query.clone());
    let n_results = n_results.unwrap_or(settings.collection.n_results);
    let filter = build_filter(source, contains);

    let result = indexer.query(&query_text, n_results, filter.as_ref()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    Output::info(&format!(
        "Indexed {} document(s) into '{}'",
        report.added,
        indexer.collection().name()
    ));

    let hits = result.matches(0);
    if hits.is_empty() {
        Output::warning("No results found matching your query.");
    } else {
        Output::success(&format!("Found {} results for \"{}\"", hits.len(), query_text));
        for (rank, hit) in hits.iter().enumerate() {
            Output::query_hit(
                rank + 1,
                hit.id,
                hit.metadata.get(SOURCE_KEY).map(String::as_str),
                hit.distance,
                hit.document,
            );
        }
    }

    Ok(())
}
