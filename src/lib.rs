//! Kikitori - YouTube transcripts for listening practice
//!
//! Downloads video captions to plain text files and indexes them into a
//! vector collection for similarity search.
//!
//! The name "Kikitori" (聞き取り) is Japanese for listening comprehension.
//!
//! # Overview
//!
//! The pipeline has two independent stages that share a transcripts directory:
//!
//! - Fetch: resolve a video ID or URL, download its captions in the first
//!   available preferred language and save one caption per line to
//!   `<video_id>.txt`
//! - Index: read every `.txt` file in the directory as one document, add the
//!   documents to a collection and answer nearest-neighbour queries
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `transcript_source` - Caption download abstraction (yt-dlp)
//! - `transcript` - Transcript model, formatting and file storage
//! - `fetcher` - Fetch stage coordination
//! - `embedding` - Embedding generation
//! - `collection` - In-memory vector collection
//! - `indexer` - Index stage coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use kikitori::collection::MemoryClient;
//! use kikitori::config::Settings;
//! use kikitori::embedding::create_embedder;
//! use kikitori::fetcher::TranscriptFetcher;
//! use kikitori::indexer::CorpusIndexer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!
//!     let fetcher = TranscriptFetcher::new(&settings);
//!     let saved = fetcher.fetch_and_save("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     println!("Saved {}", saved.path.display());
//!
//!     let client = MemoryClient::new(create_embedder(&settings.embedding)?);
//!     let collection = client.create_collection(&settings.collection.name)?;
//!     let indexer = CorpusIndexer::from_settings(collection, &settings);
//!     indexer.load().await?;
//!
//!     let result = indexer.query_default().await?;
//!     println!("{:?}", result.ids);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod collection;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fetcher;
pub mod indexer;
pub mod openai;
pub mod transcript;
pub mod transcript_source;

pub use error::{KikitoriError, Result};
