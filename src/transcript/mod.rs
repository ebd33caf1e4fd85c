//! Caption transcripts: models, flat-file storage, and output formats.

mod format;
mod models;
mod store;

pub use format::{format_transcript, format_txt, OutputFormat, TranscriptExport};
pub use models::{CaptionEntry, Transcript};
pub use store::{TranscriptFile, TranscriptStore, TRANSCRIPT_EXTENSION};
