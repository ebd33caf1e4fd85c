//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::TranscriptStore;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: &Settings) -> Result<()> {
    let store = TranscriptStore::new(settings.transcripts_dir());

    let files = match store.list() {
        Ok(files) => files,
        Err(e) => {
            Output::error(&format!("Failed to list transcripts: {}", e));
            return Err(e.into());
        }
    };

    if files.is_empty() {
        Output::info("No transcripts saved yet. Use 'kikitori fetch <input>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Saved Transcripts ({})", files.len()));
    println!();

    for file in &files {
        let modified = file
            .modified_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string());
        Output::transcript_file(&file.video_id, file.size_bytes, modified.as_deref());
    }

    println!();
    Output::kv("Directory", &store.dir().display().to_string());

    Ok(())
}
