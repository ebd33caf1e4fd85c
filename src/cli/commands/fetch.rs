//! Fetch command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::fetcher::TranscriptFetcher;
use crate::transcript::{format_transcript, OutputFormat};
use anyhow::Result;

/// Run the fetch command.
pub async fn run_fetch(
    input: &str,
    print: bool,
    format: &str,
    languages: Vec<String>,
    settings: Settings,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    preflight::check(Operation::Fetch, &settings)?;

    let fetcher = TranscriptFetcher::new(&settings).with_languages(languages);

    let spinner = Output::spinner(&format!("Downloading transcript for {}...", input));
    let result = fetcher.fetch_and_save(input).await;
    spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Failed to fetch transcript: {}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!("Saved transcript to {}", result.path.display()));
    Output::kv("Video ID", &result.transcript.video_id);
    Output::kv("Language", &result.transcript.language);
    Output::kv("Lines", &result.transcript.len().to_string());

    if print {
        println!();
        println!("{}", format_transcript(&result.transcript, format));
    }

    Ok(())
}
