//! Transcript fetching: resolve a video, download its captions, persist them.

use crate::config::Settings;
use crate::error::{KikitoriError, Result};
use crate::transcript::{Transcript, TranscriptStore};
use crate::transcript_source::{
    looks_like_url, resolve_video_id, TranscriptSource, YtDlpTranscriptSource,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Downloads transcripts and writes them into a [`TranscriptStore`].
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
    store: TranscriptStore,
    languages: Vec<String>,
}

impl TranscriptFetcher {
    /// Create a fetcher using yt-dlp and the configured transcripts directory.
    pub fn new(settings: &Settings) -> Self {
        Self::with_components(
            Arc::new(YtDlpTranscriptSource::with_program(&settings.youtube.ytdlp_path)),
            TranscriptStore::new(settings.transcripts_dir()),
            settings.transcripts.languages.clone(),
        )
    }

    /// Create a fetcher with custom components.
    pub fn with_components(
        source: Arc<dyn TranscriptSource>,
        store: TranscriptStore,
        languages: Vec<String>,
    ) -> Self {
        Self {
            source,
            store,
            languages,
        }
    }

    /// Override the language preference order.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Download the transcript for a video ID or URL.
    #[instrument(skip(self))]
    pub async fn get_transcript(&self, video_id_or_url: &str) -> Result<Transcript> {
        let video_id = resolve_video_id(video_id_or_url).ok_or_else(|| {
            KikitoriError::InvalidInput(format!("Invalid video ID or URL: {}", video_id_or_url))
        })?;

        if looks_like_url(video_id_or_url) {
            info!("Resolved {} to video ID {}", video_id_or_url, video_id);
        }
        info!("Downloading transcript for video ID: {}", video_id);

        self.source.fetch_transcript(&video_id, &self.languages).await
    }

    /// Persist caption text for `filename_or_url`.
    pub fn save_transcript(
        &self,
        transcript: &Transcript,
        filename_or_url: &str,
    ) -> Result<PathBuf> {
        self.store.save(&transcript.entries, filename_or_url)
    }

    /// Download a transcript and save it under its video ID.
    pub async fn fetch_and_save(&self, video_id_or_url: &str) -> Result<FetchResult> {
        let transcript = self.get_transcript(video_id_or_url).await?;
        let path = self.save_transcript(&transcript, &transcript.video_id)?;

        Ok(FetchResult { transcript, path })
    }
}

/// Result of fetching and saving a transcript.
#[derive(Debug)]
pub struct FetchResult {
    /// The downloaded transcript, timing included.
    pub transcript: Transcript,
    /// File the caption text was written to.
    pub path: PathBuf,
}
