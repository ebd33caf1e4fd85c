//! Data models for caption transcripts.

use serde::{Deserialize, Serialize};

/// A single timed caption line as delivered by the transcript service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    #[serde(default)]
    pub start: f64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

impl CaptionEntry {
    /// Create a new caption entry.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// An ordered caption sequence for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Caption language that was selected.
    pub language: String,
    /// Caption entries in playback order.
    pub entries: Vec<CaptionEntry>,
}

impl Transcript {
    /// Create a new transcript.
    pub fn new(
        video_id: impl Into<String>,
        language: impl Into<String>,
        entries: Vec<CaptionEntry>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            language: language.into(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total duration in seconds (end of the last entry).
    pub fn duration_seconds(&self) -> f64 {
        self.entries.last().map(CaptionEntry::end).unwrap_or(0.0)
    }

    /// Caption text only, one element per entry.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text.as_str())
    }
}
