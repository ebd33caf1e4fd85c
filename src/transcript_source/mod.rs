//! Transcript source abstraction for Kikitori.
//!
//! A [`TranscriptSource`] turns a video ID plus a language preference list into
//! a caption [`Transcript`]. Video IDs are resolved from URLs here as well.

mod youtube;

pub use youtube::{parse_json3, YtDlpTranscriptSource};

use crate::error::Result;
use crate::transcript::Transcript;
use async_trait::async_trait;

/// Length of a YouTube video ID.
pub const VIDEO_ID_LEN: usize = 11;

/// URL markers that precede a video ID, checked in this order.
const VIDEO_ID_MARKERS: &[&str] = &["v=", "youtu.be/"];

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch captions for `video_id`, trying `languages` in order.
    ///
    /// The first language with captions wins; languages are never merged.
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<Transcript>;
}

/// Extract the video ID from a YouTube URL.
///
/// Takes up to 11 characters after the first `v=`, or failing that after
/// `youtu.be/`. The character set is not validated.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_MARKERS.iter().find_map(|marker| {
        let (_, rest) = url.split_once(marker)?;
        let id: String = rest.chars().take(VIDEO_ID_LEN).collect();
        Some(id)
    })
    .filter(|id| !id.is_empty())
}

/// Whether the input refers to a YouTube URL rather than a bare ID or filename.
pub fn looks_like_url(input: &str) -> bool {
    input.contains("youtube.com") || input.contains("youtu.be")
}

/// Resolve a URL, bare video ID, or filename stem to an identifier.
pub fn resolve_video_id(input: &str) -> Option<String> {
    if looks_like_url(input) {
        return extract_video_id(input);
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
