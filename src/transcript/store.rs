//! Flat-file transcript storage.
//!
//! Each transcript is a UTF-8 text file `<video_id>.txt` holding one caption
//! text per line. Timing is not kept.

use super::CaptionEntry;
use crate::error::{KikitoriError, Result};
use crate::transcript_source::resolve_video_id;
use chrono::{DateTime, Utc};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// File extension of saved transcripts.
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// A transcript file found on disk.
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    /// Identifier (file name without extension).
    pub video_id: String,
    /// Full path.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time, if the platform reports one.
    pub modified_at: Option<DateTime<Utc>>,
}

/// Reads and writes transcripts under a single directory.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    /// Create a store rooted at `dir`. The directory is created lazily on save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a transcript with this identifier is stored at.
    pub fn path_for(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", video_id, TRANSCRIPT_EXTENSION))
    }

    /// Write caption text to `<dir>/<id>.txt`, one newline-terminated line per entry.
    ///
    /// `name_or_url` may be a bare identifier or a YouTube URL. Line breaks
    /// inside a caption are written as spaces.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub fn save(&self, entries: &[CaptionEntry], name_or_url: &str) -> Result<PathBuf> {
        if entries.is_empty() {
            return Err(KikitoriError::InvalidInput(
                "Refusing to save an empty transcript".to_string(),
            ));
        }

        let video_id = resolve_video_id(name_or_url).ok_or_else(|| {
            KikitoriError::InvalidInput(format!("Invalid filename or URL: {}", name_or_url))
        })?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&video_id);

        let mut writer = BufWriter::new(std::fs::File::create(&path)?);
        for entry in entries {
            writer.write_all(single_line(&entry.text).as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        info!("Transcript saved to {}", path.display());
        Ok(path)
    }

    /// Read a saved transcript back as its caption lines, in order.
    pub fn load_lines(&self, video_id: &str) -> Result<Vec<String>> {
        let path = self.path_for(video_id);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                KikitoriError::NotFound(format!("No transcript at {}", path.display()))
            } else {
                KikitoriError::Io(e)
            }
        })?;

        Ok(content.lines().map(str::to_string).collect())
    }

    /// Whether a transcript for this identifier exists.
    pub fn contains(&self, video_id: &str) -> bool {
        self.path_for(video_id).is_file()
    }

    /// List transcript files, sorted by identifier. A missing directory is empty.
    pub fn list(&self) -> Result<Vec<TranscriptFile>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(video_id) = name.strip_suffix(&format!(".{}", TRANSCRIPT_EXTENSION)) else {
                continue;
            };

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            files.push(TranscriptFile {
                video_id: video_id.to_string(),
                path: entry.path(),
                size_bytes: metadata.len(),
                modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        files.sort_by(|a, b| a.video_id.cmp(&b.video_id));
        Ok(files)
    }
}

/// Replace line breaks so a caption occupies exactly one line on disk.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn entries(texts: &[&str]) -> Vec<CaptionEntry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| CaptionEntry::new(*t, i as f64, 1.0))
            .collect()
    }

    #[test]
    fn test_save_writes_text_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path().join("transcripts"));

        let path = store.save(&entries(&["a", "b"]), "abc").unwrap();

        assert_eq!(path, dir.path().join("transcripts").join("abc.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_save_resolves_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        let path = store
            .save(&entries(&["x"]), "https://www.youtube.com/watch?v=sY7L5cfCWno&list=PL1")
            .unwrap();

        assert!(path.ends_with("sY7L5cfCWno.txt"));
        assert!(store.contains("sY7L5cfCWno"));
    }

    #[test]
    fn test_save_empty_transcript_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path().join("transcripts"));

        let err = store.save(&[], "abc").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_save_unresolvable_name_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        let err = store
            .save(&entries(&["a"]), "https://www.youtube.com/@somechannel")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_text_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        let original = entries(&["一つ", "two", "", "三つ"]);

        store.save(&original, "vid").unwrap();
        let lines = store.load_lines("vid").unwrap();

        let texts: Vec<&str> = original.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(lines, texts);
    }

    #[test]
    fn test_save_flattens_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        store.save(&entries(&["a\nb", "c\r", "d\r\ne"]), "vid").unwrap();

        assert_eq!(store.load_lines("vid").unwrap(), vec!["a b", "c ", "d  e"]);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        assert_eq!(store.load_lines("nope").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        assert!(TranscriptStore::new(dir.path().join("missing")).list().unwrap().is_empty());

        store.save(&entries(&["b"]), "bbb").unwrap();
        store.save(&entries(&["a"]), "aaa").unwrap();
        std::fs::write(dir.path().join("notes.md"), "skip").unwrap();

        let files = store.list().unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.video_id.as_str()).collect();
        assert_eq!(ids, vec!["aaa", "bbb"]);
        assert_eq!(files[0].size_bytes, 2);
    }
}
