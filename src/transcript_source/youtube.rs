//! YouTube captions via yt-dlp.

use super::TranscriptSource;
use crate::error::{KikitoriError, Result};
use crate::transcript::{CaptionEntry, Transcript};
use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Suffix yt-dlp gives the speech-recognition track in the spoken language.
/// Every other automatic track is a machine translation of it.
const ORIGINAL_TRACK_SUFFIX: &str = "-orig";

/// Fetches caption tracks with `yt-dlp` in YouTube's `json3` subtitle format.
///
/// Only uploaded tracks and untranslated speech recognition are considered,
/// so a video is never returned in a language nobody spoke or wrote.
pub struct YtDlpTranscriptSource {
    program: String,
}

impl YtDlpTranscriptSource {
    pub fn new() -> Self {
        Self::with_program("yt-dlp")
    }

    /// Use a specific yt-dlp executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("--no-playlist").arg("--no-warnings");
        command
    }

    /// Run yt-dlp to completion and return its stdout.
    async fn run(&self, mut command: Command, video_id: &str) -> Result<Vec<u8>> {
        let result = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KikitoriError::ToolNotFound(self.program.clone()));
            }
            Err(e) => {
                return Err(KikitoriError::ServiceUnavailable(format!(
                    "Failed to run {}: {}",
                    self.program, e
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KikitoriError::ServiceUnavailable(format!(
                "yt-dlp failed for {}: {}",
                video_id,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    /// Ask yt-dlp which caption tracks the video has.
    #[instrument(skip(self))]
    async fn list_tracks(&self, video_id: &str) -> Result<VideoInfo> {
        let mut command = self.command();
        command
            .arg("--dump-single-json")
            .arg("--skip-download")
            .arg(watch_url(video_id));

        let stdout = self.run(command, video_id).await?;
        serde_json::from_slice(&stdout).map_err(|e| {
            KikitoriError::ServiceUnavailable(format!(
                "Unreadable yt-dlp metadata for {}: {}",
                video_id, e
            ))
        })
    }

    /// Download one caption track into `work_dir` and parse it.
    #[instrument(skip(self, work_dir))]
    async fn download_track(
        &self,
        video_id: &str,
        track: &CaptionTrack,
        work_dir: &Path,
    ) -> Result<Vec<CaptionEntry>> {
        let write_flag = if track.automatic {
            "--write-auto-subs"
        } else {
            "--write-subs"
        };

        let mut command = self.command();
        command
            .arg("--skip-download")
            .arg(write_flag)
            .arg("--sub-langs")
            .arg(&track.key)
            .arg("--sub-format")
            .arg("json3")
            .arg("--quiet")
            .arg("--output")
            .arg(work_dir.join("%(id)s.%(ext)s"))
            .arg(watch_url(video_id));
        self.run(command, video_id).await?;

        let path = find_subtitle_file(work_dir)?.ok_or_else(|| {
            KikitoriError::ServiceUnavailable(format!(
                "yt-dlp listed {} captions for {} but wrote none",
                track.key, video_id
            ))
        })?;
        debug!("Reading {}", path.display());

        let raw = std::fs::read_to_string(&path)?;
        parse_json3(&raw)
    }
}

impl Default for YtDlpTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<Transcript> {
        let video = self.list_tracks(video_id).await?;

        let Some(track) = video.select_track(languages) else {
            return Err(KikitoriError::NotFound(format!(
                "No captions for {} in any of: {}",
                video_id,
                languages.join(", ")
            )));
        };
        info!(
            "Using {} captions for {} (track {})",
            track.language, video_id, track.key
        );

        let work_dir = tempfile::tempdir()?;
        let entries = self.download_track(video_id, &track, work_dir.path()).await?;
        info!("Parsed {} caption entries", entries.len());

        Ok(Transcript::new(video_id, track.language, entries))
    }
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Caption tracks as reported by `yt-dlp --dump-single-json`.
#[derive(Debug, Default, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    subtitles: Option<BTreeMap<String, IgnoredAny>>,
    #[serde(default)]
    automatic_captions: Option<BTreeMap<String, IgnoredAny>>,
}

/// A caption track chosen for download.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CaptionTrack {
    /// Preferred language this track satisfies.
    language: String,
    /// Track key passed to `--sub-langs`.
    key: String,
    /// Speech recognition rather than an uploaded track.
    automatic: bool,
}

impl VideoInfo {
    /// The first preferred language with an uploaded track or an untranslated
    /// speech-recognition track. Within one language, uploaded tracks win.
    fn select_track(&self, languages: &[String]) -> Option<CaptionTrack> {
        languages.iter().find_map(|language| {
            let uploaded = self
                .subtitles
                .as_ref()
                .is_some_and(|tracks| tracks.contains_key(language));
            if uploaded {
                return Some(CaptionTrack {
                    language: language.clone(),
                    key: language.clone(),
                    automatic: false,
                });
            }

            let key = format!("{}{}", language, ORIGINAL_TRACK_SUFFIX);
            let recognized = self
                .automatic_captions
                .as_ref()
                .is_some_and(|tracks| tracks.contains_key(&key));
            recognized.then(|| CaptionTrack {
                language: language.clone(),
                key,
                automatic: true,
            })
        })
    }
}

/// Locate the subtitle file yt-dlp wrote, if any.
fn find_subtitle_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json3"))
        .collect();
    found.sort();
    Ok(found.into_iter().next())
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parse a YouTube `json3` subtitle document into caption entries.
///
/// Events without text (window definitions, bare line breaks) are dropped.
/// Line breaks inside a caption become spaces so every entry stays one line.
pub fn parse_json3(raw: &str) -> Result<Vec<CaptionEntry>> {
    let document: Json3Document = serde_json::from_str(raw).map_err(|e| {
        KikitoriError::ServiceUnavailable(format!("Failed to parse subtitle data: {}", e))
    })?;

    let entries = document
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.trim().replace('\n', " ");
            if text.is_empty() {
                return None;
            }
            Some(CaptionEntry::new(
                text,
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
            ))
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SAMPLE: &str = r#"{
        "wireMagic": "pb3",
        "events": [
            {"tStartMs": 0, "dDurationMs": 60000, "id": 1, "wpWinPosId": 1},
            {"tStartMs": 1200, "dDurationMs": 2300, "wWinId": 1,
             "segs": [{"utf8": "はじめまして"}]},
            {"tStartMs": 3500, "dDurationMs": 10, "aAppend": 1, "segs": [{"utf8": "\n"}]},
            {"tStartMs": 3510, "dDurationMs": 2000,
             "segs": [{"utf8": "よろしく"}, {"utf8": "お願いします", "tOffsetMs": 400}]},
            {"tStartMs": 5600, "dDurationMs": 1500, "segs": [{"utf8": "また\nあした"}]}
        ]
    }"#;

    #[test]
    fn test_parse_json3() {
        let entries = parse_json3(SAMPLE).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], CaptionEntry::new("はじめまして", 1.2, 2.3));
        assert_eq!(entries[1].text, "よろしくお願いします");
        assert_eq!(entries[1].start, 3.51);
        assert_eq!(entries[2].text, "また あした");
    }

    #[test]
    fn test_parse_json3_without_events() {
        assert!(parse_json3(r#"{"wireMagic": "pb3"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_json3_rejects_garbage() {
        let err = parse_json3("<transcript/>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_find_subtitle_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_subtitle_file(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join("abc.info.json"), "{}").unwrap();
        std::fs::write(dir.path().join("abc.ja.json3"), "{}").unwrap();

        let found = find_subtitle_file(dir.path()).unwrap().unwrap();
        assert!(found.ends_with("abc.ja.json3"));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let source = YtDlpTranscriptSource::with_program("kikitori-test-no-such-ytdlp");
        let err = source
            .fetch_transcript("dQw4w9WgXcQ", &["ja".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, KikitoriError::ToolNotFound(_)));
    }

    fn info(json: &str) -> VideoInfo {
        serde_json::from_str(json).unwrap()
    }

    fn languages(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_select_skips_translated_tracks() {
        let info = info(r#"{
            "subtitles": {},
            "automatic_captions": {"ja": [], "fr": [], "en": [], "en-orig": []}
        }"#);

        let track = info.select_track(&languages(&["ja", "en"])).unwrap();
        assert_eq!(track.language, "en");
        assert_eq!(track.key, "en-orig");
        assert!(track.automatic);
    }

    #[test]
    fn test_select_prefers_uploaded_track() {
        let info = info(r#"{
            "subtitles": {"ja": [], "en": []},
            "automatic_captions": {"ja-orig": []}
        }"#);

        let track = info.select_track(&languages(&["ja", "en"])).unwrap();
        assert_eq!(track.key, "ja");
        assert!(!track.automatic);
    }

    #[test]
    fn test_select_without_tracks() {
        let ja = languages(&["ja"]);
        assert!(info(r#"{"subtitles": null}"#).select_track(&ja).is_none());
        assert!(info("{}").select_track(&ja).is_none());
    }

    /// Stand-in for yt-dlp: prints `@INFO@` for metadata requests and writes a
    /// one-caption json3 file naming the requested track otherwise.
    #[cfg(unix)]
    const FAKE_YTDLP: &str = r#"#!/bin/sh
out=""
lang=""
dump=0
while [ "$#" -gt 0 ]; do
  case "$1" in
    -J|--dump-single-json) dump=1 ;;
    --sub-langs) shift; lang="$1" ;;
    --output) shift; out="$1" ;;
  esac
  shift
done
if [ "$dump" = 1 ]; then
  cat <<'JSON'
@INFO@
JSON
  exit 0
fi
dir=$(dirname "$out")
events='{"events":[{"tStartMs":0,"dDurationMs":1500,"segs":[{"utf8":"caption %s"}]}]}'
printf "$events" "$lang" > "$dir/vid.$lang.json3"
"#;

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("yt-dlp");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    /// Retries while the freshly written script is still busy for exec.
    async fn fetch(source: &YtDlpTranscriptSource, codes: &[&str]) -> Result<Transcript> {
        for _ in 0..10 {
            match source.fetch_transcript("vid", &languages(codes)).await {
                Err(KikitoriError::ServiceUnavailable(msg)) if msg.contains("busy") => {
                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                }
                other => return other,
            }
        }
        source.fetch_transcript("vid", &languages(codes)).await
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_uses_second_language_when_first_is_translated() {
        let dir = tempfile::tempdir().unwrap();
        let info = r#"{
            "id": "vid",
            "subtitles": {},
            "automatic_captions": {"ja": [], "en-orig": [], "en": []}
        }"#;
        let program = write_script(dir.path(), &FAKE_YTDLP.replace("@INFO@", info));
        let source = YtDlpTranscriptSource::with_program(program);

        let transcript = fetch(&source, &["ja", "en"]).await.unwrap();

        assert_eq!(transcript.video_id, "vid");
        assert_eq!(transcript.language, "en");
        assert_eq!(
            transcript.entries,
            vec![CaptionEntry::new("caption en-orig", 0.0, 1.5)]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_uploaded_first_language() {
        let dir = tempfile::tempdir().unwrap();
        let info = r#"{"id": "vid", "subtitles": {"ja": [], "en": []}}"#;
        let program = write_script(dir.path(), &FAKE_YTDLP.replace("@INFO@", info));
        let source = YtDlpTranscriptSource::with_program(program);

        let transcript = fetch(&source, &["ja", "en"]).await.unwrap();

        assert_eq!(transcript.language, "ja");
        assert_eq!(transcript.entries[0].text, "caption ja");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_no_preferred_language() {
        let dir = tempfile::tempdir().unwrap();
        let info = r#"{"subtitles": {"de": []}, "automatic_captions": {"de-orig": []}}"#;
        let program = write_script(dir.path(), &FAKE_YTDLP.replace("@INFO@", info));
        let source = YtDlpTranscriptSource::with_program(program);

        let err = fetch(&source, &["ja", "en"]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let program = write_script(
            dir.path(),
            "#!/bin/sh\necho 'ERROR: Video unavailable' >&2\nexit 1\n",
        );
        let source = YtDlpTranscriptSource::with_program(program);

        let err = fetch(&source, &["ja"]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(err.to_string().contains("Video unavailable"));
    }
}
