//! Transcript output formatting (plain text, JSON, SRT, VTT).

use super::Transcript;
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One caption text per line, the same layout as saved transcript files.
    #[default]
    Txt,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use txt, json, srt, or vtt.", s)),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct TranscriptExport<'a> {
    pub video_id: &'a str,
    pub language: &'a str,
    pub duration_seconds: f64,
    pub entries: &'a [super::CaptionEntry],
}

impl<'a> From<&'a Transcript> for TranscriptExport<'a> {
    fn from(transcript: &'a Transcript) -> Self {
        Self {
            video_id: &transcript.video_id,
            language: &transcript.language,
            duration_seconds: transcript.duration_seconds(),
            entries: &transcript.entries,
        }
    }
}

/// Format a transcript for output.
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Txt => format_txt(transcript),
        OutputFormat::Json => format_json(transcript),
        OutputFormat::Srt => format_cues(transcript, "", ','),
        OutputFormat::Vtt => format_cues(transcript, "WEBVTT\n\n", '.'),
    }
}

/// Newline-terminated caption text, timing dropped.
pub fn format_txt(transcript: &Transcript) -> String {
    let mut output = String::new();
    for line in transcript.lines() {
        output.push_str(line);
        output.push('\n');
    }
    output
}

fn format_json(transcript: &Transcript) -> String {
    let export = TranscriptExport::from(transcript);
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// SRT and WebVTT only differ in the header and the millisecond separator.
fn format_cues(transcript: &Transcript, header: &str, ms_separator: char) -> String {
    let mut output = String::from(header);

    for (i, entry) in transcript.entries.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_cue_timestamp(entry.start, ms_separator),
            format_cue_timestamp(entry.end(), ms_separator)
        ));
        output.push_str(&entry.text);
        output.push_str("\n\n");
    }

    output
}

/// Format a cue timestamp (00:00:00,000 or 00:00:00.000).
fn format_cue_timestamp(seconds: f64, ms_separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, ms_separator, ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::CaptionEntry;

    fn sample_transcript() -> Transcript {
        Transcript::new(
            "test1234567",
            "en",
            vec![
                CaptionEntry::new("Hello world.", 0.0, 2.5),
                CaptionEntry::new("This is a test.", 2.5, 2.5),
            ],
        )
    }

    #[test]
    fn test_format_txt() {
        let txt = format_transcript(&sample_transcript(), OutputFormat::Txt);
        assert_eq!(txt, "Hello world.\nThis is a test.\n");
    }

    #[test]
    fn test_format_json() {
        let json = format_transcript(&sample_transcript(), OutputFormat::Json);
        assert!(json.contains("\"video_id\": \"test1234567\""));
        assert!(json.contains("\"duration_seconds\": 5.0"));
    }

    #[test]
    fn test_format_srt() {
        let srt = format_transcript(&sample_transcript(), OutputFormat::Srt);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,500\nHello world.\n\n"));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000"));
    }

    #[test]
    fn test_format_vtt() {
        let vtt = format_transcript(&sample_transcript(), OutputFormat::Vtt);
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:02.500"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert_eq!("webvtt".parse::<OutputFormat>().unwrap(), OutputFormat::Vtt);
        assert!("docx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cue_timestamp() {
        assert_eq!(format_cue_timestamp(0.0, ','), "00:00:00,000");
        assert_eq!(format_cue_timestamp(61.5, ','), "00:01:01,500");
        assert_eq!(format_cue_timestamp(3661.123, '.'), "01:01:01.123");
    }
}
