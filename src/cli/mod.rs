//! CLI module for Kikitori.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Kikitori - YouTube transcripts for listening practice
///
/// Downloads caption transcripts to plain text files and indexes them for
/// similarity search. "Kikitori" is Japanese for listening comprehension.
#[derive(Parser, Debug)]
#[command(name = "kikitori")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory transcripts are saved to and indexed from
    #[arg(long, global = true, env = "KIKITORI_TRANSCRIPTS_DIR")]
    pub transcripts_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a video's transcript and save it as a text file
    Fetch {
        /// YouTube URL or video ID
        input: String,

        /// Print the transcript after saving
        #[arg(short, long)]
        print: bool,

        /// Format used with --print (txt, json, srt, vtt)
        #[arg(long, default_value = "txt")]
        format: String,

        /// Caption language to try, in order of preference (repeatable)
        #[arg(short, long = "language")]
        languages: Vec<String>,
    },

    /// Index saved transcripts and run a similarity query
    Query {
        /// Query text (defaults to the configured example query)
        query: Option<String>,

        /// Number of results
        #[arg(short = 'n', long)]
        n_results: Option<usize>,

        /// Only match the transcript read from this file name (e.g. abc.txt)
        #[arg(long)]
        source: Option<String>,

        /// Only match transcripts containing this text
        #[arg(long)]
        contains: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List saved transcripts
    List,

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::parse_from([
            "kikitori",
            "fetch",
            "https://youtu.be/dQw4w9WgXcQ",
            "-l",
            "en",
            "-l",
            "ja",
            "--print",
        ]);

        match cli.command {
            Commands::Fetch { input, print, format, languages } => {
                assert_eq!(input, "https://youtu.be/dQw4w9WgXcQ");
                assert!(print);
                assert_eq!(format, "txt");
                assert_eq!(languages, vec!["en", "ja"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_with_global_flags() {
        let cli = Cli::parse_from([
            "kikitori",
            "query",
            "駅はどこ",
            "-n",
            "3",
            "--transcripts-dir",
            "/tmp/t",
            "-vv",
        ]);

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.transcripts_dir.as_deref(), Some("/tmp/t"));
        match cli.command {
            Commands::Query { query, n_results, json, .. } => {
                assert_eq!(query.as_deref(), Some("駅はどこ"));
                assert_eq!(n_results, Some(3));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
