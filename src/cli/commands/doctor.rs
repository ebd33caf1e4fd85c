//! Doctor command - verify system requirements and configuration.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::{EmbeddingProvider, Settings};
use crate::transcript::TranscriptStore;
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Print a section of checks and move them into `all`.
fn report_section(title: &str, section: Vec<CheckResult>, all: &mut Vec<CheckResult>) {
    println!("{}", style(title).bold());
    for check in &section {
        check.print();
    }
    println!();
    all.extend(section);
}

/// Run all diagnostic checks.
///
/// Exits with status 1 when any check fails.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Kikitori Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    report_section(
        "External Tools",
        vec![check_tool(&settings.youtube.ytdlp_path, install_hint_ytdlp())],
        &mut checks,
    );
    report_section("Embeddings", vec![check_embedding(settings)], &mut checks);
    report_section("Directories", check_directories(settings), &mut checks);
    report_section("Configuration", vec![check_config_file(config_path)], &mut checks);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Kikitori.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Kikitori is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(program: &str, hint: &str) -> CheckResult {
    match Command::new(program).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(program, &version_display)
        }
        Ok(_) => CheckResult::error(program, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(program, "not found", hint)
        }
        Err(e) => CheckResult::error(program, &format!("error: {}", e), hint),
    }
}

/// Check the embedding provider and, for OpenAI, its API key.
fn check_embedding(settings: &Settings) -> CheckResult {
    let name = format!("Provider ({})", settings.embedding.provider);
    match settings.embedding.provider {
        EmbeddingProvider::Hash => CheckResult::ok(
            &name,
            &format!("local, {} dimensions", settings.embedding.dimensions),
        ),
        EmbeddingProvider::OpenAI => {
            check_openai_api_key(&name, std::env::var("OPENAI_API_KEY").ok())
        }
    }
}

/// Check an OpenAI API key value.
fn check_openai_api_key(name: &str, key: Option<String>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 && key.is_ascii() => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok(name, &format!("OPENAI_API_KEY configured ({})", masked))
        }
        Some(key) if key.trim().is_empty() => CheckResult::error(
            name,
            "OPENAI_API_KEY is empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            name,
            "OPENAI_API_KEY set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            name,
            "OPENAI_API_KEY not set",
            "Set with: export OPENAI_API_KEY='sk-...' or use embedding.provider = \"hash\"",
        ),
    }
}

/// Check the transcripts directory.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let dir = settings.transcripts_dir();
    if !dir.exists() {
        results.push(CheckResult::warning(
            "Transcripts directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first fetch",
        ));
        return results;
    }

    match TranscriptStore::new(&dir).list() {
        Ok(files) => {
            let total: u64 = files.iter().map(|f| f.size_bytes).sum();
            results.push(CheckResult::ok(
                "Transcripts directory",
                &format!("{} ({} files, {})", dir.display(), files.len(), format_size(total)),
            ));
        }
        Err(e) => results.push(CheckResult::error(
            "Transcripts directory",
            &format!("{}: {}", dir.display(), e),
            "Check the directory permissions",
        )),
    }

    results
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: kikitori config init",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_check_openai_api_key() {
        let ok = check_openai_api_key("p", Some("sk-abcdefghijklmnopqrstuvwxyz".to_string()));
        assert_eq!(ok.status, CheckStatus::Ok);
        assert!(ok.message.contains("sk-abcd...wxyz"));

        assert_eq!(check_openai_api_key("p", None).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key("p", Some(String::new())).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key("p", Some("abc".to_string())).status, CheckStatus::Warning);
    }

    #[test]
    fn test_check_embedding_hash() {
        let check = check_embedding(&Settings::default());
        assert_eq!(check.status, CheckStatus::Ok);
        assert_eq!(check.name, "Provider (hash)");
    }

    #[test]
    fn test_check_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.txt"), "hello\n").unwrap();
        let mut settings = Settings::default();
        settings.transcripts.dir = dir.path().display().to_string();

        let checks = check_directories(&settings);
        assert_eq!(checks[0].status, CheckStatus::Ok);
        assert!(checks[0].message.contains("1 files"));

        settings.transcripts.dir = dir.path().join("missing").display().to_string();
        assert_eq!(check_directories(&settings)[0].status, CheckStatus::Warning);
    }

    #[test]
    fn test_check_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(check_config_file(&path).status, CheckStatus::Warning);

        std::fs::write(&path, "").unwrap();
        assert_eq!(check_config_file(&path).status, CheckStatus::Ok);
    }
}
