//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command against the file at `config_path`.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: PathBuf) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config already exists at {}. Use --force to overwrite.",
                    config_path.display()
                ));
                return Ok(());
            }

            Settings::default().save_to(&config_path)?;
            Output::success(&format!("Created default config at {}", config_path.display()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(force: bool, path: &std::path::Path) {
        run_config(&ConfigAction::Init { force }, Settings::default(), path.to_path_buf()).unwrap();
    }

    #[test]
    fn test_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kikitori").join("config.toml");

        init(false, &path);

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.collection.name, "jlptn5-listening-comprehension");
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[collection]\nname = \"mine\"\n").unwrap();

        init(false, &path);
        assert!(std::fs::read_to_string(&path).unwrap().contains("mine"));

        init(true, &path);
        assert!(!std::fs::read_to_string(&path).unwrap().contains("mine"));
    }
}
