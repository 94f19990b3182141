//! Configuration module for sqlbridge.
//!
//! Handles loading and managing configuration from:
//! - Default values
//! - Config file (~/.config/sqlbridge/config.toml)
//! - Environment variables
//! - Command-line arguments (`--config`)

mod keymap;
mod schema;

pub use keymap::{Action, KeyBinding, Keymap};
pub use schema::{
    CompletionConfig, Config, CustomKeyBinding, EditorConfig, EditorMode, KeymapConfig,
};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Returns the config directory path.
///
/// Checks `SQLBRIDGE_CONFIG_DIR` environment variable first, then falls back
/// to the system default (~/.config/sqlbridge on Linux/macOS).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SQLBRIDGE_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join("sqlbridge"))
}

/// Returns the default config file path (~/.config/sqlbridge/config.toml)
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Returns the log file path (~/.config/sqlbridge/sqlbridge.log)
pub fn log_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("sqlbridge.log"))
}

/// Load configuration from the default path or return defaults
pub fn load_config() -> Result<Config> {
    if let Some(path) = config_path() {
        if path.exists() {
            return load_config_from(&path);
        }
    }
    Ok(Config::default())
}

/// Load configuration from a specific path
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.mode, EditorMode::Sql);
        assert!(config.editor.line_numbers);
        assert!(config.completion.keywords);
    }

    #[test]
    fn test_config_paths() {
        let config_dir = config_dir();
        let config_path = config_path();
        let log_path = log_path();

        if let (Some(dir), Some(cfg), Some(log)) = (config_dir, config_path, log_path) {
            assert!(cfg.starts_with(&dir));
            assert!(log.starts_with(&dir));
            assert!(cfg.ends_with("config.toml"));
            assert!(log.ends_with("sqlbridge.log"));
        }
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[editor]
line_numbers = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.editor.line_numbers);
        // Other fields should be default
        assert_eq!(config.editor.mode, EditorMode::Sql);
        assert_eq!(config.completion.max_visible, 8);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[completion]\nkeywords = false").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert!(!config.completion.keywords);
    }

    #[test]
    fn test_load_config_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[editor\nbroken").unwrap();

        let err = load_config_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
