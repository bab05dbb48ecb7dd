//! Application configuration, loaded from ~/.textcmd/config.yaml.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for the command-line front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Grammar file to load instead of the built-in grammar.
    #[serde(default)]
    pub grammar: Option<PathBuf>,
    /// Tracing filter used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Colour results and buffer listings.
    #[serde(default = "default_color")]
    pub color: bool,
    /// Commands kept in the interactive history.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Buffer contents for demo mode.
    #[serde(default = "default_demo_buffer")]
    pub demo_buffer: Vec<String>,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_color() -> bool {
    true
}

fn default_history_size() -> usize {
    100
}

fn default_demo_buffer() -> Vec<String> {
    [
        "Welcome to the DSL demo",
        "Hello World!",
        "This is line 3",
        "Another line here",
        "Sample text for testing",
        "Final line",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grammar: None,
            log_filter: default_log_filter(),
            color: default_color(),
            history_size: default_history_size(),
            demo_buffer: default_demo_buffer(),
        }
    }
}

/// Get the config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".textcmd").join("config.yaml"))
}

impl AppConfig {
    /// Load from the standard path, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load from `path`. Returns None if it doesn't exist or doesn't parse.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                None
            }
        }
    }
}
