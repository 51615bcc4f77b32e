//! Config file and CLI overrides

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use logpane_core::{AutoScrollPolicy, StyleEdit};

/// Entry cap when neither the file nor the CLI sets one
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

const APP_DIR: &str = "logpane";
const CONFIG_FILE: &str = "config.toml";
const HISTORY_FILE: &str = "filter_history.toml";

/// Contents of `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Entry cap, 0 means unbounded
    pub max_entries: Option<usize>,
    pub auto_scroll: Option<AutoScrollPolicy>,
    pub history_path: Option<PathBuf>,
    /// Per-logger style overrides, keyed by logger name
    pub styles: BTreeMap<String, LoggerStyle>,
}

/// A `[styles.<logger>]` table
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerStyle {
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub bold: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The explicit path, else `<config dir>/logpane/config.toml` if present
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE)) {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Style tables as edits; a bad color fails the whole config
    pub fn style_edits(&self) -> Result<Vec<StyleEdit>> {
        self.styles
            .iter()
            .map(|(logger, style)| {
                StyleEdit::parse(
                    logger,
                    style.background.as_deref().unwrap_or_default(),
                    style.foreground.as_deref().unwrap_or_default(),
                    style.bold,
                )
                .map_err(|err| anyhow!("styles.{logger}: {err}"))
            })
            .collect()
    }
}

/// Values given on the command line, each overriding the file
#[derive(Debug, Default)]
pub struct Overrides {
    pub max_entries: Option<usize>,
    pub auto_scroll: Option<AutoScrollPolicy>,
    pub history_path: Option<PathBuf>,
}

/// Effective startup settings
#[derive(Debug)]
pub struct Settings {
    pub max_entries: Option<usize>,
    pub auto_scroll: AutoScrollPolicy,
    pub history_path: PathBuf,
    pub styles: Vec<StyleEdit>,
}

impl Settings {
    pub fn resolve(config: Config, overrides: Overrides) -> Result<Self> {
        let styles = config.style_edits()?;
        let max_entries = overrides
            .max_entries
            .or(config.max_entries)
            .unwrap_or(DEFAULT_MAX_ENTRIES);

        Ok(Self {
            max_entries: (max_entries > 0).then_some(max_entries),
            auto_scroll: overrides
                .auto_scroll
                .or(config.auto_scroll)
                .unwrap_or_default(),
            history_path: overrides
                .history_path
                .or(config.history_path)
                .unwrap_or_else(default_history_path),
            styles,
        })
    }
}

pub fn default_history_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_DIR).join(HISTORY_FILE),
        None => PathBuf::from(format!("./{APP_DIR}_{HISTORY_FILE}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logpane_core::Color;

    const SAMPLE: &str = r##"
max_entries = 500
auto_scroll = "smart"
history_path = "/tmp/history.toml"

[styles.main]
foreground = "yellow"
bold = true

[styles."worker-1"]
background = "#202040"
"##;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.max_entries, Some(500));
        assert_eq!(config.auto_scroll, Some(AutoScrollPolicy::ScrollIfAtBottom));
        assert_eq!(config.styles.len(), 2);

        let edits = config.style_edits().unwrap();
        let main = edits.iter().find(|e| e.logger_name == "main").unwrap();
        assert_eq!(main.foreground, Some(Color::Yellow));
        assert_eq!(main.background, None);
        assert!(main.bold);

        let worker = edits.iter().find(|e| e.logger_name == "worker-1").unwrap();
        assert_eq!(worker.background, Some(Color::Rgb(0x20, 0x20, 0x40)));
        assert!(!worker.bold);
    }

    #[test]
    fn test_invalid_color_is_an_error() {
        let config = Config::parse("[styles.main]\nforeground = \"not-a-color\"\n").unwrap();
        let err = config.style_edits().unwrap_err();
        assert!(err.to_string().contains("styles.main"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::parse("max_entrys = 3\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = Config::parse(SAMPLE).unwrap();
        let settings = Settings::resolve(
            config,
            Overrides {
                max_entries: Some(0),
                auto_scroll: Some(AutoScrollPolicy::AlwaysScroll),
                history_path: None,
            },
        )
        .unwrap();

        assert_eq!(settings.max_entries, None);
        assert_eq!(settings.auto_scroll, AutoScrollPolicy::AlwaysScroll);
        assert_eq!(settings.history_path, PathBuf::from("/tmp/history.toml"));
        assert_eq!(settings.styles.len(), 2);
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::resolve(Config::default(), Overrides::default()).unwrap();
        assert_eq!(settings.max_entries, Some(DEFAULT_MAX_ENTRIES));
        assert_eq!(settings.auto_scroll, AutoScrollPolicy::Disabled);
        assert!(settings.history_path.ends_with(HISTORY_FILE));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_entries = 42\n").unwrap();

        let config = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.max_entries, Some(42));

        let missing = dir.path().join("missing.toml");
        assert!(Config::discover(Some(&missing)).is_err());
    }
}
