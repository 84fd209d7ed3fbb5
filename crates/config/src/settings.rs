// Application settings
// Loaded from ~/.config/replaygrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use replaygrid_engine::validation::{Column, ColumnKind};

pub const DEFAULT_DATA_URL: &str = "https://www.phpied.com/files/reactbook/table-data.json";

pub fn default_headers() -> Vec<String> {
    ["Book", "Author", "Language", "Published", "Sales"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Replay
    #[serde(rename = "replay.intervalMs")]
    pub replay_interval_ms: u64,

    // Data source
    #[serde(rename = "data.url")]
    pub data_url: String,

    // Table
    #[serde(rename = "table.headers")]
    pub headers: Vec<String>,

    /// Per-column kinds; empty = infer from loaded data
    #[serde(rename = "table.columnKinds")]
    pub column_kinds: Vec<ColumnKind>,

    // Export
    #[serde(rename = "export.directory")]
    pub export_directory: Option<PathBuf>, // None = current directory
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            replay_interval_ms: 1000,
            data_url: DEFAULT_DATA_URL.to_string(),
            headers: default_headers(),
            column_kinds: Vec::new(),
            export_directory: None,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Replay cadence in milliseconds
    "replay.intervalMs": 1000,

    // Bootstrap data (JSON array of arrays) fetched by `rgrid view`
    "data.url": "https://www.phpied.com/files/reactbook/table-data.json",

    // Column titles, left to right
    "table.headers": ["Book", "Author", "Language", "Published", "Sales"],

    // Optional per-column kinds: "any", "text" or "number"
    // Leave empty to infer kinds from the loaded data
    "table.columnKinds": [],

    // Where `J`/`C` write data.json / data.csv (null = current directory)
    "export.directory": null
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("replaygrid");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file is created with the
    /// commented defaults; an unreadable or malformed one yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}", path.display(), e);
                    log::warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.replay_interval_ms.max(1))
    }

    /// Configured columns, or `None` when kinds should be inferred.
    /// Headers without a configured kind accept any value.
    pub fn columns(&self) -> Option<Vec<Column>> {
        if self.column_kinds.is_empty() {
            return None;
        }
        Some(
            self.headers
                .iter()
                .enumerate()
                .map(|(idx, title)| {
                    let kind = self.column_kinds.get(idx).copied().unwrap_or_default();
                    Column::new(title.clone(), kind)
                })
                .collect(),
        )
    }

    pub fn export_directory(&self) -> PathBuf {
        self.export_directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn create_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Error creating config directory: {}", e);
            return;
        }
    }

    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        log::warn!("Error writing default settings.json: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_commented_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replaygrid").join("settings.json");

        let settings = Settings::load_from(&path);
        assert_eq!(settings, Settings::default());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("// Replay cadence"));
        // The commented file parses back to the same defaults
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            "{\n  // faster\n  \"replay.intervalMs\": 250,\n  \"table.columnKinds\": [\"text\", \"text\", \"text\", \"any\", \"number\"]\n}",
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.replay_interval(), Duration::from_millis(250));
        assert_eq!(settings.headers, default_headers());
        assert_eq!(settings.data_url, DEFAULT_DATA_URL);

        let columns = settings.columns().unwrap();
        assert_eq!(columns[4].kind, ColumnKind::Number);
        assert_eq!(columns[4].title, "Sales");
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_no_kinds_means_infer() {
        assert!(Settings::default().columns().is_none());
    }

    #[test]
    fn test_short_kind_list_pads_with_any() {
        let settings = Settings {
            column_kinds: vec![ColumnKind::Text],
            ..Settings::default()
        };
        let columns = settings.columns().unwrap();
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0].kind, ColumnKind::Text);
        assert_eq!(columns[1].kind, ColumnKind::Any);
    }
}
