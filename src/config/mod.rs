use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "moodscribe";

fn default_date_format() -> String {
    "%a %d %b %Y".to_string()
}

fn is_valid_date_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the journal is stored (defaults to the platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Desktop notification when an entry is saved
    #[serde(default)]
    pub notifications: bool,

    /// Name of the last user who signed in (pre-fills the sign-in form)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_user: Option<String>,

    /// Start with the password visible
    #[serde(default)]
    pub reveal_password: bool,

    /// chrono format string for dates in the journal list
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Colour overrides, e.g. `accent = "#64eafa"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theme: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            notifications: false,
            last_user: None,
            reveal_password: false,
            date_format: default_date_format(),
            theme: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(APP_DIR);

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };
        Self::load_from(&path)
    }

    /// Defaults are written only when the file is missing. A file that cannot
    /// be read or parsed is left untouched and reported as an error.
    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = AppConfig::default();
            if let Err(e) = config.write_to(path) {
                eprintln!("moodscribe: could not write default config: {:#}", e);
            }
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content).context("Invalid config.toml")?;
        if config.date_format.trim().is_empty() || !is_valid_date_format(&config.date_format) {
            // Config loads before logging is set up
            eprintln!("moodscribe: unusable date_format {:?}, using default", config.date_format);
            config.date_format = default_date_format();
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let mut clean_config = self.clone();
        if clean_config.last_user.as_ref().map(|s| s.trim().is_empty()).unwrap_or(false) {
            clean_config.last_user = None;
        }

        clean_config.write_to(&path)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Directory holding the persisted store and the log file
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?
            .join(APP_DIR);
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let mut theme = BTreeMap::new();
        theme.insert("accent".to_string(), "#64eafa".to_string());
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/tmp/moodscribe")),
            notifications: true,
            last_user: Some("Ada Lovelace".to_string()),
            reveal_password: false,
            date_format: "%Y-%m-%d".to_string(),
            theme,
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(config.data_dir, deserialized.data_dir);
        assert_eq!(config.last_user, deserialized.last_user);
        assert_eq!(deserialized.theme.get("accent").map(String::as_str), Some("#64eafa"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert!(!config.notifications);
        assert_eq!(config.date_format, default_date_format());
        assert!(config.theme.is_empty());
    }

    #[test]
    fn test_blank_date_format_falls_back() {
        let config = AppConfig::parse("date_format = \"  \"").unwrap();
        assert_eq!(config.date_format, default_date_format());
    }

    #[test]
    fn test_broken_date_format_falls_back() {
        let config = AppConfig::parse("date_format = \"%Y %\"").unwrap();
        assert_eq!(config.date_format, default_date_format());
    }

    #[test]
    fn test_missing_file_gets_defaults_written() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.data_dir.is_none());
        assert!(path.exists());
    }

    #[test]
    fn test_broken_file_is_reported_and_kept() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let original = "data_dir = \"/srv/my-journal\"\nlast_user = \"Ada\"\nnotifications = tru\n";
        std::fs::write(&path, original).unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_valid_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/srv/my-journal\"\nlast_user = \"Ada\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/my-journal")));
        assert_eq!(config.last_user.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/srv/journal")),
            ..AppConfig::default()
        };
        assert_eq!(config.resolve_data_dir().unwrap(), PathBuf::from("/srv/journal"));
    }
}
