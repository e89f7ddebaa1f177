use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::export::FormatKind;

/// Top-level configuration for exif-export.
///
/// Controls the default output format and how exported files are written.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_export::config::Config;
/// use exif_export::export::FormatKind;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.export.default_format = FormatKind::Yaml;
/// config.export.atomic_write = false;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output format and write behavior.
    pub export: ExportConfig,
}

/// Controls how metadata files are written.
///
/// # Example
///
/// ```rust
/// use exif_export::config::ExportConfig;
/// use exif_export::export::FormatKind;
///
/// let options = ExportConfig {
///     default_format: FormatKind::Csv,
///     atomic_write: true,         // temp file + rename
///     overwrite_existing: false,  // never replace an existing file
///     output_dir: None,           // write next to the image
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Format used when none is given on the command line.
    pub default_format: FormatKind,
    /// Write to a temporary file in the destination directory, then rename over the destination.
    pub atomic_write: bool,
    /// If `false`, refuse to replace an existing destination file.
    pub overwrite_existing: bool,
    /// Directory for exported files. `None` writes next to each image.
    pub output_dir: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: FormatKind::Text,
            atomic_write: true,
            overwrite_existing: true,
            output_dir: None,
        }
    }
}

impl Config {
    /// Resolve the config file path, in the same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// The configured output directory, if any.
    pub fn output_dir(&self) -> Option<&Path> {
        self.export.output_dir.as_deref().map(Path::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.export.default_format, FormatKind::Text);
        assert!(config.export.atomic_write);
        assert!(config.export.overwrite_existing);
        assert!(config.output_dir().is_none());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(dir.path().join("absent.json").as_path())).unwrap();
        assert_eq!(config.export.default_format, FormatKind::Text);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.export.default_format = FormatKind::Yaml;
        config.export.overwrite_existing = false;
        config.export.output_dir = Some("exports".into());
        config.save(Some(path.as_path())).unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.export.default_format, FormatKind::Yaml);
        assert!(!loaded.export.overwrite_existing);
        assert_eq!(loaded.output_dir(), Some(Path::new("exports")));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export": {"default_format": "csv"}}"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.export.default_format, FormatKind::Csv);
        assert!(config.export.atomic_write);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());
    }
}
