//! modalform configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".modalform.yml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR); the CLI flag wins over this
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Terminal UI settings
    pub tui: TuiConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let width = self.tui.dialog_width_percent;
        if !(20..=100).contains(&width) {
            return Err(eyre::eyre!(
                "tui.dialog-width-percent must be between 20 and 100, got {}",
                width
            ));
        }
        if self.tui.tick_rate_ms == 0 {
            return Err(eyre::eyre!("tui.tick-rate-ms must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Otherwise `./.modalform.yml`, then
    /// `~/.config/modalform/modalform.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_locations() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Silent on every failure; `load` reports problems once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::default_locations(),
        };

        candidates
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::parse_file(&path).ok())
            .and_then(|config| config.log_level)
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("modalform").join("modalform.yml"));
        }
        locations
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        serde_yaml::from_str(&content).context("Failed to parse config file")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::parse_file(path.as_ref())?;
        config.validate()?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Terminal UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Input poll interval; also the redraw cadence when idle
    #[serde(rename = "tick-rate-ms")]
    pub tick_rate_ms: u64,

    /// Dialog width as a percentage of the terminal width
    #[serde(rename = "dialog-width-percent")]
    pub dialog_width_percent: u16,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 33, // ~30 FPS
            dialog_width_percent: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.log_level.is_none());
        assert_eq!(config.tui.tick_rate_ms, 33);
        assert_eq!(config.tui.dialog_width_percent, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: DEBUG
tui:
  tick-rate-ms: 50
  dialog-width-percent: 80
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.tui.tick_rate_ms, 50);
        assert_eq!(config.tui.dialog_width_percent, 80);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
tui:
  dialog-width-percent: 45
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.log_level.is_none());
        assert_eq!(config.tui.tick_rate_ms, 33);
        assert_eq!(config.tui.dialog_width_percent, 45);
    }

    #[test]
    fn test_validate_rejects_narrow_dialog() {
        let mut config = Config::default();
        config.tui.dialog_width_percent = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let mut config = Config::default();
        config.tui.tick_rate_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log-level: WARN\ntui:\n  tick-rate-ms: 100").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tui.tick_rate_ms, 100);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let path = PathBuf::from("/nonexistent/modalform.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_load_explicit_invalid_values_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tui:\n  dialog-width-percent: 500").unwrap();
        let path = file.path().to_path_buf();
        assert!(Config::load(Some(&path)).is_err());
    }
}
