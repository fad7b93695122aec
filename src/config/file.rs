//! Configuration file loading
//!
//! Handles loading and saving configuration as TOML files.

use crate::config::Config;
use crate::error::{ConfigError, Result};

use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(config).map_err(ConfigError::from)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        Ok(())
    }

    /// Load configuration from default locations
    pub fn load_default() -> Option<Config> {
        Self::find_default().map(|(_, config)| config)
    }

    /// First default location holding a loadable file, with its config
    pub fn find_default() -> Option<(PathBuf, Config)> {
        for path in Self::default_paths() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        return Some((path, config));
                    }
                    Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
                }
            }
        }
        None
    }

    /// Per-user configuration file
    pub fn user_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("sensorwatch").join("config.toml")
        } else {
            PathBuf::from("sensorwatch.toml")
        }
    }

    /// Get default configuration file paths in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // System-wide config
        paths.push(PathBuf::from("/etc/sensorwatch/config.toml"));

        // User config
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config/sensorwatch/config.toml"));
        }
        let user = Self::user_path();
        if !paths.contains(&user) {
            paths.push(user);
        }

        // Current directory
        paths.push(PathBuf::from("sensorwatch.toml"));
        paths.push(PathBuf::from(".sensorwatch.toml"));

        paths.dedup();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DriveMode, StreamKind};

    #[test]
    fn test_default_paths_not_empty() {
        let paths = ConfigFile::default_paths();
        assert!(!paths.is_empty());
        assert_eq!(paths[0], PathBuf::from("/etc/sensorwatch/config.toml"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sampling\nperiod_millis = ").unwrap();

        assert!(matches!(
            ConfigFile::load(&path),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sampling.stream = StreamKind::Gps;
        config.sampling.mode = DriveMode::PerEvent;
        config.sampling.period_millis = 250;
        config.thresholds.insert("latitude".to_string(), 0.001);

        ConfigFile::save(&config, &path).unwrap();
        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded, config);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("stream = \"gps\""));
        assert!(text.contains("mode = \"per_event\""));
    }
}
