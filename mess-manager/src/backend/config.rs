//! # Application Config
//!
//! Settings of one installation, kept in a single YAML file.
//!
//! ## YAML Format
//!
//! ```yaml
//! app_id: "talukdar-meal-system"
//! data_directory: "/home/me/.local/share/mess-manager/talukdar-meal-system"
//! default_pin: "1234"
//! loading_timeout_ms: 5000
//! log_filter: "info"
//! auth_token: null
//! due_dates:
//!   meal: 5
//!   rent: 8
//!   wifi: 15
//!   current: 25
//! ```
//!
//! Missing keys take their defaults, and a missing file is created with the
//! defaults (written atomically through a temp file).

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use shared::DueDates;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::domain::models::DEFAULT_MANAGER_PIN;

const CONFIG_FILE_NAME: &str = "mess_config.yaml";
const APP_DIRECTORY: &str = "mess-manager";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Names the mess; the default data directory is derived from it
    pub app_id: String,
    /// Overrides the default data directory
    pub data_directory: Option<PathBuf>,
    /// Manager PIN used until one is stored
    pub default_pin: String,
    /// Upper bound for sign-in and the first data load
    pub loading_timeout_ms: u64,
    /// Used when RUST_LOG is not set
    pub log_filter: String,
    /// Token for token sign-in; anonymous sign-in when absent
    pub auth_token: Option<String>,
    pub due_dates: DueDates,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: "talukdar-meal-system".to_string(),
            data_directory: None,
            default_pin: DEFAULT_MANAGER_PIN.to_string(),
            loading_timeout_ms: 5000,
            log_filter: "info".to_string(),
            auth_token: None,
            due_dates: DueDates::default(),
        }
    }
}

impl AppConfig {
    /// `{config dir}/mess-manager/mess_config.yaml`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIRECTORY).join(CONFIG_FILE_NAME))
            .ok_or_else(|| anyhow!("Could not determine the config directory"))
    }

    /// Load the config at `path`, writing the defaults there first if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let yaml_content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: AppConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?;
            debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let yaml_content = serde_yaml::to_string(self)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, path)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// The configured data directory, or `{data dir}/mess-manager/{app_id}`
    pub fn resolved_data_directory(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_directory {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIRECTORY).join(&self.app_id))
            .ok_or_else(|| anyhow!("Could not determine the data directory"))
    }

    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(AppConfig::load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "app_id: bachelor-mess\ndue_dates:\n  rent: 10\n").unwrap();

        let config = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(config.app_id, "bachelor-mess");
        assert_eq!(config.default_pin, "1234");
        assert_eq!(config.due_dates.rent, 10);
        assert_eq!(config.due_dates.meal, 5);
        assert_eq!(config.loading_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_data_directory_wins() {
        let config = AppConfig {
            data_directory: Some(PathBuf::from("/srv/mess")),
            ..Default::default()
        };
        assert_eq!(config.resolved_data_directory().unwrap(), PathBuf::from("/srv/mess"));
    }
}
