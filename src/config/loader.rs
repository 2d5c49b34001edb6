//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings from a YAML configuration directory.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── engine.yaml   # timezone offset, overtime multiplier, leave defaults
/// ```
///
/// # Example
///
/// ```no_run
/// use roster_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// assert_eq!(loader.config().offset_minutes, 600);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `engine.yaml` is missing, contains invalid YAML,
    /// or fails validation (e.g. an inverted half-day window).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let settings_path = path.as_ref().join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&settings_path)?;
        let config = EngineConfig::from_settings(settings)?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the validated engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
