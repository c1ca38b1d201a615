//! Configuration loader for YAML files and environment resolution

use crate::config::types::*;
use crate::errors::CourseError;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CONFIG_FILE_NAME: &str = "course.yaml";

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<CourseConfig, CourseError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            CourseError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content, path.parent())
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str, base_dir: Option<&Path>) -> Result<CourseConfig, CourseError> {
        let mut config: CourseConfig = if content.trim().is_empty() {
            CourseConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| {
                CourseError::Config(format!("Failed to parse YAML config: {}", e))
            })?
        };

        Self::resolve_environment(&mut config);

        if let Some(base_dir) = base_dir {
            Self::resolve_paths(&mut config, base_dir);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load from an explicit path, or from the first conventional location
    /// that exists, or fall back to defaults.
    pub async fn load_or_default(explicit: Option<&Path>) -> Result<CourseConfig, CourseError> {
        if let Some(path) = explicit {
            log::info!("Loading configuration from file: {}", path.display());
            return Self::from_file(path).await;
        }

        for candidate in Self::default_locations() {
            if candidate.is_file() {
                log::info!("Loading configuration from file: {}", candidate.display());
                return Self::from_file(&candidate).await;
            }
        }

        log::debug!("No configuration file found, using defaults");
        let mut config = CourseConfig::default();
        Self::resolve_environment(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("course").join(CONFIG_FILE_NAME));
        }
        locations
    }

    /// Apply `COURSE_*` environment overrides
    fn resolve_environment(config: &mut CourseConfig) {
        if let Ok(root) = env::var("COURSE_EXERCISES_ROOT") {
            config.exercises.root = PathBuf::from(root);
        }
        if let Ok(res) = env::var("COURSE_GLOBAL_RESOURCES") {
            config.exercises.global_resources = PathBuf::from(res);
        }
        if let Ok(python) = env::var("COURSE_PYTHON") {
            config.runner.python = python;
        }
        if let Ok(api_url) = env::var("COURSE_API_URL") {
            config.loader.api_url = Some(api_url);
        }

        if let Some(env_var) = &config.loader.api_key_env {
            if let Ok(api_key) = env::var(env_var) {
                config.loader.api_key = Some(api_key);
            }
        }
        if config.loader.api_key.is_none() {
            if let Ok(api_key) = env::var("COURSE_API_KEY") {
                config.loader.api_key = Some(api_key);
            }
        }
    }

    fn resolve_paths(config: &mut CourseConfig, base_dir: &Path) {
        if config.exercises.root.is_relative() {
            config.exercises.root = base_dir.join(&config.exercises.root);
        }
        if config.exercises.global_resources.is_relative() {
            config.exercises.global_resources = base_dir.join(&config.exercises.global_resources);
        }
    }
}
