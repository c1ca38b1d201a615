//! Configuration type definitions
//!
//! Every section is optional in the YAML file; a missing section takes its
//! defaults, so an empty file (or no file at all) yields a working setup that
//! reads exercises from `./bucket` and runs tests with `python3`.

use crate::errors::CourseError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CourseConfig {
    #[serde(default)]
    pub exercises: ExercisesConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub server: ServerSection,
}

/// Where exercise bundles and shared resources live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisesConfig {
    #[serde(default = "default_exercises_root")]
    pub root: PathBuf,
    #[serde(default = "default_global_resources")]
    pub global_resources: PathBuf,
}

impl Default for ExercisesConfig {
    fn default() -> Self {
        Self {
            root: default_exercises_root(),
            global_resources: default_global_resources(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    #[default]
    Filesystem,
    Api,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoaderConfig {
    #[serde(default)]
    pub kind: LoaderKind,
    /// Base URL of the exercise API, e.g. `http://localhost:5000/api`
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of an environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_python")]
    pub python: String,
    /// Per-call time limit in seconds; 0 disables the limit
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            call_timeout_secs: default_call_timeout_secs(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Origin used in rewritten resource URLs instead of the request's Host header
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default = "default_true")]
    pub enable_cors: bool,
    #[serde(default = "default_true")]
    pub enable_logging: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_url: None,
            enable_cors: true,
            enable_logging: true,
        }
    }
}

fn default_exercises_root() -> PathBuf {
    PathBuf::from("bucket")
}

fn default_global_resources() -> PathBuf {
    PathBuf::from("res")
}

fn default_python() -> String {
    if cfg!(windows) {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

fn default_call_timeout_secs() -> u64 {
    10
}

fn default_color() -> bool {
    true
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_true() -> bool {
    true
}

impl CourseConfig {
    pub fn validate(&self) -> Result<(), CourseError> {
        if self.loader.kind == LoaderKind::Api {
            match &self.loader.api_url {
                Some(url) if !url.trim().is_empty() => {
                    url::Url::parse(url).map_err(|e| {
                        CourseError::Config(format!("Invalid loader.api_url '{}': {}", url, e))
                    })?;
                }
                _ => {
                    return Err(CourseError::Config(
                        "loader.kind is 'api' but loader.api_url is not set".to_string(),
                    ))
                }
            }
        }

        if self.runner.python.trim().is_empty() {
            return Err(CourseError::Config(
                "runner.python must name an interpreter".to_string(),
            ));
        }

        self.server.bind_addr.parse::<SocketAddr>().map_err(|e| {
            CourseError::Config(format!(
                "Invalid server.bind_addr '{}': {}",
                self.server.bind_addr, e
            ))
        })?;

        Ok(())
    }

    /// The per-call limit as a duration, `None` when disabled.
    pub fn call_timeout(&self) -> Option<std::time::Duration> {
        match self.runner.call_timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}
