//! Configuration module
//!
//! Provides the typed `course.yaml` configuration, constructed once at startup
//! and threaded through to the loader, runner and server.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests;

use crate::errors::CourseError;
use std::path::Path;

/// Load a configuration from a YAML file
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<CourseConfig, CourseError> {
    ConfigLoader::from_file(path).await
}
