//! Exercise bundles: addressing, resolution on disk, remote loading and
//! resource links.

pub mod address;
pub mod document;
pub mod loader;
pub mod paths;
pub mod resolver;
pub mod resources;

pub use address::{ExerciseAddress, DEFAULT_BUCKET};
pub use document::{list_files, ExerciseDocument};
pub use loader::{create_loader, ApiLoader, ExerciseLoader, FileSystemLoader, LoadedExercise};
pub use paths::safe_join;
pub use resolver::{list_exercises, resolve, resolve_address};
pub use resources::{
    mime_from_extension, rewrite_resource_links, rewrite_resource_links_with, ResourceLocator,
};

use std::path::PathBuf;

pub const INDEX_FILE: &str = "index.md";
pub const TESTS_FILE: &str = "tests.toml";
pub const SOLUTION_FILE: &str = "solution.py";
pub const RESOURCES_DIR: &str = "res";

/// An exercise directory as found on disk, with its description read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseBundle {
    pub address: ExerciseAddress,
    pub directory: PathBuf,
    pub markdown: String,
    pub has_tests: bool,
    pub has_solution: bool,
    pub has_local_resources: bool,
}

impl ExerciseBundle {
    pub fn tests_path(&self) -> PathBuf {
        self.directory.join(TESTS_FILE)
    }

    pub fn solution_path(&self) -> PathBuf {
        self.directory.join(SOLUTION_FILE)
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.directory.join(RESOURCES_DIR)
    }
}
