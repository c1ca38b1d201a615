//! Error types for exercise resolution, test loading and the surrounding plumbing.
//!
//! Resolution and load failures carry the offending identifier or path so the
//! message can be shown to the student as-is. Failures of a single test call are
//! not errors at all: they are recorded as outcomes by the runner.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning a typed exercise identifier into a loaded bundle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No input provided")]
    EmptyInput,
    #[error("Only one '/' allowed (format: bucket/code)")]
    TooManySeparators,
    #[error("Invalid characters in input")]
    ForbiddenCharacter,
    #[error("Both bucket and code must be provided")]
    MissingComponent,
    #[error("Invalid exercise identifier segment '{0}' (allowed: letters, digits, '_', '-', '.')")]
    InvalidSegment(String),
    #[error("Path escapes the exercise root: {}", .0.display())]
    PathEscape(PathBuf),
    #[error("Exercise directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Exercise index.md not found: {}", .0.display())]
    IndexMissing(PathBuf),
    #[error("Failed to read {}: {message}", path.display())]
    ReadError { path: PathBuf, message: String },
}

/// Failures that abort a test run before any test executes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Code file not found: {}", .0.display())]
    CodeNotFound(PathBuf),
    #[error("Syntax Error: {0}")]
    CodeSyntaxError(String),
    #[error("Error loading code: {0}")]
    CodeLoadError(String),
    #[error("Test file not found: {}", .0.display())]
    TestFileNotFound(PathBuf),
    #[error("Error parsing TOML: {0}")]
    TestParseError(String),
}

#[derive(Error, Debug)]
pub enum CourseError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Remote exercise source failed: {0}")]
    Remote(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Workbench actions that cannot proceed in the current session state.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No exercise loaded")]
    NoExercise,
    #[error("Tests are not available for this exercise")]
    TestsUnavailable,
    #[error("Solution is not available for this exercise")]
    SolutionUnavailable,
    #[error("Solution file not found: {}", .0.display())]
    SolutionMissing(PathBuf),
    #[error("Please save your current file first.")]
    UnsavedFile,
    #[error(transparent)]
    Course(#[from] CourseError),
}

impl From<reqwest::Error> for CourseError {
    fn from(err: reqwest::Error) -> Self {
        CourseError::Remote(err.to_string())
    }
}

impl CourseError {
    /// True when the failure means "this exercise or file is not there", as
    /// opposed to malformed input or a broken source.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CourseError::Resolve(ResolveError::DirectoryNotFound(_))
                | CourseError::Resolve(ResolveError::IndexMissing(_))
                | CourseError::Load(LoadError::CodeNotFound(_))
                | CourseError::Load(LoadError::TestFileNotFound(_))
        )
    }
}
