//! `tests.toml` parsing.
//!
//! ```toml
//! [[test]]
//! function = "add"
//! args = [2, 3]
//! returns = 5
//! description = "Adds two numbers"
//! ```

use super::literal::{format_args, Literal};
use crate::errors::LoadError;
use serde::Deserialize;
use std::io;
use std::path::Path;

/// One declared function test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub function: String,
    pub args: Vec<Literal>,
    /// Expected return value; `None` when the file does not say.
    pub returns: Literal,
    pub description: Option<String>,
}

impl TestCase {
    /// The call as shown in reports, e.g. `add(2, 3)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.function, format_args(&self.args))
    }
}

#[derive(Debug, Deserialize)]
struct TestFile {
    #[serde(default)]
    test: Vec<RawTestCase>,
}

#[derive(Debug, Deserialize)]
struct RawTestCase {
    function: String,
    #[serde(default)]
    args: Vec<toml::Value>,
    #[serde(default)]
    returns: Option<toml::Value>,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawTestCase> for TestCase {
    fn from(raw: RawTestCase) -> Self {
        Self {
            function: raw.function,
            args: raw.args.into_iter().map(Literal::from).collect(),
            returns: raw.returns.map(Literal::from).unwrap_or_default(),
            description: raw.description.filter(|d| !d.is_empty()),
        }
    }
}

/// Parse test cases from TOML text, keeping declaration order.
pub fn parse_test_cases(content: &str) -> Result<Vec<TestCase>, LoadError> {
    let file: TestFile =
        toml::from_str(content).map_err(|e| LoadError::TestParseError(e.message().to_string()))?;
    Ok(file.test.into_iter().map(TestCase::from).collect())
}

/// Read and parse a test file.
pub async fn load_test_cases(path: &Path) -> Result<Vec<TestCase>, LoadError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::TestFileNotFound(path.to_path_buf()),
        _ => LoadError::TestParseError(e.to_string()),
    })?;
    parse_test_cases(&content)
}
