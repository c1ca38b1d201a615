//! Parsing of the `bucket/code` identifiers students type into the toolbar.

use crate::errors::ResolveError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BUCKET: &str = "default";

const FORBIDDEN_SEQUENCES: [&str; 3] = ["\\", "..", "\0"];

/// A validated `(bucket, code)` pair.
///
/// Both segments are restricted to ASCII letters, digits, `_`, `-` and `.`,
/// and neither may be `.` or `..`. This keeps identifiers boring, but it is
/// not what keeps lookups inside the exercise root: that is
/// [`safe_join`](super::paths::safe_join).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExerciseAddress {
    bucket: String,
    code: String,
}

impl ExerciseAddress {
    /// Build an address from already separated segments.
    pub fn new(bucket: impl Into<String>, code: impl Into<String>) -> Result<Self, ResolveError> {
        let bucket = bucket.into();
        let code = code.into();
        validate_segment(&bucket)?;
        validate_segment(&code)?;
        Ok(Self { bucket, code })
    }

    /// Parse raw user input of the form `bucket/code` or bare `code`.
    ///
    /// Checks run in a fixed order and stop at the first failure; none of
    /// them touches the filesystem.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ResolveError::EmptyInput);
        }

        if input.matches('/').count() > 1 {
            return Err(ResolveError::TooManySeparators);
        }

        if FORBIDDEN_SEQUENCES.iter().any(|seq| input.contains(seq)) {
            return Err(ResolveError::ForbiddenCharacter);
        }

        let (bucket, code) = match input.split_once('/') {
            Some((bucket, code)) => {
                let (bucket, code) = (bucket.trim(), code.trim());
                if bucket.is_empty() || code.is_empty() {
                    return Err(ResolveError::MissingComponent);
                }
                (bucket, code)
            }
            None => (DEFAULT_BUCKET, input),
        };

        Self::new(bucket, code)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ExerciseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.code)
    }
}

impl FromStr for ExerciseAddress {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_segment(segment: &str) -> Result<(), ResolveError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');

    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || !segment.chars().all(allowed)
    {
        return Err(ResolveError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}
