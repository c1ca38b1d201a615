//! Turns an exercise identifier into a loaded bundle on disk.

use super::address::ExerciseAddress;
use super::paths::safe_join;
use super::{ExerciseBundle, INDEX_FILE, RESOURCES_DIR, SOLUTION_FILE, TESTS_FILE};
use crate::errors::ResolveError;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Parse `raw` and load the bundle it names under `root`.
pub fn resolve(raw: &str, root: &Path) -> Result<ExerciseBundle, ResolveError> {
    let address = ExerciseAddress::parse(raw)?;
    resolve_address(address, root)
}

/// Load the bundle for an already validated address.
pub fn resolve_address(address: ExerciseAddress, root: &Path) -> Result<ExerciseBundle, ResolveError> {
    let directory = safe_join(root, &[address.bucket(), address.code()])?;

    if !directory.is_dir() {
        return Err(ResolveError::DirectoryNotFound(directory));
    }

    let index = directory.join(INDEX_FILE);
    if !index.is_file() {
        return Err(ResolveError::IndexMissing(index));
    }

    let markdown = fs::read_to_string(&index).map_err(|e| ResolveError::ReadError {
        path: index.clone(),
        message: e.to_string(),
    })?;

    let has_tests = directory.join(TESTS_FILE).is_file();
    let has_solution = directory.join(SOLUTION_FILE).is_file();
    let has_local_resources = directory.join(RESOURCES_DIR).is_dir();

    log::debug!(
        "Resolved {} to {} (tests: {}, solution: {}, res: {})",
        address,
        directory.display(),
        has_tests,
        has_solution,
        has_local_resources
    );

    Ok(ExerciseBundle {
        address,
        directory,
        markdown,
        has_tests,
        has_solution,
        has_local_resources,
    })
}

/// Every bucket under `root` mapped to the sorted codes that hold an
/// `index.md`. Buckets without a single exercise are left out, as are
/// entries whose names are not valid identifiers.
pub fn list_exercises(root: &Path) -> io::Result<BTreeMap<String, Vec<String>>> {
    let mut buckets = BTreeMap::new();

    for bucket_entry in fs::read_dir(root)? {
        let bucket_entry = bucket_entry?;
        if !bucket_entry.file_type()?.is_dir() {
            continue;
        }
        let Some(bucket) = bucket_entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        let mut codes = Vec::new();
        for code_entry in fs::read_dir(bucket_entry.path())? {
            let code_entry = code_entry?;
            let Some(code) = code_entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if ExerciseAddress::new(bucket.as_str(), code.as_str()).is_err() {
                continue;
            }
            if code_entry.path().join(INDEX_FILE).is_file() {
                codes.push(code);
            }
        }

        if !codes.is_empty() {
            codes.sort();
            buckets.insert(bucket, codes);
        }
    }

    Ok(buckets)
}
