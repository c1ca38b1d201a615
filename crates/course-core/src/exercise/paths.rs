//! Contained path joins.

use crate::errors::ResolveError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Join `parts` onto `base` without ever leaving `base`.
///
/// Each part may span several components (`"img/plot.png"`), but every
/// component must be a plain name: absolute paths, drive prefixes, `.` and
/// `..` are rejected before anything is joined. The joined path is then
/// checked against the filesystem: the deepest existing ancestor of the
/// result must canonicalize to a descendant of the canonical `base`, which
/// catches symlinks pointing outside the tree.
pub fn safe_join<P: AsRef<Path>>(base: &Path, parts: &[P]) -> Result<PathBuf, ResolveError> {
    let mut joined = base.to_path_buf();

    for part in parts {
        let part = part.as_ref();
        if part.as_os_str().is_empty() {
            return Err(ResolveError::PathEscape(joined));
        }
        for component in part.components() {
            match component {
                Component::Normal(name) => joined.push(name),
                _ => return Err(ResolveError::PathEscape(base.join(part))),
            }
        }
    }

    // Nothing below a missing base can exist, so there is nothing to escape to.
    let canonical_base = match fs::canonicalize(base) {
        Ok(path) => path,
        Err(_) => return Ok(joined),
    };

    let mut probe = joined.as_path();
    while !probe.exists() {
        match probe.parent() {
            Some(parent) => probe = parent,
            None => return Ok(joined),
        }
    }

    match fs::canonicalize(probe) {
        Ok(canonical) if canonical.starts_with(&canonical_base) => Ok(joined),
        _ => Err(ResolveError::PathEscape(joined)),
    }
}
