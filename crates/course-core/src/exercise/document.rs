//! The JSON shape of an exercise as served over HTTP.

use super::resources::rewrite_resource_links;
use super::ExerciseBundle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Body of `GET /api/exercises/{bucket}/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDocument {
    pub markdown: String,
    pub has_tests: bool,
    pub has_solution: bool,
    pub has_local_resources: bool,
    pub resource_base_url: String,
    #[serde(default)]
    pub files: Vec<String>,
}

impl ExerciseDocument {
    /// Build the document for `bundle`, rewriting its `res/` links against
    /// `resource_base_url`.
    pub fn from_bundle(bundle: &ExerciseBundle, resource_base_url: String) -> io::Result<Self> {
        Ok(Self {
            markdown: rewrite_resource_links(&bundle.markdown, &resource_base_url),
            has_tests: bundle.has_tests,
            has_solution: bundle.has_solution,
            has_local_resources: bundle.has_local_resources,
            files: list_files(&bundle.directory)?,
            resource_base_url,
        })
    }
}

/// Sorted names of the regular files directly inside `dir`.
pub fn list_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::resolve;
    use tempfile::tempdir;

    #[test]
    fn test_document_from_bundle() {
        let root = tempdir().unwrap();
        let ex = root.path().join("default/001");
        fs::create_dir_all(ex.join("res")).unwrap();
        fs::write(ex.join("index.md"), "![plot](res/plot.png)").unwrap();
        fs::write(ex.join("tests.toml"), "").unwrap();
        fs::write(ex.join("solution.py"), "").unwrap();

        let bundle = resolve("001", root.path()).unwrap();
        let doc =
            ExerciseDocument::from_bundle(&bundle, "http://h/api/exercises/default/001/res".into())
                .unwrap();

        assert_eq!(
            doc.markdown,
            "![plot](http://h/api/exercises/default/001/res/plot.png)"
        );
        assert!(doc.has_tests && doc.has_solution && doc.has_local_resources);
        assert_eq!(doc.files, vec!["index.md", "solution.py", "tests.toml"]);
    }

    #[test]
    fn test_missing_files_field_defaults_to_empty() {
        let json = r##"{
            "markdown": "# Hi",
            "has_tests": false,
            "has_solution": true,
            "has_local_resources": false,
            "resource_base_url": "http://h/res"
        }"##;
        let doc: ExerciseDocument = serde_json::from_str(json).unwrap();
        assert!(doc.files.is_empty());
        assert!(doc.has_solution);
    }
}
