//! Exercise sources.
//!
//! The workbench does not care where an exercise comes from: a directory
//! tree on this machine, or an exercise server reached over HTTP. Both sit
//! behind [`ExerciseLoader`].

use super::address::ExerciseAddress;
use super::document::ExerciseDocument;
use super::resolver::{list_exercises, resolve};
use super::{ExerciseBundle, SOLUTION_FILE, TESTS_FILE};
use crate::config::{ExercisesConfig, LoaderConfig, LoaderKind};
use crate::errors::{CourseError, ResolveError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// What a loader hands back for display and checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedExercise {
    pub address: ExerciseAddress,
    pub markdown: String,
    /// Local directory of the exercise; `None` for remote exercises.
    pub directory: Option<PathBuf>,
    pub has_tests: bool,
    pub has_solution: bool,
    pub has_local_resources: bool,
    /// Where `res/` links already point, when the source rewrote them.
    pub resource_base_url: Option<String>,
    /// Shared resource directory used as a fallback for `res/` links.
    pub global_resources: Option<PathBuf>,
}

impl LoadedExercise {
    pub fn from_bundle(bundle: ExerciseBundle, global_resources: Option<PathBuf>) -> Self {
        Self {
            address: bundle.address,
            markdown: bundle.markdown,
            directory: Some(bundle.directory),
            has_tests: bundle.has_tests,
            has_solution: bundle.has_solution,
            has_local_resources: bundle.has_local_resources,
            resource_base_url: None,
            global_resources,
        }
    }

    pub fn is_local(&self) -> bool {
        self.directory.is_some()
    }

    /// The test suite, if this is a local exercise that has one.
    pub fn tests_path(&self) -> Option<PathBuf> {
        match &self.directory {
            Some(dir) if self.has_tests => Some(dir.join(TESTS_FILE)),
            _ => None,
        }
    }

    /// The reference solution, if this is a local exercise that has one.
    pub fn solution_path(&self) -> Option<PathBuf> {
        match &self.directory {
            Some(dir) if self.has_solution => Some(dir.join(SOLUTION_FILE)),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ExerciseLoader: Send + Sync {
    /// Load the exercise named by raw user input (`bucket/code` or `code`).
    async fn load(&self, raw: &str) -> Result<LoadedExercise, CourseError>;

    /// Every bucket mapped to its sorted exercise codes.
    async fn list(&self) -> Result<BTreeMap<String, Vec<String>>, CourseError>;

    fn name(&self) -> &str;
}

/// Loads exercises from `{root}/{bucket}/{code}`.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    root: PathBuf,
    global_resources: Option<PathBuf>,
}

impl FileSystemLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_resources: None,
        }
    }

    pub fn with_global_resources(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_resources = Some(dir.into());
        self
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ExerciseLoader for FileSystemLoader {
    async fn load(&self, raw: &str) -> Result<LoadedExercise, CourseError> {
        let bundle = resolve(raw, &self.root)?;
        Ok(LoadedExercise::from_bundle(
            bundle,
            self.global_resources.clone(),
        ))
    }

    async fn list(&self) -> Result<BTreeMap<String, Vec<String>>, CourseError> {
        Ok(list_exercises(&self.root)?)
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}

/// Loads exercises from a running exercise server.
#[derive(Debug, Clone)]
pub struct ApiLoader {
    api_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl ApiLoader {
    /// `api_url` is the server's API root, e.g. `http://localhost:5000/api`.
    pub fn new(api_url: impl Into<String>) -> Result<Self, CourseError> {
        let api_url = api_url.into();
        url::Url::parse(&api_url)
            .map_err(|e| CourseError::Config(format!("Invalid API url '{}': {}", api_url, e)))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: None,
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .timeout(self.timeout);
        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }

    fn exercise_url(&self, address: &ExerciseAddress) -> String {
        format!(
            "{}/exercises/{}/{}",
            self.api_url,
            address.bucket(),
            address.code()
        )
    }
}

#[async_trait]
impl ExerciseLoader for ApiLoader {
    async fn load(&self, raw: &str) -> Result<LoadedExercise, CourseError> {
        let address = ExerciseAddress::parse(raw)?;
        let url = self.exercise_url(&address);
        log::debug!("Fetching exercise {} from {}", address, url);

        let response = self.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolveError::DirectoryNotFound(PathBuf::from(format!(
                "{}/{}",
                address.bucket(),
                address.code()
            )))
            .into());
        }
        if !status.is_success() {
            return Err(CourseError::Remote(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        let document: ExerciseDocument = response.json().await?;

        Ok(LoadedExercise {
            address,
            markdown: document.markdown,
            directory: None,
            has_tests: document.has_tests,
            has_solution: document.has_solution,
            has_local_resources: document.has_local_resources,
            resource_base_url: Some(document.resource_base_url),
            global_resources: None,
        })
    }

    async fn list(&self) -> Result<BTreeMap<String, Vec<String>>, CourseError> {
        #[derive(Deserialize)]
        struct Listing {
            buckets: BTreeMap<String, Vec<String>>,
        }

        let url = format!("{}/exercises", self.api_url);
        let response = self.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CourseError::Remote(format!(
                "GET {} returned {}",
                url, status
            )));
        }
        let listing: Listing = response.json().await?;
        Ok(listing.buckets)
    }

    fn name(&self) -> &str {
        "api"
    }
}

/// Build the loader selected by configuration.
pub fn create_loader(
    loader: &LoaderConfig,
    exercises: &ExercisesConfig,
) -> Result<Box<dyn ExerciseLoader>, CourseError> {
    match loader.kind {
        LoaderKind::Filesystem => Ok(Box::new(
            FileSystemLoader::new(&exercises.root)
                .with_global_resources(&exercises.global_resources),
        )),
        LoaderKind::Api => {
            let api_url = loader.api_url.as_deref().ok_or_else(|| {
                CourseError::Config("loader.api_url is required for the api loader".to_string())
            })?;
            Ok(Box::new(
                ApiLoader::new(api_url)?.with_api_key(loader.api_key.clone()),
            ))
        }
    }
}
