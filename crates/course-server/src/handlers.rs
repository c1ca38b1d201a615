//! Route handlers for the exercise server.

use crate::error::{Result, ServerError};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Uri};
use axum::response::{IntoResponse, Json, Response};
use course_core::errors::ResolveError;
use course_core::exercise::{
    list_exercises as scan_exercises, mime_from_extension, resolve_address, safe_join,
    ExerciseAddress, ExerciseDocument, ResourceLocator, RESOURCES_DIR,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Exercise API is running",
    })
}

pub async fn list_exercises(State(state): State<AppState>) -> Result<Json<Value>> {
    let root = state.config.exercises_root.clone();
    let buckets = scan_exercises(&root).map_err(|e| ServerError::ListFailed(e.to_string()))?;
    log::debug!("Listed {} bucket(s) under {}", buckets.len(), root.display());
    Ok(Json(json!({ "buckets": buckets })))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((bucket, code)): Path<(String, String)>,
) -> Result<Json<ExerciseDocument>> {
    let address = ExerciseAddress::new(bucket.as_str(), code.as_str())
        .map_err(|_| ServerError::exercise_not_found(&bucket, &code))?;

    let bundle = resolve_address(address, &state.config.exercises_root).map_err(|e| match e {
        ResolveError::IndexMissing(_) => ServerError::IndexNotFound {
            bucket: bucket.clone(),
            exercise_code: code.clone(),
        },
        ResolveError::ReadError { message, .. } => ServerError::ReadFailed(message),
        _ => ServerError::exercise_not_found(&bucket, &code),
    })?;

    let resource_base_url = format!(
        "{}/api/exercises/{}/{}/res",
        request_origin(&state, &headers),
        bucket,
        code
    );
    let document = ExerciseDocument::from_bundle(&bundle, resource_base_url)
        .map_err(|e| ServerError::ReadFailed(e.to_string()))?;

    log::info!(
        "Served exercise {}/{} ({} file(s))",
        bucket,
        code,
        document.files.len()
    );
    Ok(Json(document))
}

/// A file sitting directly in an exercise directory.
pub async fn get_exercise_file(
    State(state): State<AppState>,
    Path((bucket, code, filename)): Path<(String, String, String)>,
) -> Result<Response> {
    let directory = exercise_dir(&state, &bucket, &code)?;
    let path = safe_join(&directory, &[filename.as_str()])
        .map_err(|_| ServerError::not_found(format!("File not found: {}", filename)))?;
    serve_file(path, &filename).await
}

/// A resource referenced by an exercise: its own `res/` first, then the
/// shared directory.
pub async fn get_exercise_resource(
    State(state): State<AppState>,
    Path((bucket, code, filename)): Path<(String, String, String)>,
) -> Result<Response> {
    let local = exercise_dir(&state, &bucket, &code)
        .ok()
        .map(|dir| dir.join(RESOURCES_DIR))
        .filter(|dir| dir.is_dir());
    let locator = ResourceLocator::new(local, Some(state.config.global_resources.clone()));

    match locator.locate(&filename) {
        Some(path) => serve_file(path, &filename).await,
        None => Err(ServerError::not_found(format!(
            "Resource not found: {}",
            filename
        ))),
    }
}

pub async fn get_global_resource(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let locator = ResourceLocator::new(None, Some(state.config.global_resources.clone()));
    match locator.locate(&filename) {
        Some(path) => serve_file(path, &filename).await,
        None => Err(ServerError::not_found(format!(
            "Resource not found: {}",
            filename
        ))),
    }
}

pub async fn not_found(uri: Uri) -> ServerError {
    ServerError::not_found(format!("No route for {}", uri.path()))
}

fn exercise_dir(state: &AppState, bucket: &str, code: &str) -> Result<PathBuf> {
    ExerciseAddress::new(bucket, code).map_err(|_| ServerError::exercise_not_found(bucket, code))?;
    let directory = safe_join(&state.config.exercises_root, &[bucket, code])
        .map_err(|_| ServerError::exercise_not_found(bucket, code))?;
    if !directory.is_dir() {
        return Err(ServerError::exercise_not_found(bucket, code));
    }
    Ok(directory)
}

async fn serve_file(path: PathBuf, requested: &str) -> Result<Response> {
    if !path.is_file() {
        return Err(ServerError::not_found(format!("File not found: {}", requested)));
    }
    let bytes = tokio::fs::read(&path).await?;
    log::debug!("Serving {} ({} bytes)", path.display(), bytes.len());
    Ok(([(header::CONTENT_TYPE, mime_from_extension(&path))], bytes).into_response())
}

/// Origin used for rewritten resource URLs.
fn request_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(public_url) = &state.config.public_url {
        return public_url.trim_end_matches('/').to_string();
    }
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}", host),
        None => format!("http://{}", state.config.bind_addr),
    }
}
