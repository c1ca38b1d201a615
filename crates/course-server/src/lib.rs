//! HTTP server for course exercises.
//!
//! Serves exercise descriptions as JSON, the files inside each exercise
//! directory and the resources the descriptions reference. Every path taken
//! from a request is joined onto the exercise root through
//! [`course_core::exercise::safe_join`], so nothing outside the configured
//! directories is reachable.

pub mod error;
pub mod handlers;

pub use error::{Result, ServerError};

use axum::routing::get;
use axum::{middleware, Router};
use course_core::CourseConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Configuration for the exercise server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Directory holding `{bucket}/{code}` exercise folders
    pub exercises_root: PathBuf,
    /// Shared resource directory, used after an exercise's own `res/`
    pub global_resources: PathBuf,
    /// Origin for rewritten resource URLs; the Host header is used when unset
    pub public_url: Option<String>,
    /// Enable CORS
    pub enable_cors: bool,
    /// Enable request logging
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            exercises_root: PathBuf::from("bucket"),
            global_resources: PathBuf::from("res"),
            public_url: None,
            enable_cors: true,
            enable_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `exercises` and `server` sections of a course config.
    pub fn from_course_config(config: &CourseConfig) -> Result<Self> {
        let mut server = Self::new()
            .with_bind_addr_str(&config.server.bind_addr)?
            .with_exercises_root(&config.exercises.root)
            .with_global_resources(&config.exercises.global_resources)
            .with_cors(config.server.enable_cors)
            .with_logging(config.server.enable_logging);
        server.public_url = config.server.public_url.clone();
        Ok(server)
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse and set the bind address from a string.
    pub fn with_bind_addr_str(mut self, addr: &str) -> Result<Self> {
        self.bind_addr = addr
            .parse()
            .map_err(|e| ServerError::config_error(format!("Invalid bind address: {}", e)))?;
        Ok(self)
    }

    pub fn with_exercises_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.exercises_root = root.into();
        self
    }

    pub fn with_global_resources(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_resources = dir.into();
        self
    }

    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into());
        self
    }

    /// Enable or disable CORS.
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Enable or disable request logging.
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

pub struct ExerciseServer {
    config: ServerConfig,
}

impl ExerciseServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn build_router(&self) -> Router {
        let state = AppState {
            config: Arc::new(self.config.clone()),
        };

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/exercises", get(handlers::list_exercises))
            .route("/api/exercises/{bucket}/{code}", get(handlers::get_exercise))
            .route(
                "/api/exercises/{bucket}/{code}/res/{*filename}",
                get(handlers::get_exercise_resource),
            )
            .route(
                "/api/exercises/{bucket}/{code}/{filename}",
                get(handlers::get_exercise_file),
            )
            .route("/api/res/{*filename}", get(handlers::get_global_resource))
            .fallback(handlers::not_found)
            .with_state(state);

        if self.config.enable_logging {
            router = router.layer(middleware::from_fn(
                |request: axum::http::Request<axum::body::Body>,
                 next: axum::middleware::Next| async {
                    let request_id = uuid::Uuid::new_v4().to_string();
                    let method = request.method().clone();
                    let uri = request.uri().clone();

                    // Health probes are frequent and uninteresting.
                    let quiet = uri.path() == "/health";
                    if quiet {
                        log::debug!("Request {} {} {}", request_id, method, uri);
                    } else {
                        log::info!("Request {} {} {}", request_id, method, uri);
                    }

                    let start = std::time::Instant::now();
                    let response = next.run(request).await;
                    let duration = start.elapsed();

                    if quiet {
                        log::debug!("Response {} completed in {:?}", request_id, duration);
                    } else {
                        log::info!(
                            "Response {} {} completed in {:?}",
                            request_id,
                            response.status(),
                            duration
                        );
                    }

                    response
                },
            ));
        }

        router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }

    /// Start the server and listen until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| {
                ServerError::config_error(format!(
                    "Failed to bind to {}: {}",
                    self.config.bind_addr, e
                ))
            })?;
        self.serve_on_listener(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on_listener<F>(self, listener: TcpListener, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = listener.local_addr()?;

        log::info!("Exercise server starting on {}", addr);
        log::info!("Exercises root: {}", self.config.exercises_root.display());
        log::info!(
            "Global resources: {}",
            self.config.global_resources.display()
        );
        log::info!("Health check: http://{}/health", addr);
        log::info!("Exercise list: http://{}/api/exercises", addr);
        log::info!("Exercise: http://{}/api/exercises/{{bucket}}/{{code}}", addr);
        log::info!(
            "Exercise resources: http://{}/api/exercises/{{bucket}}/{{code}}/res/{{file}}",
            addr
        );
        log::info!("Global resources: http://{}/api/res/{{file}}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::internal(format!("Server error: {}", e)))?;

        log::info!("Exercise server shut down gracefully");
        Ok(())
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, shutting down...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt; // for `oneshot`

    struct Fixture {
        _root: TempDir,
        config: ServerConfig,
    }

    fn fixture() -> Fixture {
        let root = tempdir().unwrap();
        let exercises = root.path().join("bucket");
        let shared = root.path().join("res");

        let add = exercises.join("default/001");
        fs::create_dir_all(add.join("res/img")).unwrap();
        fs::write(
            add.join("index.md"),
            "# Add\n\n![plot](res/plot.png)\n\n<img src=\"res/logo.png\">",
        )
        .unwrap();
        fs::write(add.join("tests.toml"), "[[test]]\nfunction = \"add\"\n").unwrap();
        fs::write(add.join("solution.py"), "def add(a, b):\n    return a + b\n").unwrap();
        fs::write(add.join("res/plot.png"), b"local plot").unwrap();
        fs::write(add.join("res/img/deep.svg"), b"<svg/>").unwrap();

        fs::create_dir_all(exercises.join("default/002")).unwrap();
        fs::create_dir_all(exercises.join("empty")).unwrap();

        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("plot.png"), b"global plot").unwrap();
        fs::write(shared.join("logo.png"), b"global logo").unwrap();
        fs::write(root.path().join("secret.txt"), b"top secret").unwrap();

        let config = ServerConfig::new()
            .with_exercises_root(exercises)
            .with_global_resources(shared)
            .with_logging(false);
        Fixture {
            _root: root,
            config,
        }
    }

    async fn get(config: &ServerConfig, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let router = ExerciseServer::new(config.clone()).build_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::HOST, "localhost:5000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, content_type, body.to_vec())
    }

    async fn get_json(config: &ServerConfig, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = get(config, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let f = fixture();
        let (status, body) = get_json(&f.config, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "ok", "message": "Exercise API is running"})
        );
    }

    #[tokio::test]
    async fn test_list_exercises_skips_empty_buckets() {
        let f = fixture();
        let (status, body) = get_json(&f.config, "/api/exercises").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"buckets": {"default": ["001"]}}));
    }

    #[tokio::test]
    async fn test_list_exercises_missing_root_is_500() {
        let f = fixture();
        let config = f.config.clone().with_exercises_root("/nonexistent/course/root");
        let (status, body) = get_json(&config, "/api/exercises").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to list exercises: "));
    }

    #[tokio::test]
    async fn test_get_exercise_rewrites_resources() {
        let f = fixture();
        let (status, body) = get_json(&f.config, "/api/exercises/default/001").await;
        assert_eq!(status, StatusCode::OK);

        let base = "http://localhost:5000/api/exercises/default/001/res";
        assert_eq!(body["resource_base_url"], base);
        assert_eq!(
            body["markdown"],
            format!("# Add\n\n![plot]({base}/plot.png)\n\n<img src=\"{base}/logo.png\">")
        );
        assert_eq!(body["has_tests"], true);
        assert_eq!(body["has_solution"], true);
        assert_eq!(body["has_local_resources"], true);
        assert_eq!(
            body["files"],
            json!(["index.md", "solution.py", "tests.toml"])
        );
    }

    #[tokio::test]
    async fn test_public_url_overrides_host() {
        let f = fixture();
        let config = f.config.clone().with_public_url("https://course.example.org/");
        let (_, body) = get_json(&config, "/api/exercises/default/001").await;
        assert_eq!(
            body["resource_base_url"],
            "https://course.example.org/api/exercises/default/001/res"
        );
    }

    #[tokio::test]
    async fn test_exercise_not_found_bodies() {
        let f = fixture();

        let (status, body) = get_json(&f.config, "/api/exercises/default/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Exercise not found", "bucket": "default", "exercise_code": "999"})
        );

        let (status, body) = get_json(&f.config, "/api/exercises/default/002").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Exercise index.md not found");
        assert_eq!(body["exercise_code"], "002");
    }

    #[tokio::test]
    async fn test_traversal_is_not_found() {
        let f = fixture();

        let (status, body) = get_json(&f.config, "/api/exercises/..%2F..%2F/secret.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Exercise not found");

        let (status, _, body) =
            get(&f.config, "/api/exercises/default/001/..%2F..%2F..%2Fsecret.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!String::from_utf8_lossy(&body).contains("top secret"));

        let (status, _, _) = get(&f.config, "/api/res/..%2Fsecret.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_exercise_file_served_with_mime() {
        let f = fixture();
        let (status, content_type, body) =
            get(&f.config, "/api/exercises/default/001/solution.py").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/x-python; charset=utf-8"));
        assert_eq!(body, b"def add(a, b):\n    return a + b\n");

        let (status, body) =
            get_json(&f.config, "/api/exercises/default/001/missing.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Resource not found");
    }

    #[tokio::test]
    async fn test_local_resource_preferred_over_global() {
        let f = fixture();

        let (status, content_type, body) =
            get(&f.config, "/api/exercises/default/001/res/plot.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(body, b"local plot");

        let (status, _, body) = get(&f.config, "/api/exercises/default/001/res/logo.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"global logo");

        let (status, _, body) =
            get(&f.config, "/api/exercises/default/001/res/img/deep.svg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<svg/>");

        let (status, _, _) = get(&f.config, "/api/exercises/default/001/res/none.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_global_resource() {
        let f = fixture();
        let (status, _, body) = get(&f.config, "/api/res/plot.png").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"global plot");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let f = fixture();
        let (status, body) = get_json(&f.config, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Resource not found");
        assert!(body["message"].as_str().unwrap().contains("/nope"));
    }

    #[test]
    fn test_config_from_course_config() {
        let mut course = CourseConfig::default();
        course.server.bind_addr = "0.0.0.0:8080".to_string();
        course.server.public_url = Some("http://example.org".to_string());
        course.server.enable_cors = false;

        let config = ServerConfig::from_course_config(&course).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.public_url.as_deref(), Some("http://example.org"));
        assert!(!config.enable_cors);

        course.server.bind_addr = "not an address".to_string();
        assert!(matches!(
            ServerConfig::from_course_config(&course),
            Err(ServerError::Config(_))
        ));
    }
}
