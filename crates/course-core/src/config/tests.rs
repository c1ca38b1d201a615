//! Configuration loading tests

use super::*;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
#[serial]
fn test_empty_config_uses_defaults() {
    let config = ConfigLoader::from_str("", None).unwrap();

    assert_eq!(config.exercises.root, PathBuf::from("bucket"));
    assert_eq!(config.exercises.global_resources, PathBuf::from("res"));
    assert_eq!(config.loader.kind, LoaderKind::Filesystem);
    assert_eq!(config.runner.call_timeout_secs, 10);
    assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
    assert!(config.server.enable_cors);
}

#[test]
#[serial]
fn test_partial_sections_keep_defaults() {
    let yaml = r#"
runner:
  python: /usr/bin/python3.12
server:
  public_url: "https://exercises.example.com"
"#;
    let config = ConfigLoader::from_str(yaml, None).unwrap();

    assert_eq!(config.runner.python, "/usr/bin/python3.12");
    assert_eq!(config.runner.call_timeout_secs, 10);
    assert_eq!(
        config.server.public_url.as_deref(),
        Some("https://exercises.example.com")
    );
    assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
}

#[test]
#[serial]
fn test_api_loader_requires_url() {
    let yaml = "loader:\n  kind: api\n";
    let err = ConfigLoader::from_str(yaml, None).unwrap_err();
    assert!(err.to_string().contains("api_url"));

    let yaml = "loader:\n  kind: api\n  api_url: http://localhost:5000/api\n";
    let config = ConfigLoader::from_str(yaml, None).unwrap();
    assert_eq!(config.loader.kind, LoaderKind::Api);
}

#[test]
#[serial]
fn test_invalid_bind_addr_rejected() {
    let yaml = "server:\n  bind_addr: not-an-address\n";
    let err = ConfigLoader::from_str(yaml, None).unwrap_err();
    assert!(err.to_string().contains("bind_addr"));
}

#[test]
#[serial]
fn test_zero_timeout_disables_limit() {
    let config = ConfigLoader::from_str("runner:\n  call_timeout_secs: 0\n", None).unwrap();
    assert!(config.call_timeout().is_none());

    let config = ConfigLoader::from_str("runner:\n  call_timeout_secs: 3\n", None).unwrap();
    assert_eq!(config.call_timeout(), Some(std::time::Duration::from_secs(3)));
}

#[test]
#[serial]
fn test_environment_overrides() {
    env::set_var("COURSE_PYTHON", "pypy3");
    env::set_var("COURSE_EXERCISES_ROOT", "/srv/exercises");
    env::set_var("COURSE_API_KEY", "secret-token");

    let config = ConfigLoader::from_str("runner:\n  python: python3\n", None);

    env::remove_var("COURSE_PYTHON");
    env::remove_var("COURSE_EXERCISES_ROOT");
    env::remove_var("COURSE_API_KEY");

    let config = config.unwrap();
    assert_eq!(config.runner.python, "pypy3");
    assert_eq!(config.exercises.root, PathBuf::from("/srv/exercises"));
    assert_eq!(config.loader.api_key.as_deref(), Some("secret-token"));
}

#[test]
#[serial]
fn test_api_key_env_takes_precedence() {
    env::set_var("MY_COURSE_TOKEN", "from-named-var");
    env::set_var("COURSE_API_KEY", "from-default-var");

    let yaml = "loader:\n  api_key_env: MY_COURSE_TOKEN\n";
    let config = ConfigLoader::from_str(yaml, None);

    env::remove_var("MY_COURSE_TOKEN");
    env::remove_var("COURSE_API_KEY");

    assert_eq!(
        config.unwrap().loader.api_key.as_deref(),
        Some("from-named-var")
    );
}

#[tokio::test]
#[serial]
async fn test_relative_paths_resolve_against_config_dir() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "exercises:\n  root: exercises\n  global_resources: /abs/res").unwrap();

    let config = load_config(file.path()).await.unwrap();
    let base = file.path().parent().unwrap();

    assert_eq!(config.exercises.root, base.join("exercises"));
    assert_eq!(config.exercises.global_resources, PathBuf::from("/abs/res"));
}

#[tokio::test]
#[serial]
async fn test_missing_file_is_config_error() {
    let err = load_config("/definitely/not/here/course.yaml")
        .await
        .unwrap_err();
    assert!(matches!(err, crate::errors::CourseError::Config(_)));
}
