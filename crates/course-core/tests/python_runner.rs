//! End-to-end runs through a real Python interpreter.
//!
//! Each test returns early when no `python3` is on the PATH.

use course_core::errors::LoadError;
use course_core::runner::{CallError, Outcome, OutcomeStatus};
use course_core::{Literal, TestRunner};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn python() -> Option<PathBuf> {
    match which::which("python3") {
        Ok(path) => Some(path),
        Err(_) => {
            eprintln!("python3 not found, skipping");
            None
        }
    }
}

fn runner(python: PathBuf) -> TestRunner {
    TestRunner::python(python.to_string_lossy().into_owned())
        .with_call_timeout(Some(Duration::from_secs(5)))
}

fn write_pair(code: &str, tests: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let code_path = dir.path().join("student.py");
    let tests_path = dir.path().join("tests.toml");
    fs::write(&code_path, code).unwrap();
    fs::write(&tests_path, tests).unwrap();
    (dir, code_path, tests_path)
}

const ADD_SUITE: &str = r#"
[[test]]
function = "add"
args = [2, 3]
returns = 5
description = "Adds two numbers"
"#;

#[tokio::test]
async fn test_correct_solution_passes() {
    let Some(python) = python() else { return };
    let (_dir, code, tests) = write_pair("def add(a, b):\n    return a + b\n", ADD_SUITE);

    let result = runner(python).run(&code, &tests).await;

    assert!(result.success(), "{}", result.report(false));
    assert_eq!(result.passed, 1);
}

#[tokio::test]
async fn test_wrong_answer_fails() {
    let Some(python) = python() else { return };
    let (_dir, code, tests) = write_pair("def add(a, b):\n    return a + b + 1\n", ADD_SUITE);

    let result = runner(python).run(&code, &tests).await;

    assert!(!result.success());
    assert_eq!(
        result.outcomes[0].outcome,
        Outcome::Fail {
            expected: Literal::Integer(5),
            actual: Literal::Integer(6)
        }
    );
}

#[tokio::test]
async fn test_missing_function_is_error() {
    let Some(python) = python() else { return };
    let (_dir, code, tests) = write_pair("def sub(a, b):\n    return a - b\n", ADD_SUITE);

    let result = runner(python).run(&code, &tests).await;

    assert_eq!(
        result.outcomes[0].outcome,
        Outcome::Error(CallError::FunctionNotFound("add".to_string()))
    );
    assert!(result.report(false).contains("Function 'add' not found"));
}

#[tokio::test]
async fn test_empty_suite_is_not_success() {
    let Some(python) = python() else { return };
    let (_dir, code, tests) = write_pair("def add(a, b):\n    return a + b\n", "");

    let result = runner(python).run(&code, &tests).await;

    assert!(result.outcomes.is_empty());
    assert!(!result.success());
}

#[tokio::test]
async fn test_syntax_error_aborts() {
    let Some(python) = python() else { return };
    let (_dir, code, tests) = write_pair("def add(a, b)\n    return a + b\n", ADD_SUITE);

    let result = runner(python).run(&code, &tests).await;

    assert!(matches!(
        result.load_failure,
        Some(LoadError::CodeSyntaxError(_))
    ));
}

#[tokio::test]
async fn test_raises_and_system_exit_are_errors() {
    let Some(python) = python() else { return };
    let code = r#"
import sys

def divide(a, b):
    return a / b

def leave():
    sys.exit(2)

def after():
    return "still alive"
"#;
    let suite = r#"
[[test]]
function = "divide"
args = [1, 0]

[[test]]
function = "leave"

[[test]]
function = "after"
returns = "still alive"
"#;
    let (_dir, code, tests) = write_pair(code, suite);

    let result = runner(python).run(&code, &tests).await;

    match &result.outcomes[0].outcome {
        Outcome::Error(CallError::Raised(message)) => {
            assert!(message.starts_with("ZeroDivisionError:"), "{message}")
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match &result.outcomes[1].outcome {
        Outcome::Error(CallError::Raised(message)) => {
            assert!(message.starts_with("SystemExit"), "{message}")
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(result.outcomes[2].outcome.status(), OutcomeStatus::Pass);
}

#[tokio::test]
async fn test_structured_values_and_printing() {
    let Some(python) = python() else { return };
    let code = r#"
print("debug output goes elsewhere")

def stats(values):
    print("computing", values)
    return {"min": min(values), "max": max(values), "mean": sum(values) / len(values)}

def pair():
    return [1, "two"]

def flag():
    return 1
"#;
    let suite = r#"
[[test]]
function = "stats"
args = [[1, 2, 3]]
returns = { max = 3, min = 1, mean = 2.0 }

[[test]]
function = "pair"
returns = [1, "two"]

[[test]]
function = "flag"
returns = true
"#;
    let (_dir, code, tests) = write_pair(code, suite);

    let result = runner(python).run(&code, &tests).await;

    assert_eq!(result.outcomes[0].outcome.status(), OutcomeStatus::Pass);
    assert_eq!(result.outcomes[1].outcome.status(), OutcomeStatus::Pass);
    // 1 is not True: no coercion.
    assert_eq!(result.outcomes[2].outcome.status(), OutcomeStatus::Fail);
}

#[tokio::test]
async fn test_tuple_never_equals_list() {
    let Some(python) = python() else { return };
    let code = "def pair():\n    return (1, 2)\n";
    let suite = "[[test]]\nfunction = \"pair\"\nreturns = [1, 2]\n";
    let (_dir, code, tests) = write_pair(code, suite);

    let result = runner(python).run(&code, &tests).await;

    match &result.outcomes[0].outcome {
        Outcome::Fail { expected, actual } => {
            assert_eq!(
                expected,
                &Literal::Array(vec![Literal::Integer(1), Literal::Integer(2)])
            );
            assert_eq!(actual, &Literal::Opaque("(1, 2)".to_string()));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!result.success());
}

#[tokio::test]
async fn test_infinite_loop_times_out_and_run_continues() {
    let Some(python) = python() else { return };
    let code = r#"
def spin():
    while True:
        pass

def ok():
    return 1
"#;
    let suite = "[[test]]\nfunction = \"spin\"\n\n[[test]]\nfunction = \"ok\"\nreturns = 1\n";
    let (_dir, code, tests) = write_pair(code, suite);

    let result = TestRunner::python(python.to_string_lossy().into_owned())
        .with_call_timeout(Some(Duration::from_secs(1)))
        .run(&code, &tests)
        .await;

    assert_eq!(
        result.outcomes[0].outcome,
        Outcome::Error(CallError::TimedOut(Duration::from_secs(1)))
    );
    assert_eq!(result.outcomes[1].outcome.status(), OutcomeStatus::Pass);
}

#[tokio::test]
async fn test_input_does_not_block() {
    let Some(python) = python() else { return };
    let code = "def ask():\n    return input('name? ')\n";
    let suite = "[[test]]\nfunction = \"ask\"\nreturns = \"\"\n";
    let (_dir, code, tests) = write_pair(code, suite);

    let result = runner(python).run(&code, &tests).await;

    match &result.outcomes[0].outcome {
        Outcome::Error(CallError::Raised(message)) => assert!(message.starts_with("EOFError")),
        other => panic!("unexpected outcome {other:?}"),
    }
}
