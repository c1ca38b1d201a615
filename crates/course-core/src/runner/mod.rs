//! Function test runner.
//!
//! Loads a student's code file into a fresh interpreter namespace, calls the
//! functions declared in a `tests.toml` suite with literal arguments and
//! compares what comes back with the expected values.

pub mod definitions;
pub mod interpreter;
pub mod literal;
pub mod report;


pub use definitions::{load_test_cases, parse_test_cases, TestCase};
pub use interpreter::{CallResult, CodeNamespace, Interpreter, InterpreterError, PythonInterpreter};
pub use literal::Literal;

use crate::config::CourseConfig;
use crate::errors::LoadError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a test call produced no comparable value.
#[derive(Debug, Clone, PartialEq)]
pub enum CallError {
    FunctionNotFound(String),
    Raised(String),
    TimedOut(Duration),
    InterpreterFailed(String),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::FunctionNotFound(name) => write!(f, "Function '{}' not found", name),
            CallError::Raised(message) => f.write_str(message),
            CallError::TimedOut(limit) => write!(f, "timed out after {}s", limit.as_secs()),
            CallError::InterpreterFailed(message) => write!(f, "interpreter failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass { actual: Literal },
    Fail { expected: Literal, actual: Literal },
    Error(CallError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Pass,
    Fail,
    Error,
}

impl Outcome {
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Outcome::Pass { .. } => OutcomeStatus::Pass,
            Outcome::Fail { .. } => OutcomeStatus::Fail,
            Outcome::Error(_) => OutcomeStatus::Error,
        }
    }
}

/// One executed test, numbered from 1 in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub index: usize,
    pub case: TestCase,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestRunResult {
    pub code_file: PathBuf,
    pub test_file: PathBuf,
    pub passed: usize,
    /// Failed comparisons plus errored calls.
    pub failed: usize,
    pub outcomes: Vec<TestOutcome>,
    /// Set when the run stopped before executing any test.
    pub load_failure: Option<LoadError>,
}

impl TestRunResult {
    fn new(code_file: &Path, test_file: &Path) -> Self {
        Self {
            code_file: code_file.to_path_buf(),
            test_file: test_file.to_path_buf(),
            passed: 0,
            failed: 0,
            outcomes: Vec::new(),
            load_failure: None,
        }
    }

    /// True when at least one test ran and none failed.
    pub fn success(&self) -> bool {
        self.load_failure.is_none() && self.failed == 0 && !self.outcomes.is_empty()
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Percentage of passed tests, 0 when nothing ran.
    pub fn score(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passed as f64 / total as f64 * 100.0,
        }
    }

    pub fn report(&self, color: bool) -> String {
        report::render(self, color)
    }

    fn record(&mut self, case: TestCase, outcome: Outcome) {
        match outcome.status() {
            OutcomeStatus::Pass => self.passed += 1,
            OutcomeStatus::Fail | OutcomeStatus::Error => self.failed += 1,
        }
        self.outcomes.push(TestOutcome {
            index: self.outcomes.len() + 1,
            case,
            outcome,
        });
    }
}

/// Runs test suites through an [`Interpreter`].
#[derive(Clone)]
pub struct TestRunner {
    interpreter: Arc<dyn Interpreter>,
    call_timeout: Option<Duration>,
}

impl TestRunner {
    pub fn new(interpreter: Arc<dyn Interpreter>) -> Self {
        Self {
            interpreter,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }

    /// A runner backed by a Python interpreter binary.
    pub fn python(program: impl Into<String>) -> Self {
        Self::new(Arc::new(PythonInterpreter::new(program)))
    }

    pub fn from_config(config: &CourseConfig) -> Self {
        Self::python(config.runner.python.clone()).with_call_timeout(config.call_timeout())
    }

    /// Limit for loading the code and for each call; `None` waits forever.
    pub fn with_call_timeout(mut self, limit: Option<Duration>) -> Self {
        self.call_timeout = limit;
        self
    }

    pub async fn run(&self, code: &Path, tests: &Path) -> TestRunResult {
        let mut result = TestRunResult::new(code, tests);
        log::info!(
            "Running tests from {} against {}",
            tests.display(),
            code.display()
        );

        let namespace = match self.load_code(code).await {
            Ok(namespace) => namespace,
            Err(e) => {
                log::warn!("Could not load {}: {}", code.display(), e);
                result.load_failure = Some(e);
                return result;
            }
        };

        let cases = match load_test_cases(tests).await {
            Ok(cases) => cases,
            Err(e) => {
                log::warn!("Could not load {}: {}", tests.display(), e);
                result.load_failure = Some(e);
                return result;
            }
        };

        if cases.is_empty() {
            log::warn!("No tests found in {}", tests.display());
            return result;
        }

        let mut namespace = Some(namespace);
        for case in cases {
            let outcome = self.execute(&mut namespace, code, &case).await;
            result.record(case, outcome);
        }

        log::info!(
            "Finished {} test(s): {} passed, {} failed",
            result.total(),
            result.passed,
            result.failed
        );
        result
    }

    async fn load_code(&self, code: &Path) -> Result<Box<dyn CodeNamespace>, LoadError> {
        if !code.is_file() {
            return Err(LoadError::CodeNotFound(code.to_path_buf()));
        }

        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.interpreter.load(code))
                .await
                .unwrap_or_else(|_| {
                    Err(LoadError::CodeLoadError(format!(
                        "timed out after {}s",
                        limit.as_secs()
                    )))
                }),
            None => self.interpreter.load(code).await,
        }
    }

    /// Run one case. A namespace whose interpreter timed out or broke is
    /// dropped, and the code is loaded again before the next call.
    async fn execute(
        &self,
        slot: &mut Option<Box<dyn CodeNamespace>>,
        code: &Path,
        case: &TestCase,
    ) -> Outcome {
        let mut namespace = match slot.take() {
            Some(namespace) => namespace,
            None => match self.load_code(code).await {
                Ok(namespace) => namespace,
                Err(e) => {
                    return Outcome::Error(CallError::InterpreterFailed(format!(
                        "could not reload code: {}",
                        e
                    )))
                }
            },
        };

        let reply = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, namespace.call(&case.function, &case.args))
                .await
                .map_err(|_| limit),
            None => Ok(namespace.call(&case.function, &case.args).await),
        };

        match reply {
            Ok(Ok(call)) => {
                *slot = Some(namespace);
                compare(case, call)
            }
            Ok(Err(e)) => {
                log::warn!("Interpreter failed during {}: {}", case.signature(), e);
                Outcome::Error(CallError::InterpreterFailed(e.to_string()))
            }
            Err(limit) => {
                log::warn!(
                    "{} timed out after {}s, reloading code",
                    case.signature(),
                    limit.as_secs()
                );
                Outcome::Error(CallError::TimedOut(limit))
            }
        }
    }
}

fn compare(case: &TestCase, call: CallResult) -> Outcome {
    match call {
        CallResult::Returned(actual) if actual == case.returns => Outcome::Pass { actual },
        CallResult::Returned(actual) => Outcome::Fail {
            expected: case.returns.clone(),
            actual,
        },
        CallResult::NotFound => Outcome::Error(CallError::FunctionNotFound(case.function.clone())),
        CallResult::Raised(message) => Outcome::Error(CallError::Raised(message)),
    }
}
