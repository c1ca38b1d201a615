//! Interpreter bridge.
//!
//! Student code is never run in this process. An [`Interpreter`] loads a
//! code file into a fresh namespace and hands back a [`CodeNamespace`] that
//! can call functions in it by name.

use super::literal::Literal;
use crate::errors::LoadError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

const HARNESS: &str = include_str!("harness.py");

/// What a single call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Returned(Literal),
    /// No callable with that name exists in the namespace.
    NotFound,
    /// The call raised; the message is `ExceptionType: message`.
    Raised(String),
}

/// The interpreter itself broke down during a call.
#[derive(Error, Debug)]
pub enum InterpreterError {
    #[error("interpreter exited")]
    Exited,
    #[error("interpreter I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected interpreter reply: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Load `code` into a fresh namespace.
    async fn load(&self, code: &Path) -> Result<Box<dyn CodeNamespace>, LoadError>;
}

#[async_trait]
pub trait CodeNamespace: Send {
    async fn call(
        &mut self,
        function: &str,
        args: &[Literal],
    ) -> Result<CallResult, InterpreterError>;
}

#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    function: &'a str,
    args: &'a [Literal],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Reply {
    Loaded,
    NotFound,
    SyntaxError { message: String },
    LoadError { message: String },
    Returned { value: Literal },
    Raised { message: String },
}

/// Runs code in a child Python process speaking JSON lines.
#[derive(Debug, Clone)]
pub struct PythonInterpreter {
    program: String,
}

impl PythonInterpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Interpreter for PythonInterpreter {
    async fn load(&self, code: &Path) -> Result<Box<dyn CodeNamespace>, LoadError> {
        let mut child = Command::new(&self.program)
            .arg("-u")
            .arg("-c")
            .arg(HARNESS)
            .arg(code)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                LoadError::CodeLoadError(format!("failed to start '{}': {}", self.program, e))
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            return Err(LoadError::CodeLoadError(
                "interpreter pipes unavailable".to_string(),
            ));
        };

        let mut namespace = PythonNamespace {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        let reply = namespace
            .read_reply()
            .await
            .map_err(|e| LoadError::CodeLoadError(e.to_string()))?;

        match reply {
            Reply::Loaded => {
                log::debug!("Loaded {} with {}", code.display(), self.program);
                Ok(Box::new(namespace))
            }
            Reply::NotFound => Err(LoadError::CodeNotFound(code.to_path_buf())),
            Reply::SyntaxError { message } => Err(LoadError::CodeSyntaxError(message)),
            Reply::LoadError { message } => Err(LoadError::CodeLoadError(message)),
            other => Err(LoadError::CodeLoadError(format!(
                "unexpected interpreter reply: {:?}",
                other
            ))),
        }
    }
}

struct PythonNamespace {
    // Held so the process lives exactly as long as the namespace.
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl PythonNamespace {
    async fn read_reply(&mut self) -> Result<Reply, InterpreterError> {
        let line = self
            .stdout
            .next_line()
            .await?
            .ok_or(InterpreterError::Exited)?;
        serde_json::from_str(&line).map_err(|e| InterpreterError::Protocol(format!("{e}: {line}")))
    }
}

#[async_trait]
impl CodeNamespace for PythonNamespace {
    async fn call(
        &mut self,
        function: &str,
        args: &[Literal],
    ) -> Result<CallResult, InterpreterError> {
        let request = serde_json::to_string(&CallRequest { function, args })
            .map_err(|e| InterpreterError::Protocol(e.to_string()))?;

        self.stdin.write_all(request.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;

        match self.read_reply().await? {
            Reply::Returned { value } => Ok(CallResult::Returned(value)),
            Reply::NotFound => Ok(CallResult::NotFound),
            Reply::Raised { message } => Ok(CallResult::Raised(message)),
            other => Err(InterpreterError::Protocol(format!("{:?}", other))),
        }
    }
}
