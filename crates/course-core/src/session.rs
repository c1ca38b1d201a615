//! Workbench session.
//!
//! Holds everything an editor integration needs between clicks: the text in
//! the exercise entry box, the exercise currently shown, the rendered panel
//! and the console the student reads. Hosts drive it through a handful of
//! async operations and display [`Workbench::view`] and
//! [`Workbench::console`] however they like.

use crate::config::CourseConfig;
use crate::errors::{CourseError, ResolveError, SessionError};
use crate::exercise::{create_loader, ExerciseAddress, ExerciseLoader, LoadedExercise};
use crate::runner::{TestRunResult, TestRunner};
use crate::view::ExerciseView;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub level: ConsoleLevel,
    pub text: String,
}

/// Ordered output shown to the student, mirrored to the log.
#[derive(Debug, Default, Clone)]
pub struct Console {
    lines: Vec<ConsoleLine>,
}

impl Console {
    pub fn info(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.push(ConsoleLevel::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        let text = format!("WARNING: {}", text.into());
        log::warn!("{}", text);
        self.push(ConsoleLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = format!("ERROR: {}", text.into());
        log::error!("{}", text);
        self.push(ConsoleLevel::Error, text);
    }

    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }

    /// Remove and return everything written so far.
    pub fn drain(&mut self) -> Vec<ConsoleLine> {
        std::mem::take(&mut self.lines)
    }

    fn push(&mut self, level: ConsoleLevel, text: String) {
        self.lines.push(ConsoleLine { level, text });
    }
}

pub struct Workbench {
    loader: Box<dyn ExerciseLoader>,
    runner: TestRunner,
    color: bool,
    entry: String,
    exercise: Option<LoadedExercise>,
    view: ExerciseView,
    console: Console,
}

impl Workbench {
    pub fn new(loader: Box<dyn ExerciseLoader>, runner: TestRunner) -> Self {
        Self {
            loader,
            runner,
            color: false,
            entry: String::new(),
            exercise: None,
            view: ExerciseView::default(),
            console: Console::default(),
        }
    }

    pub fn from_config(config: &CourseConfig) -> Result<Self, CourseError> {
        let loader = create_loader(&config.loader, &config.exercises)?;
        Ok(Self::new(loader, TestRunner::from_config(config)).with_color(config.runner.color))
    }

    /// Whether test reports written to the console carry ANSI colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn set_entry(&mut self, text: impl Into<String>) {
        self.entry = text.into();
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn exercise(&self) -> Option<&LoadedExercise> {
        self.exercise.as_ref()
    }

    pub fn view(&self) -> &ExerciseView {
        &self.view
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Load the exercise named in the entry box and show it.
    ///
    /// On failure the previous exercise and panel stay as they were, except
    /// when the exercise exists but its description cannot be decoded: the
    /// panel then shows an error page with the raw text instead.
    pub async fn pull_exercise(&mut self) -> Result<&LoadedExercise, SessionError> {
        let entry = self.entry.clone();

        let address = match ExerciseAddress::parse(&entry) {
            Ok(address) => address,
            Err(e) => {
                self.console.error(e.to_string());
                return Err(CourseError::from(e).into());
            }
        };
        self.console.info(format!("Loading exercise: {}", address));

        match self.loader.load(&entry).await {
            Ok(exercise) => {
                self.view = ExerciseView::render(&exercise);
                self.console.info(format!(
                    "✓ Exercise {} loaded successfully",
                    exercise.address.code()
                ));
                Ok(self.exercise.insert(exercise))
            }
            Err(CourseError::Resolve(ResolveError::ReadError { path, message })) => {
                let raw = match tokio::fs::read(&path).await {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(_) => String::new(),
                };
                let text = format!("Failed to read {}: {}", path.display(), message);
                self.view = ExerciseView::error(&text, &raw);
                self.exercise = None;
                self.console.error(text);
                Err(CourseError::Resolve(ResolveError::ReadError { path, message }).into())
            }
            Err(e) if e.is_not_found() => {
                self.console.error(format!("Exercise not found - {}", e));
                Err(e.into())
            }
            Err(e) => {
                self.console.error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Every exercise the loader can see, by bucket.
    pub async fn list_exercises(&mut self) -> Result<BTreeMap<String, Vec<String>>, SessionError> {
        match self.loader.list().await {
            Ok(listing) => Ok(listing),
            Err(e) => {
                self.console.error(format!("Failed to list exercises: {}", e));
                Err(e.into())
            }
        }
    }

    /// Run the current exercise's tests against the student's saved file and
    /// write the report to the console.
    pub async fn run_tests(
        &mut self,
        student_file: Option<&Path>,
    ) -> Result<TestRunResult, SessionError> {
        let tests = match self.exercise.as_ref() {
            None => return Err(self.refuse(SessionError::NoExercise)),
            Some(exercise) => match exercise.tests_path() {
                Some(tests) => tests,
                None => return Err(self.refuse(SessionError::TestsUnavailable)),
            },
        };
        let Some(student_file) = student_file else {
            return Err(self.refuse(SessionError::UnsavedFile));
        };

        let result = self.runner.run(student_file, &tests).await;
        for line in result.report(self.color).lines() {
            self.console.info(line);
        }
        Ok(result)
    }

    /// Path of the current exercise's reference solution, for the host to
    /// open in an editor.
    pub fn show_solution(&mut self) -> Result<PathBuf, SessionError> {
        let solution = match self.exercise.as_ref() {
            None => return Err(self.refuse(SessionError::NoExercise)),
            Some(exercise) => match exercise.solution_path() {
                Some(solution) => solution,
                None => return Err(self.refuse(SessionError::SolutionUnavailable)),
            },
        };

        if !solution.is_file() {
            return Err(self.refuse(SessionError::SolutionMissing(solution)));
        }

        self.console.info(format!("Solution: {}", solution.display()));
        Ok(solution)
    }

    fn refuse(&mut self, error: SessionError) -> SessionError {
        self.console.warning(error.to_string());
        error
    }
}
