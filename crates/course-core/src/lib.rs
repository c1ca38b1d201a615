//! Core library for loading course exercises and checking student code.
//!
//! An exercise is a directory under `{root}/{bucket}/{code}` holding an
//! `index.md` description and, optionally, a `tests.toml` suite, a
//! `solution.py` reference and a `res/` folder of resources.
//!
//! # Architecture Overview
//!
//! - **Exercise resolution**: address parsing, contained path joins and bundle loading
//! - **Loaders**: filesystem and HTTP API sources behind one trait
//! - **Panel**: markdown to HTML rendering with resource link rewriting
//! - **Runner**: TOML function test suites executed through an interpreter bridge
//! - **Session**: the workbench state a host editor drives (entry, panel, console)
//! - **Configuration**: YAML configuration with environment overrides

pub mod config;
pub mod errors;
pub mod exercise;
pub mod runner;
pub mod session;
pub mod view;

pub use config::{ConfigLoader, CourseConfig};
pub use errors::{CourseError, LoadError, ResolveError, SessionError};
pub use exercise::{
    create_loader, resolve, ExerciseAddress, ExerciseBundle, ExerciseLoader, LoadedExercise,
};
pub use runner::{Literal, TestCase, TestRunResult, TestRunner};
pub use session::Workbench;
pub use view::ExerciseView;
