//! Human-readable test reports.

use super::{CallError, Outcome, TestRunResult};
use crate::errors::LoadError;
use crossterm::style::Stylize;
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

struct Painter {
    color: bool,
}

impl Painter {
    fn green(&self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    fn red(&self, text: &str) -> String {
        self.paint(text, |t| t.red().to_string())
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().to_string())
    }

    fn bold(&self, text: &str) -> String {
        self.paint(text, |t| t.bold().to_string())
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> String) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }

    fn banner(&self, out: &mut String, title: &str) {
        let rule = "=".repeat(RULE_WIDTH);
        let _ = writeln!(out, "\n{}", self.bold(&rule));
        let _ = writeln!(out, "{}", self.bold(title));
        let _ = writeln!(out, "{}", self.bold(&rule));
    }
}

/// Render the full report for a run: header, load phases, one block per
/// test and a summary with the score.
pub fn render(result: &TestRunResult, color: bool) -> String {
    let p = Painter { color };
    let mut out = String::new();

    p.banner(&mut out, "Running Tests");
    let _ = writeln!(out, "Code file: {}", p.cyan(&result.code_file.display().to_string()));
    let _ = writeln!(out, "Test file: {}", p.cyan(&result.test_file.display().to_string()));

    let _ = writeln!(out, "\n{}", p.bold("Loading code..."));
    if let Some(failure) = &result.load_failure {
        if is_code_failure(failure) {
            write_load_failure(&mut out, &p, failure);
            return out;
        }
    }
    let _ = writeln!(out, "{}", p.green("✓ Code loaded successfully"));

    let _ = writeln!(out, "\n{}", p.bold("Loading tests..."));
    if let Some(failure) = &result.load_failure {
        write_load_failure(&mut out, &p, failure);
        return out;
    }
    if result.outcomes.is_empty() {
        let _ = writeln!(
            out,
            "{} No tests found in {}",
            p.yellow("⚠ Warning:"),
            result.test_file.display()
        );
        return out;
    }
    let _ = writeln!(
        out,
        "{}",
        p.green(&format!("✓ Found {} test(s)", result.outcomes.len()))
    );

    p.banner(&mut out, "Test Results");
    for test in &result.outcomes {
        let passed = matches!(test.outcome, Outcome::Pass { .. });
        let _ = writeln!(out);
        if passed {
            let _ = writeln!(out, "{}", p.green(&format!("✓ Test {} PASSED", test.index)));
        } else {
            let _ = writeln!(out, "{}", p.red(&format!("✗ Test {} FAILED", test.index)));
        }
        if let Some(description) = &test.case.description {
            let _ = writeln!(out, "  {}", p.cyan(description));
        }

        if let Outcome::Error(CallError::FunctionNotFound(name)) = &test.outcome {
            let _ = writeln!(
                out,
                "  {}",
                p.yellow(&format!("Function '{}' not found", name))
            );
            continue;
        }

        let _ = writeln!(out, "  {} {}", p.bold("Call:"), test.case.signature());
        match &test.outcome {
            Outcome::Pass { actual } => {
                let _ = writeln!(out, "  {} {}", p.bold("Returned:"), actual);
            }
            Outcome::Fail { expected, actual } => {
                let _ = writeln!(out, "  {} {}", p.bold("Expected:"), expected);
                let _ = writeln!(out, "  {} {}", p.bold("Got:"), actual);
            }
            Outcome::Error(error) => {
                let _ = writeln!(out, "  {} {}", p.yellow("Error:"), error);
            }
        }
    }

    p.banner(&mut out, "Summary");
    let _ = writeln!(out, "Total tests: {}", result.total());
    let _ = writeln!(out, "{}", p.green(&format!("Passed: {}", result.passed)));
    let _ = writeln!(out, "{}", p.red(&format!("Failed: {}", result.failed)));

    if result.failed == 0 {
        let _ = writeln!(out, "\n{}", p.green(&p.bold("🎉 All tests passed! Great job!")));
    } else {
        let _ = writeln!(out, "\nScore: {:.1}%", result.score());
    }
    let _ = writeln!(out, "{}", p.bold(&"=".repeat(RULE_WIDTH)));

    out
}

fn is_code_failure(failure: &LoadError) -> bool {
    matches!(
        failure,
        LoadError::CodeNotFound(_) | LoadError::CodeSyntaxError(_) | LoadError::CodeLoadError(_)
    )
}

fn write_load_failure(out: &mut String, p: &Painter, failure: &LoadError) {
    let (label, detail) = match failure {
        LoadError::CodeNotFound(path) => (
            "✗ Error:",
            format!("Code file not found: {}", path.display()),
        ),
        LoadError::CodeSyntaxError(message) => ("✗ Syntax Error:", message.clone()),
        LoadError::CodeLoadError(message) => ("✗ Error loading code:", message.clone()),
        LoadError::TestFileNotFound(path) => (
            "✗ Error:",
            format!("Test file not found: {}", path.display()),
        ),
        LoadError::TestParseError(message) => ("✗ Error parsing TOML:", message.clone()),
    };
    let _ = writeln!(out, "{} {}", p.red(label), detail);
}
