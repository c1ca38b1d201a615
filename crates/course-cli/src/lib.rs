//! Shared plumbing for the `course` and `course-test` binaries.

use course_core::session::{ConsoleLevel, ConsoleLine};
use crossterm::style::Stylize;
use log::LevelFilter;
use std::collections::BTreeMap;

/// Initialise `env_logger` from a `--log-level` value.
///
/// The workbench mirrors its console into the log. The binaries print that
/// console themselves, so the mirror is only let through at debug and trace.
pub fn init_logger(level: &str) {
    let level_filter = level.parse().unwrap_or(LevelFilter::Info);
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_filter);
    if level_filter < LevelFilter::Debug {
        builder.filter_module("course_core::session", LevelFilter::Off);
    }
    builder.init();
}

/// Print console lines: info to stdout, warnings and errors to stderr.
pub fn print_console(lines: &[ConsoleLine], color: bool) {
    for line in lines {
        match line.level {
            ConsoleLevel::Info => println!("{}", line.text),
            ConsoleLevel::Warning if color => eprintln!("{}", line.text.as_str().yellow()),
            ConsoleLevel::Error if color => eprintln!("{}", line.text.as_str().red()),
            ConsoleLevel::Warning | ConsoleLevel::Error => eprintln!("{}", line.text),
        }
    }
}

/// One line per bucket: `bucket: code code ...`.
pub fn format_listing(listing: &BTreeMap<String, Vec<String>>) -> String {
    if listing.is_empty() {
        return "No exercises found".to_string();
    }
    listing
        .iter()
        .map(|(bucket, codes)| format!("{}: {}", bucket, codes.join(" ")))
        .collect::<Vec<_>>()
        .join("\n")
}
