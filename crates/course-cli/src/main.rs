//! `course`: pull exercises, check solutions and reveal reference code from
//! the terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use course_cli::{format_listing, init_logger, print_console};
use course_core::{ConfigLoader, TestRunner, Workbench};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "course", author, version, about = "Course checker - pull exercises and test your code")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, help = "Configuration file (defaults to ./course.yaml if present)")]
    config: Option<PathBuf>,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Disable colored test reports")]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load an exercise and show what it offers
    Pull {
        /// Exercise code, as `code` or `bucket/code`
        exercise: String,

        #[clap(long, help = "Write the rendered exercise page to this file")]
        html: Option<PathBuf>,
    },
    /// Run an exercise's tests against your file
    Check {
        /// Exercise code, as `code` or `bucket/code`
        exercise: String,

        /// Your Python file
        file: PathBuf,
    },
    /// Show the path of an exercise's reference solution
    Solution {
        /// Exercise code, as `code` or `bucket/code`
        exercise: String,

        #[clap(long, help = "Print the solution instead of its path")]
        print: bool,
    },
    /// List available exercises
    List,
    /// Run a tests.toml suite against a Python file directly
    Test {
        code_file: PathBuf,
        test_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli.log_level);

    let config = ConfigLoader::load_or_default(cli.config.as_deref()).await?;
    let color = config.runner.color && !cli.no_color;

    let mut bench = Workbench::from_config(&config)?.with_color(color);
    let runner = TestRunner::from_config(&config);
    let success = run_command(&mut bench, &runner, color, cli.command).await;
    print_console(&bench.console_mut().drain(), color);

    if !success? {
        std::process::exit(1);
    }
    Ok(())
}

/// Run one command. `Ok(false)` means the command ran but did not succeed,
/// with the reason already on the console.
async fn run_command(
    bench: &mut Workbench,
    runner: &TestRunner,
    color: bool,
    command: Commands,
) -> Result<bool> {
    match command {
        Commands::Pull { exercise, html } => {
            bench.set_entry(exercise);
            if bench.pull_exercise().await.is_err() {
                return Ok(false);
            }
            let actions: Vec<_> = bench.view().actions().iter().map(|a| a.label()).collect();
            if !actions.is_empty() {
                bench
                    .console_mut()
                    .info(format!("Available: {}", actions.join("  ")));
            }
            if let Some(path) = html {
                tokio::fs::write(&path, bench.view().html()).await?;
                bench
                    .console_mut()
                    .info(format!("Exercise page written to {}", path.display()));
            }
            Ok(true)
        }
        Commands::Check { exercise, file } => {
            bench.set_entry(exercise);
            if bench.pull_exercise().await.is_err() {
                return Ok(false);
            }
            match bench.run_tests(Some(&file)).await {
                Ok(result) => Ok(result.success()),
                Err(_) => Ok(false),
            }
        }
        Commands::Solution { exercise, print } => {
            bench.set_entry(exercise);
            if bench.pull_exercise().await.is_err() {
                return Ok(false);
            }
            let Ok(path) = bench.show_solution() else {
                return Ok(false);
            };
            if print {
                let source = tokio::fs::read_to_string(&path).await?;
                bench.console_mut().info(source.trim_end());
            }
            Ok(true)
        }
        Commands::List => match bench.list_exercises().await {
            Ok(listing) => {
                bench.console_mut().info(format_listing(&listing));
                Ok(true)
            }
            Err(_) => Ok(false),
        },
        Commands::Test {
            code_file,
            test_file,
        } => {
            let result = runner.run(&code_file, &test_file).await;
            for line in result.report(color).lines() {
                bench.console_mut().info(line);
            }
            Ok(result.success())
        }
    }
}
