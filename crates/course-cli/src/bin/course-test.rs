//! `course-test <code_file> <tests.toml>`: run a function test suite and
//! exit 0 only when every test passes.

use clap::Parser;
use course_cli::init_logger;
use course_core::{ConfigLoader, TestRunner};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(
    name = "course-test",
    author,
    version,
    about = "Run a tests.toml suite against a Python file"
)]
struct Cli {
    /// Python file holding the functions under test
    code_file: PathBuf,

    /// TOML file with [[test]] entries
    test_file: PathBuf,

    #[clap(long, help = "Disable colored output")]
    no_color: bool,

    #[clap(long, help = "Seconds allowed per call, 0 for no limit")]
    timeout: Option<u64>,

    #[clap(long, help = "Python interpreter to use")]
    python: Option<String>,

    #[clap(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logger(&cli.log_level);

    let mut config = match ConfigLoader::load_or_default(None).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(python) = cli.python {
        config.runner.python = python;
    }
    if let Some(secs) = cli.timeout {
        config.runner.call_timeout_secs = secs;
    }

    let runner = TestRunner::from_config(&config);
    log::debug!(
        "Using {} with {:?} per call",
        config.runner.python,
        config.call_timeout().map(|d| d.as_secs())
    );

    let result = runner.run(&cli.code_file, &cli.test_file).await;
    print!("{}", result.report(!cli.no_color && config.runner.color));

    if result.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
