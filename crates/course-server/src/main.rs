//! Serves a course's exercises over HTTP.

use anyhow::Result;
use clap::Parser;
use course_core::ConfigLoader;
use course_server::{shutdown_signal, ExerciseServer, ServerConfig};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Course Server - Serve exercises, files and resources")]
struct Cli {
    #[clap(long, short, help = "Configuration file (defaults to ./course.yaml if present)")]
    config: Option<PathBuf>,

    #[clap(long, help = "Address to listen on, overrides server.bind_addr")]
    bind: Option<String>,

    #[clap(long, help = "Exercise root directory, overrides exercises.root")]
    root: Option<PathBuf>,

    #[clap(long, help = "Global resource directory, overrides exercises.global_resources")]
    resources: Option<PathBuf>,

    #[clap(long, help = "Origin used in rewritten resource URLs")]
    public_url: Option<String>,

    #[clap(long, short, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let course_config = ConfigLoader::load_or_default(cli.config.as_deref()).await?;
    let mut config = ServerConfig::from_course_config(&course_config)?;

    if let Some(bind) = &cli.bind {
        config = config
            .with_bind_addr_str(bind)
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind, e))?;
    }
    if let Some(root) = cli.root {
        config = config.with_exercises_root(root);
    }
    if let Some(resources) = cli.resources {
        config = config.with_global_resources(resources);
    }
    if let Some(public_url) = cli.public_url {
        config = config.with_public_url(public_url);
    }

    if !config.exercises_root.is_dir() {
        log::warn!(
            "Exercise root {} does not exist yet",
            config.exercises_root.display()
        );
    }

    ExerciseServer::new(config)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
