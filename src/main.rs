//! deej-bind - slider binding companion for deej
//!
//! Binds the process behind the focused window to a hardware slider and
//! filters raw slider readings down to meaningful moves.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use crate::cli::{Cli, Command};
use deej_bind::config::{AppConfig, ConfigWatcher};
use deej_bind::paths::AppPaths;
use deej_bind::process::{CommandRunner, SystemCommandRunner};
use deej_bind::slider::SliderTracker;
use deej_bind::{BindingStore, WindowResolver};

/// Log file in the logs directory
const LOG_FILE: &str = "deej-bind-latest-run.log";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let paths = match &cli.config {
        Some(config) => AppPaths::with_config(config),
        None => AppPaths::detect(),
    };
    paths.ensure_directories()?;

    let _log_guard = init_logging(&cli.log_level, &paths.logs_dir)?;
    debug!("Configuration file: {}", paths.config.display());

    match cli.command {
        Command::Resolve => resolve(&paths.config).await,
        Command::Bind { slider } => bind(&paths.config, slider).await,
        Command::Add { name, slider } => {
            let store = BindingStore::new(&paths.config);
            store
                .add_binding(&name, slider)
                .await
                .context("Failed to add binding")?;
            println!("{} {} -> slider {}", "Bound".green(), name.bold(), slider);
            Ok(ExitCode::SUCCESS)
        }
        Command::List { json } => list(&paths.config, json).await,
        Command::Monitor => monitor(&paths.config).await,
        Command::Edit => edit(&paths.config).await,
    }
}

/// Load the typed config, falling back to defaults when the file is absent
async fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        warn!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    AppConfig::load(path).await
}

async fn build_resolver(path: &Path) -> Result<WindowResolver> {
    let config = load_config(path).await?;
    let settings = &config.window_resolution;
    let runner = Arc::new(SystemCommandRunner::new(settings.command_timeout()));
    Ok(WindowResolver::hyprland(runner, settings.strategy))
}

async fn resolve(config_path: &Path) -> Result<ExitCode> {
    let resolver = build_resolver(config_path).await?;

    match resolver.resolve().await {
        Ok(resolved) => {
            if let Some(title) = &resolved.title {
                info!("Focused window: {}", title);
            }
            for owner in resolved.owners {
                println!("{}", owner);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            warn!("Could not resolve focused window: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn bind(config_path: &Path, slider: u32) -> Result<ExitCode> {
    let resolver = build_resolver(config_path).await?;

    // Resolution failures are expected (desktop focused, silent app, ...)
    let owners = match resolver.foreground_owner_process_names().await {
        Ok(owners) => owners,
        Err(e) => {
            warn!("Skipping binding: {}", e);
            println!("{} {}", "Not bound:".yellow(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let store = BindingStore::new(config_path);
    for owner in &owners {
        store
            .add_binding(owner, slider)
            .await
            .with_context(|| format!("Failed to bind {} to slider {}", owner, slider))?;
        println!("{} {} -> slider {}", "Bound".green(), owner.bold(), slider);
    }

    Ok(ExitCode::SUCCESS)
}

async fn list(config_path: &Path, json: bool) -> Result<ExitCode> {
    let bindings = BindingStore::new(config_path)
        .bindings()
        .await
        .context("Failed to read bindings")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bindings)?);
        return Ok(ExitCode::SUCCESS);
    }

    if bindings.is_empty() {
        println!("{}", "No slider bindings".dimmed());
    }
    for (slider, names) in &bindings {
        let names = if names.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            names.join(", ")
        };
        println!("  {} {}", format!("slider {}:", slider).cyan(), names);
    }

    Ok(ExitCode::SUCCESS)
}

async fn monitor(config_path: &Path) -> Result<ExitCode> {
    let (mut config_watcher, config) = ConfigWatcher::new(config_path.to_path_buf()).await?;
    let mut tracker = SliderTracker::new(config.noise_reduction, config.invert_sliders);
    info!(
        "Monitoring slider input (noise reduction: {})",
        config.noise_reduction
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read slider input")? else {
                    info!("Slider input closed");
                    break;
                };

                match tracker.handle_line(&line) {
                    Ok(events) => {
                        for event in events {
                            println!("slider {}: {:.2}", event.index, event.percent);
                        }
                    }
                    Err(e) => warn!("Ignoring slider line: {}", e),
                }
            }

            Some(new_config) = config_watcher.next_config() => {
                info!("Configuration file changed, reloading...");
                tracker.reconfigure(new_config.noise_reduction, new_config.invert_sliders);
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping monitor");
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn edit(config_path: &Path) -> Result<ExitCode> {
    let config = config_path.to_string_lossy();
    let editor = cli::editor_command(&config);
    let args: Vec<&str> = editor.args.iter().map(String::as_str).collect();

    let runner = SystemCommandRunner::new(AppConfig::default().window_resolution.command_timeout());
    let opened = if editor.attached {
        runner.run_attached(&editor.program, &args).await
    } else {
        runner.spawn_detached(&editor.program, &args).await
    };
    opened.with_context(|| format!("Failed to open {} with {}", config, editor.program))?;

    Ok(ExitCode::SUCCESS)
}

fn init_logging(level: &str, logs_dir: &Path) -> Result<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never(logs_dir, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
