use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;
mod emitter;

use cli::{Cli, Commands};
use config::{Config, LogLevel, LogTarget};

fn setup_logging(log_level: LogLevel, target: LogTarget) -> Result<()> {
    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(match log_level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        });
    }

    // stdout carries the records, so diagnostics never go there
    let destination = match target {
        LogTarget::Stderr => {
            builder.target(env_logger::Target::Stderr);
            "stderr".to_string()
        }
        LogTarget::File => {
            let log_dir = dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("logpulse")
                .join("logs");

            fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

            let log_file = log_dir.join("logpulse.log");
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .context("Failed to open log file")?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            log_file.display().to_string()
        }
    };

    builder.init();

    info!("Logging initialized, writing to: {}", destination);
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Run {
            sink,
            service,
            interval,
            count,
        } => {
            let mut overrides = sink.overrides();
            overrides.service = service;
            overrides.interval_secs = interval;
            commands::run::run(&overrides, count, &config)
        }
        Commands::Check { sink } => commands::check::run(&sink.overrides(), &config),
        Commands::Sample { count, seed, service } => commands::sample::run(count, seed, service.as_deref(), &config),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else if cli.quiet {
        LogLevel::Error
    } else {
        config.log_level
    };
    setup_logging(log_level, config.log_target).context("Failed to setup logging")?;

    info!("Starting logpulse with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
