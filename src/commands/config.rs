use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "logpulse configuration".bold());
            println!();

            println!("{}:", "sink".cyan());
            match config.sink.host {
                Some(ref host) => println!("  host: {}", host),
                None => println!("  host: {}", "(not set)".red()),
            }
            println!("  port: {}", config.sink.port);
            println!("  connect_timeout_ms: {}", config.sink.connect_timeout_ms);
            println!("  write_timeout_ms: {}", config.sink.write_timeout_ms);
            println!("  linger_ms: {}", config.sink.linger_ms);
            println!();

            println!("{}:", "emitter".cyan());
            println!("  service: {}", config.emitter.service);
            println!("  interval_secs: {}", config.emitter.interval_secs);
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            println!("log_target: {:?}", config.log_target);
        }
    }

    Ok(())
}
