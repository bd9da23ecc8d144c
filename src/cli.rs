use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::config::Overrides;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Yaml
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Yaml
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "logpulse",
    about = "Synthetic log emitter that ships JSON lines to a TCP log collector",
    version,
    after_help = "Records go to stdout; diagnostics go to stderr (or ~/.local/share/logpulse/logs/logpulse.log)"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to logpulse.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose (debug) diagnostics")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Only log errors on the diagnostic channel")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Sink address flags shared by `run` and `check`
#[derive(Args, Debug, Clone, Default)]
pub struct SinkArgs {
    /// Collector host (overrides sink.host / LOGPULSE_SINK_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Collector port (overrides sink.port / LOGPULSE_SINK_PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit records until interrupted
    Run {
        #[command(flatten)]
        sink: SinkArgs,

        /// Service name stamped on every record
        #[arg(long)]
        service: Option<String>,

        /// Seconds between records
        #[arg(long)]
        interval: Option<f64>,

        /// Stop after this many records
        #[arg(long)]
        count: Option<u64>,
    },

    /// Send one probe record to the collector
    Check {
        #[command(flatten)]
        sink: SinkArgs,
    },

    /// Print records to stdout without contacting a collector
    Sample {
        /// Number of records
        #[arg(long, short = 'n', default_value_t = 10)]
        count: u64,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Service name stamped on every record
        #[arg(long)]
        service: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show effective configuration
    Show {
        /// Output format (default: text for TTY, yaml for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

impl SinkArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            ..Overrides::default()
        }
    }
}
