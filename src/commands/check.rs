//! Collector connectivity probe
//!
//! Sends a single record the same way `run` does and reports the outcome.

use colored::*;
use eyre::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{Config, Overrides};
use crate::emitter::{self, LogRecord, SystemClock};

pub fn run(overrides: &Overrides, config: &Config) -> Result<()> {
    let mut config = config.clone();
    config.apply_overrides(overrides);

    let endpoint = config.sink.endpoint().context("Invalid sink configuration")?;
    let record = LogRecord::generate(&mut StdRng::from_os_rng(), &SystemClock::new(), &config.emitter.service);

    println!("{} Sending probe record to {}", "→".blue(), endpoint.to_string().cyan());

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    match rt.block_on(emitter::deliver(&record, &endpoint, config.sink.timeouts())) {
        Ok(()) => {
            println!("{} Collector accepted the record", "✓".green());
            Ok(())
        }
        Err(e) => {
            log::warn!("Probe failed: {}", e);
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}
