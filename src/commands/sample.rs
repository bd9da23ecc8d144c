//! Print records without contacting a collector

use eyre::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};

use crate::config::Config;
use crate::emitter::{Clock, LogRecord, SystemClock};

pub fn run(count: u64, seed: Option<u64>, service: Option<&str>, config: &Config) -> Result<()> {
    let service = service.unwrap_or(&config.emitter.service);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let stdout = io::stdout();
    write_samples(&mut stdout.lock(), count, &mut rng, &SystemClock::new(), service)
}

fn write_samples<W: Write, R: Rng, C: Clock>(out: &mut W, count: u64, rng: &mut R, clock: &C, service: &str) -> Result<()> {
    for _ in 0..count {
        let record = LogRecord::generate(rng, clock, service);
        writeln!(out, "{}", record.to_line()?).context("Failed to write to stdout")?;
    }
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}
