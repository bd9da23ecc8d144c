//! Emit records until interrupted
//!
//! Records go to stdout. Diagnostics (including delivery failures) go
//! through `log`, which never targets stdout.

use eyre::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Overrides};
use crate::emitter::{Emitter, EmitterConfig, RunSummary, SystemClock};

/// Run the emitter command
pub fn run(overrides: &Overrides, count: Option<u64>, config: &Config) -> Result<()> {
    let emitter_config = resolve(overrides, count, config)?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let summary = rt.block_on(emit(emitter_config))?;

    log::info!(
        "Run finished: {} records, {} delivered, {} failed",
        summary.ticks,
        summary.delivered,
        summary.failed
    );
    Ok(())
}

/// Merge CLI overrides into the loaded config and validate it
fn resolve(overrides: &Overrides, count: Option<u64>, config: &Config) -> Result<EmitterConfig> {
    let mut config = config.clone();
    config.apply_overrides(overrides);

    let emitter_config = config
        .emitter_config()
        .context("Invalid emitter configuration")?
        .with_max_ticks(count);
    Ok(emitter_config)
}

async fn emit(emitter_config: EmitterConfig) -> Result<RunSummary> {
    let cancel = CancellationToken::new();

    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Interrupt received, stopping after current tick");
                on_signal.cancel();
            }
            Err(e) => log::warn!("Could not listen for Ctrl+C: {}", e),
        }
    });

    let sink = emitter_config.tcp_sink();
    let emitter = Emitter::new(emitter_config, sink, io::stdout(), StdRng::from_os_rng(), SystemClock::new());

    emitter.run(cancel).await.context("Emitter stopped")
}
