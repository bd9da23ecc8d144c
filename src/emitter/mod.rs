//! Synthetic event emitter
//!
//! Every tick fabricates one `LogRecord`, writes it to the local output as a
//! JSON line, then offers the same line to a remote `Sink`. Local output
//! failures stop the loop; remote failures are logged and the loop moves on.

pub mod clock;
pub mod endpoint;
pub mod error;
pub mod record;
pub mod sink;

use rand::Rng;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use clock::{Clock, SystemClock};
pub use endpoint::SinkEndpoint;
pub use error::{ConfigurationError, EmitterError, LocalOutputError};
pub use record::LogRecord;
pub use sink::{DeliveryTimeouts, Sink, TcpSink, deliver};

/// Service name used when none is supplied
pub const DEFAULT_SERVICE: &str = "demo-app";

/// Validated settings for one emitter instance
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    pub service: String,
    pub cadence: Duration,
    pub endpoint: SinkEndpoint,
    pub timeouts: DeliveryTimeouts,
    /// Stop after this many ticks; `None` runs until cancelled
    pub max_ticks: Option<u64>,
}

/// Validate emitter settings
pub fn configure(service_name: &str, cadence_secs: f64, sink_endpoint: &str) -> Result<EmitterConfig, ConfigurationError> {
    let cadence = cadence_from_secs(cadence_secs)?;
    let endpoint: SinkEndpoint = sink_endpoint.parse()?;

    let service = match service_name.trim() {
        "" => {
            log::warn!("No service name configured, using placeholder '{}'", DEFAULT_SERVICE);
            DEFAULT_SERVICE.to_string()
        }
        name => name.to_string(),
    };

    Ok(EmitterConfig {
        service,
        cadence,
        endpoint,
        timeouts: DeliveryTimeouts::default(),
        max_ticks: None,
    })
}

fn cadence_from_secs(secs: f64) -> Result<Duration, ConfigurationError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(cadence) if !cadence.is_zero() => Ok(cadence),
        _ => Err(ConfigurationError::NonPositiveCadence(secs)),
    }
}

impl EmitterConfig {
    /// Override delivery timeouts; connect and write must be non-zero
    pub fn with_timeouts(mut self, timeouts: DeliveryTimeouts) -> Result<Self, ConfigurationError> {
        if timeouts.connect.is_zero() {
            return Err(ConfigurationError::InvalidTimeout { name: "connect" });
        }
        if timeouts.write.is_zero() {
            return Err(ConfigurationError::InvalidTimeout { name: "write" });
        }
        self.timeouts = timeouts;
        Ok(self)
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// TCP sink for this config's endpoint
    pub fn tcp_sink(&self) -> TcpSink {
        TcpSink::new(self.endpoint.clone(), self.timeouts)
    }
}

/// Counters reported when a run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// One emitter instance: owns its sink, output, random source and clock
pub struct Emitter<S, W, R, C> {
    config: EmitterConfig,
    sink: S,
    output: W,
    rng: R,
    clock: C,
}

impl<S, W, R, C> Emitter<S, W, R, C>
where
    S: Sink,
    W: Write,
    R: Rng,
    C: Clock,
{
    pub fn new(config: EmitterConfig, sink: S, output: W, rng: R, clock: C) -> Self {
        Self {
            config,
            sink,
            output,
            rng,
            clock,
        }
    }

    /// Run ticks until cancelled or `max_ticks` is reached
    pub async fn run(mut self, cancel: CancellationToken) -> Result<RunSummary, EmitterError> {
        let mut summary = RunSummary::default();
        log::info!(
            "Emitter '{}' started: sink={} cadence={:?}",
            self.config.service,
            self.sink.endpoint(),
            self.config.cadence
        );

        loop {
            if cancel.is_cancelled() || self.limit_reached(&summary) {
                break;
            }

            self.tick(&mut summary).await?;

            if self.limit_reached(&summary) {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.cadence) => {}
            }
        }

        log::info!(
            "Emitter '{}' stopped: {} ticks, {} delivered, {} failed",
            self.config.service,
            summary.ticks,
            summary.delivered,
            summary.failed
        );
        Ok(summary)
    }

    async fn tick(&mut self, summary: &mut RunSummary) -> Result<(), EmitterError> {
        let record = LogRecord::generate(&mut self.rng, &self.clock, &self.config.service);
        let line = record.to_line()?;

        self.emit_local(&line)?;
        summary.ticks += 1;

        match self.sink.deliver(&line).await {
            Ok(()) => {
                summary.delivered += 1;
                log::debug!("Delivered tick {} to {}", summary.ticks, self.sink.endpoint());
            }
            Err(e) => {
                summary.failed += 1;
                log::warn!("Delivery failed on tick {}: {}", summary.ticks, e);
            }
        }
        Ok(())
    }

    fn emit_local(&mut self, line: &str) -> Result<(), LocalOutputError> {
        writeln!(self.output, "{}", line)?;
        self.output.flush()?;
        Ok(())
    }

    fn limit_reached(&self, summary: &RunSummary) -> bool {
        self.config.max_ticks.is_some_and(|max| summary.ticks >= max)
    }
}
