//! Error types for the emitter
//!
//! Configuration and local-output errors are fatal. Delivery errors are
//! caught inside the loop and only ever reach the diagnostic log.

#![allow(dead_code)] // DeliveryError::endpoint - for callers matching on failures

use std::io;
use thiserror::Error;

/// Invalid emitter settings, raised before the loop starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("cadence interval must be a positive number of seconds, got {0}")]
    NonPositiveCadence(f64),

    #[error("invalid sink endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("sink host is not configured (set sink.host, LOGPULSE_SINK_HOST or --host)")]
    MissingSinkHost,

    #[error("{name} timeout must be greater than zero")]
    InvalidTimeout { name: &'static str },
}

/// Stage of a delivery attempt, used for timeout reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    Connect,
    Write,
}

impl std::fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStage::Connect => write!(f, "connect"),
            DeliveryStage::Write => write!(f, "write"),
        }
    }
}

/// A single failed attempt to ship a line to the sink
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("could not resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("{stage} to {endpoint} timed out after {millis} ms")]
    Timeout {
        endpoint: String,
        stage: DeliveryStage,
        millis: u128,
    },

    #[error("write to {endpoint} failed: {source}")]
    Write {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("{endpoint} closed the connection before the record was written")]
    PeerClosed { endpoint: String },

    #[error("could not encode record for {endpoint}: {source}")]
    Encode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("closing connection to {endpoint} failed: {source}")]
    Close {
        endpoint: String,
        #[source]
        source: io::Error,
    },
}

impl DeliveryError {
    /// The endpoint this attempt targeted
    pub fn endpoint(&self) -> &str {
        match self {
            DeliveryError::Resolve { endpoint, .. }
            | DeliveryError::Connect { endpoint, .. }
            | DeliveryError::Timeout { endpoint, .. }
            | DeliveryError::Write { endpoint, .. }
            | DeliveryError::PeerClosed { endpoint }
            | DeliveryError::Encode { endpoint, .. }
            | DeliveryError::Close { endpoint, .. } => endpoint,
        }
    }
}

/// The local output channel could not be written
#[derive(Error, Debug)]
#[error("failed to write to local output: {0}")]
pub struct LocalOutputError(#[from] pub io::Error);

/// Fatal errors that stop a running emitter
#[derive(Error, Debug)]
pub enum EmitterError {
    #[error(transparent)]
    LocalOutput(#[from] LocalOutputError),

    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}
