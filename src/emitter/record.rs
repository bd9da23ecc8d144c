//! Synthetic log records and their JSON line form
//!
//! Wire format, one object per line:
//! `{"@timestamp":"2026-01-03T12:00:00.000000Z","level":"INFO","service":"demo-app","message":"User login success"}`

#![allow(dead_code)] // action() - used when reading records back

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::clock::Clock;

/// Severity of a synthetic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Error,
}

impl Level {
    pub const ALL: [Level; 2] = [Level::Info, Level::Error];

    /// Outcome word used in the message
    pub fn outcome(self) -> &'static str {
        match self {
            Level::Error => "failed",
            Level::Info => "success",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User action the message describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Login,
    Upload,
    Download,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Login, Action::Upload, Action::Download];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::Upload => "upload",
            Action::Download => "download",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the message text; the outcome depends only on the level
pub fn compose_message(action: Action, level: Level) -> String {
    format!("User {} {}", action, level.outcome())
}

/// One synthetic log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(rename = "@timestamp", with = "wire_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub service: String,
    pub message: String,
}

impl LogRecord {
    /// Generate a fresh record with a uniformly chosen level and action
    pub fn generate<R, C>(rng: &mut R, clock: &C, service: &str) -> Self
    where
        R: Rng,
        C: Clock + ?Sized,
    {
        let level = Level::ALL[rng.random_range(0..Level::ALL.len())];
        let action = Action::ALL[rng.random_range(0..Action::ALL.len())];

        Self {
            timestamp: clock.now(),
            level,
            service: service.to_string(),
            message: compose_message(action, level),
        }
    }

    /// Recover the action named in the message
    pub fn action(&self) -> Option<Action> {
        self.message
            .split_whitespace()
            .nth(1)
            .and_then(|word| Action::ALL.into_iter().find(|a| a.as_str() == word))
    }

    /// Serialize to the canonical JSON line (without the newline)
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a JSON line produced by `to_line`
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end_matches(['\r', '\n']))
    }
}

mod wire_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
