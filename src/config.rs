use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::emitter::{self, ConfigurationError, DEFAULT_SERVICE, DeliveryTimeouts, EmitterConfig, SinkEndpoint};

/// Main logpulse configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub log_target: LogTarget,
    pub sink: SinkConfig,
    pub emitter: EmitterSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Where diagnostic logs go; never stdout, which carries the records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Stderr,
    /// ~/.local/share/logpulse/logs/logpulse.log
    File,
}

/// Remote collector settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Collector host; deliberately has no default
    pub host: Option<String>,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub linger_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmitterSettings {
    pub service: String,
    pub interval_secs: f64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        let timeouts = DeliveryTimeouts::default();
        Self {
            host: None,
            port: 5000,
            connect_timeout_ms: timeouts.connect.as_millis() as u64,
            write_timeout_ms: timeouts.write.as_millis() as u64,
            linger_ms: timeouts.linger.as_millis() as u64,
        }
    }
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            interval_secs: 5.0,
        }
    }
}

impl SinkConfig {
    pub fn timeouts(&self) -> DeliveryTimeouts {
        DeliveryTimeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            write: Duration::from_millis(self.write_timeout_ms),
            linger: Duration::from_millis(self.linger_ms),
        }
    }

    /// Validated endpoint; fails when no host was supplied
    pub fn endpoint(&self) -> Result<SinkEndpoint, ConfigurationError> {
        let host = self.host.as_deref().ok_or(ConfigurationError::MissingSinkHost)?;
        SinkEndpoint::new(host, self.port)
    }
}

/// Command-line values that take precedence over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub service: Option<String>,
    pub interval_secs: Option<f64>,
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("LOGPULSE_CONFIG") {
            let path = Self::expand_path(Path::new(&env_path));
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from LOGPULSE_CONFIG: {}", e);
                    }
                }
            }
        }

        let candidates = Self::candidate_paths(std::env::var("LOGPULSE_DIR").ok(), dirs::config_dir());

        for path in candidates {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Config files tried in order after `LOGPULSE_CONFIG`:
    /// `$LOGPULSE_DIR/logpulse.yaml`, `~/.config/logpulse/logpulse.yaml`, `./logpulse.yaml`
    fn candidate_paths(logpulse_dir: Option<String>, config_dir: Option<PathBuf>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = logpulse_dir {
            candidates.push(Self::expand_path(Path::new(&dir)).join("logpulse.yaml"));
        }
        if let Some(config_dir) = config_dir {
            let path = config_dir.join("logpulse").join("logpulse.yaml");
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
        // ./logpulse.yaml (for development)
        candidates.push(PathBuf::from("logpulse.yaml"));
        candidates
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `LOGPULSE_*` variables looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("LOGPULSE_SINK_HOST").filter(|h| !h.trim().is_empty()) {
            self.sink.host = Some(host);
        }
        if let Some(port) = lookup("LOGPULSE_SINK_PORT") {
            self.sink.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid LOGPULSE_SINK_PORT: {}", port))?;
        }
        if let Some(service) = lookup("LOGPULSE_SERVICE") {
            self.emitter.service = service;
        }
        if let Some(interval) = lookup("LOGPULSE_INTERVAL_SECS") {
            self.emitter.interval_secs = interval
                .trim()
                .parse()
                .with_context(|| format!("Invalid LOGPULSE_INTERVAL_SECS: {}", interval))?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(ref host) = overrides.host {
            self.sink.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.sink.port = port;
        }
        if let Some(ref service) = overrides.service {
            self.emitter.service = service.clone();
        }
        if let Some(interval) = overrides.interval_secs {
            self.emitter.interval_secs = interval;
        }
    }

    /// Validate into an emitter config
    pub fn emitter_config(&self) -> Result<EmitterConfig, ConfigurationError> {
        let endpoint = self.sink.endpoint()?;
        emitter::configure(&self.emitter.service, self.emitter.interval_secs, &endpoint.to_string())?
            .with_timeouts(self.sink.timeouts())
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sink.host, None);
        assert_eq!(config.sink.port, 5000);
        assert_eq!(config.emitter.service, "demo-app");
        assert_eq!(config.emitter.interval_secs, 5.0);
        assert_eq!(config.log_target, LogTarget::Stderr);
    }

    #[test]
    fn test_missing_host_is_configuration_error() {
        let config = Config::default();
        assert_eq!(config.emitter_config(), Err(ConfigurationError::MissingSinkHost));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("sink:\n  host: logstash\nemitter:\n  service: checkout-svc\n").unwrap();
        assert_eq!(config.sink.host.as_deref(), Some("logstash"));
        assert_eq!(config.sink.port, 5000);
        assert_eq!(config.emitter.service, "checkout-svc");
        assert_eq!(config.emitter.interval_secs, 5.0);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logpulse.yaml");
        fs::write(&path, "log_level: debug\nsink:\n  host: 10.0.0.5\n  port: 5044\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.sink.endpoint().unwrap().to_string(), "10.0.0.5:5044");
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logpulse.yaml");
        fs::write(&path, "sink: [not, a, map]\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("LOGPULSE_SINK_HOST", "collector"),
                ("LOGPULSE_SINK_PORT", "6000"),
                ("LOGPULSE_SERVICE", "checkout-svc"),
                ("LOGPULSE_INTERVAL_SECS", "0.5"),
            ]))
            .unwrap();

        let emitter = config.emitter_config().unwrap();
        assert_eq!(emitter.endpoint.to_string(), "collector:6000");
        assert_eq!(emitter.service, "checkout-svc");
        assert_eq!(emitter.cadence, Duration::from_millis(500));
    }

    #[test]
    fn test_env_bad_port_fails() {
        let mut config = Config::default();
        assert!(config.apply_env(env(&[("LOGPULSE_SINK_PORT", "nope")])).is_err());
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = Config::default();
        config.apply_env(env(&[("LOGPULSE_SINK_HOST", "from-env")])).unwrap();
        config.apply_overrides(&Overrides {
            host: Some("from-cli".to_string()),
            interval_secs: Some(1.0),
            ..Overrides::default()
        });
        assert_eq!(config.sink.host.as_deref(), Some("from-cli"));
        assert_eq!(config.emitter.interval_secs, 1.0);
    }

    #[test]
    fn test_negative_interval_rejected() {
        let mut config = Config::default();
        config.sink.host = Some("localhost".to_string());
        config.emitter.interval_secs = -2.0;
        assert!(matches!(
            config.emitter_config(),
            Err(ConfigurationError::NonPositiveCadence(_))
        ));
    }

    #[test]
    fn test_timeouts_carried_into_emitter_config() {
        let mut config = Config::default();
        config.sink.host = Some("localhost".to_string());
        config.sink.connect_timeout_ms = 1500;
        config.sink.linger_ms = 0;

        let emitter = config.emitter_config().unwrap();
        assert_eq!(emitter.timeouts.connect, Duration::from_millis(1500));
        assert_eq!(emitter.timeouts.linger, Duration::ZERO);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.sink.host = Some("logstash".to_string());
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_candidate_paths_try_logpulse_dir_then_user_config() {
        let candidates = Config::candidate_paths(Some("/srv/logpulse".to_string()), Some(PathBuf::from("/home/u/.config")));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/srv/logpulse/logpulse.yaml"),
                PathBuf::from("/home/u/.config/logpulse/logpulse.yaml"),
                PathBuf::from("logpulse.yaml"),
            ]
        );
    }

    #[test]
    fn test_candidate_paths_without_logpulse_dir() {
        let candidates = Config::candidate_paths(None, Some(PathBuf::from("/home/u/.config")));
        assert_eq!(
            candidates,
            vec![PathBuf::from("/home/u/.config/logpulse/logpulse.yaml"), PathBuf::from("logpulse.yaml")]
        );
    }

    #[test]
    fn test_candidate_paths_skip_duplicate_dir() {
        let candidates = Config::candidate_paths(Some("/home/u/.config/logpulse".to_string()), Some(PathBuf::from("/home/u/.config")));
        assert_eq!(
            candidates,
            vec![PathBuf::from("/home/u/.config/logpulse/logpulse.yaml"), PathBuf::from("logpulse.yaml")]
        );
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/usr/local/bin");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/usr/local/bin"));
    }
}
