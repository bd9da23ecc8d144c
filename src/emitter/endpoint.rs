//! Sink address parsing
//!
//! Accepts `host:port` and `[v6-address]:port`. Nothing is resolved here:
//! DNS lookups happen per delivery attempt so a collector that comes up
//! later is picked up without a restart.

#![allow(dead_code)] // host/port accessors

use lazy_regex::regex_is_match;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use super::error::ConfigurationError;

/// A validated collector address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SinkEndpoint {
    host: String,
    port: u16,
}

impl SinkEndpoint {
    /// Build from separate host and port values
    pub fn new(host: &str, port: u16) -> Result<Self, ConfigurationError> {
        let host = host.trim();
        let invalid = |reason: &str| ConfigurationError::InvalidEndpoint {
            endpoint: format!("{}:{}", host, port),
            reason: reason.to_string(),
        };

        if host.is_empty() {
            return Err(ConfigurationError::MissingSinkHost);
        }
        if port == 0 {
            return Err(invalid("port must be between 1 and 65535"));
        }

        let bare = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')).unwrap_or(host);
        if !is_valid_host(bare) {
            return Err(invalid("host is neither an IP address nor a valid hostname"));
        }

        Ok(Self {
            host: bare.to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address string suitable for `TcpStream::connect`
    pub fn connect_addr(&self) -> String {
        self.to_string()
    }
}

fn is_valid_host(host: &str) -> bool {
    if host.parse::<Ipv4Addr>().is_ok() || host.parse::<Ipv6Addr>().is_ok() {
        return true;
    }
    host.len() <= 253
        && host
            .split('.')
            .all(|label| regex_is_match!(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$", label))
}

impl FromStr for SinkEndpoint {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ConfigurationError::InvalidEndpoint {
            endpoint: s.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| invalid("unterminated '[' in address"))?;
            let port = tail.strip_prefix(':').ok_or_else(|| invalid("missing port"))?;
            (host, port)
        } else {
            let (host, port) = s.rsplit_once(':').ok_or_else(|| invalid("expected host:port"))?;
            if host.contains(':') {
                return Err(invalid("IPv6 addresses must be written as [addr]:port"));
            }
            (host, port)
        };

        let port: u16 = port.parse().map_err(|_| invalid("port is not a number between 1 and 65535"))?;
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        Self::new(host, port)
    }
}

impl fmt::Display for SinkEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hostname() {
        let ep: SinkEndpoint = "logstash.internal:5000".parse().unwrap();
        assert_eq!(ep.host(), "logstash.internal");
        assert_eq!(ep.port(), 5000);
        assert_eq!(ep.to_string(), "logstash.internal:5000");
    }

    #[test]
    fn test_parse_ipv4_and_ipv6() {
        let v4: SinkEndpoint = "10.0.0.7:5044".parse().unwrap();
        assert_eq!(v4.host(), "10.0.0.7");

        let v6: SinkEndpoint = "[::1]:5000".parse().unwrap();
        assert_eq!(v6.host(), "::1");
        assert_eq!(v6.to_string(), "[::1]:5000");
    }

    #[test]
    fn test_reject_malformed() {
        for bad in ["", "localhost", "localhost:", ":5000", "host:0", "host:70000", "host:abc", "::1:5000", "[::1]5000", "bad_host:5000", "-lead.example:5000"] {
            assert!(bad.parse::<SinkEndpoint>().is_err(), "expected '{}' to be rejected", bad);
        }
    }

    #[test]
    fn test_new_requires_host() {
        assert_eq!(SinkEndpoint::new("  ", 5000), Err(ConfigurationError::MissingSinkHost));
    }

    #[test]
    fn test_new_accepts_bracketed_v6() {
        let ep = SinkEndpoint::new("[fe80::1]", 5000).unwrap();
        assert_eq!(ep.host(), "fe80::1");
    }
}
