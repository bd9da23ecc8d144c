//! Remote sinks for shipped log lines
//!
//! `TcpSink` opens a fresh connection for every line: connect, write the
//! line plus `\n`, half-close, then give the collector a short linger
//! window to close its side. Every stage is bounded by a timeout.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;

use super::endpoint::SinkEndpoint;
use super::error::{DeliveryError, DeliveryStage};
use super::record::LogRecord;

/// Where each line goes after it has been written locally
pub trait Sink {
    /// Human-readable target, used in diagnostics
    fn endpoint(&self) -> String;

    /// Ship one serialized record (without trailing newline)
    fn deliver(&mut self, line: &str) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Bounds on each stage of a delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryTimeouts {
    pub connect: Duration,
    pub write: Duration,
    /// How long to wait for the collector to close after our half-close.
    /// Expiry is not an error.
    pub linger: Duration,
}

impl Default for DeliveryTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(3),
            write: Duration::from_secs(3),
            linger: Duration::from_millis(250),
        }
    }
}

/// Newline-delimited JSON over TCP, one connection per line
#[derive(Debug, Clone)]
pub struct TcpSink {
    endpoint: SinkEndpoint,
    timeouts: DeliveryTimeouts,
}

impl TcpSink {
    pub fn new(endpoint: SinkEndpoint, timeouts: DeliveryTimeouts) -> Self {
        Self { endpoint, timeouts }
    }

    async fn connect(&self) -> Result<TcpStream, DeliveryError> {
        let endpoint = self.endpoint.to_string();
        let addrs: Vec<SocketAddr> = lookup_host(self.endpoint.connect_addr())
            .await
            .map_err(|source| DeliveryError::Resolve {
                endpoint: endpoint.clone(),
                source,
            })?
            .collect();

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    log::debug!("connect to {} ({}) failed: {}", endpoint, addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(DeliveryError::Connect {
            endpoint,
            source: last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses resolved")),
        })
    }

    async fn send(&self, line: &str) -> Result<(), DeliveryError> {
        let endpoint = self.endpoint.to_string();

        let mut stream = bounded(&endpoint, DeliveryStage::Connect, self.timeouts.connect, self.connect()).await?;

        // A collector that accepted and already hung up would silently drop the line
        let mut probe = [0u8; 1];
        match stream.try_read(&mut probe) {
            Ok(0) => return Err(DeliveryError::PeerClosed { endpoint }),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(source) => return Err(DeliveryError::Connect { endpoint, source }),
        }

        let mut payload = Vec::with_capacity(line.len() + 1);
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');

        let write = async {
            stream.write_all(&payload).await?;
            stream.flush().await
        };
        let write = async {
            write.await.map_err(|source| DeliveryError::Write {
                endpoint: endpoint.clone(),
                source,
            })
        };
        bounded(&endpoint, DeliveryStage::Write, self.timeouts.write, write).await?;

        stream.shutdown().await.map_err(|source| DeliveryError::Close {
            endpoint: endpoint.clone(),
            source,
        })?;

        let drain = async {
            let mut buf = [0u8; 512];
            loop {
                if stream.read(&mut buf).await? == 0 {
                    return Ok::<(), io::Error>(());
                }
            }
        };
        match timeout(self.timeouts.linger, drain).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DeliveryError::Close { endpoint, source }),
            Err(_) => {
                log::trace!("{} kept the connection open past linger, dropping it", endpoint);
                Ok(())
            }
        }
    }
}

/// Run one delivery stage, turning an elapsed `limit` into `DeliveryError::Timeout`
async fn bounded<T, F>(endpoint: &str, stage: DeliveryStage, limit: Duration, stage_future: F) -> Result<T, DeliveryError>
where
    F: Future<Output = Result<T, DeliveryError>>,
{
    timeout(limit, stage_future).await.map_err(|_| DeliveryError::Timeout {
        endpoint: endpoint.to_string(),
        stage,
        millis: limit.as_millis(),
    })?
}

impl Sink for TcpSink {
    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }

    fn deliver(&mut self, line: &str) -> impl Future<Output = Result<(), DeliveryError>> + Send {
        self.send(line)
    }
}

/// Ship a single record to `endpoint` over a new connection
pub async fn deliver(
    record: &LogRecord,
    endpoint: &SinkEndpoint,
    timeouts: DeliveryTimeouts,
) -> Result<(), DeliveryError> {
    let line = record.to_line().map_err(|source| DeliveryError::Encode {
        endpoint: endpoint.to_string(),
        source,
    })?;
    TcpSink::new(endpoint.clone(), timeouts).send(&line).await
}
