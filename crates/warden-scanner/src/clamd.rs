//! clamd client
//!
//! One scan is one connection: connect, send `SCAN <absolute-path>\n`, read a single response
//! line, close. The daemon reads the file itself, so it must see the same filesystem path as
//! this process. Nothing is retried here.

use async_trait::async_trait;
use clamav_client::tokio::Tcp;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use warden_core::{ScanConfig, ScanError, ScanVerdict};

/// Upper bound on a single daemon response.
pub const MAX_RESPONSE_BYTES: usize = 1024;

/// Anything that can turn a file path into a malware verdict.
#[async_trait]
pub trait MalwareScanner: Send + Sync {
    async fn scan_path(&self, path: &Path) -> ScanVerdict;
}

#[derive(Clone, Debug)]
pub struct ClamdClient {
    host: String,
    port: u16,
    /// Budget for connect + send + read of one exchange
    timeout: Duration,
}

impl ClamdClient {
    /// Create with a custom timeout (for large files or slow daemons).
    pub fn with_timeout(host: String, port: u16, timeout_secs: u64) -> Self {
        Self {
            host,
            port,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::with_timeout(
            config.clamav_host.clone(),
            config.clamav_port,
            config.clamav_timeout_secs,
        )
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Scan `path` and classify the daemon's answer. Never fails: every fault becomes
    /// [`ScanVerdict::Error`].
    pub async fn scan(&self, path: &Path) -> ScanVerdict {
        let start = Instant::now();
        tracing::debug!(host = %self.host, port = %self.port, path = %path.display(), "Starting clamd scan");

        let result = match tokio::time::timeout(self.timeout, self.scan_inner(path)).await {
            Ok(result) => result,
            Err(_) => Err(ScanError::Transport(format!(
                "timed out after {} seconds",
                self.timeout.as_secs_f64()
            ))),
        };

        let duration_ms = start.elapsed().as_millis();
        match result {
            Ok(ScanVerdict::Clean) => {
                tracing::info!(duration_ms, "File scan completed: clean");
                ScanVerdict::Clean
            }
            Ok(ScanVerdict::Infected { signature }) => {
                tracing::warn!(duration_ms, virus = %signature, "File scan detected virus");
                ScanVerdict::Infected { signature }
            }
            Ok(ScanVerdict::Error { message }) => {
                tracing::error!(duration_ms, error = %message, "clamd reported a scan error");
                ScanVerdict::Error { message }
            }
            Err(e) => {
                tracing::error!(duration_ms, error = %e, "clamd scan failed");
                ScanVerdict::error(e.to_string())
            }
        }
    }

    async fn scan_inner(&self, path: &Path) -> Result<ScanVerdict, ScanError> {
        let absolute = absolute_path(path).await?;
        let command = scan_command(&absolute)?;
        let response = self.exchange(command.as_bytes()).await?;
        parse_scan_response(&response)
    }

    /// Send one command and read one response; the stream is dropped (closed) on return.
    async fn exchange(&self, command: &[u8]) -> Result<Vec<u8>, ScanError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| ScanError::Transport(format!("connect to {}: {}", self.address(), e)))?;
        stream
            .write_all(command)
            .await
            .map_err(|e| ScanError::Transport(format!("send: {}", e)))?;
        read_response(&mut stream).await
    }

    /// Liveness probe used by the health endpoint. The async client is dropped with its
    /// socket when the timeout fires, so a blackholed daemon leaves nothing running.
    pub async fn ping(&self) -> Result<(), ScanError> {
        let address = self.address();
        let connection = Tcp {
            host_address: address.as_str(),
        };

        let reply = tokio::time::timeout(self.timeout, clamav_client::tokio::ping(connection)).await;
        let response = match reply {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ScanError::Transport(e.to_string())),
            Err(_) => {
                return Err(ScanError::Transport(format!(
                    "timed out after {} seconds",
                    self.timeout.as_secs_f64()
                )))
            }
        };

        if response == clamav_client::PONG {
            Ok(())
        } else {
            Err(ScanError::Protocol(format!(
                "unexpected PING reply: {}",
                String::from_utf8_lossy(&response).trim_end_matches('\0').trim()
            )))
        }
    }
}

#[async_trait]
impl MalwareScanner for ClamdClient {
    async fn scan_path(&self, path: &Path) -> ScanVerdict {
        self.scan(path).await
    }
}

async fn absolute_path(path: &Path) -> Result<PathBuf, ScanError> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| ScanError::io(path, e))
}

fn scan_command(path: &Path) -> Result<String, ScanError> {
    let path = path
        .to_str()
        .ok_or_else(|| ScanError::Protocol("path is not valid UTF-8".to_string()))?;
    if path.contains(['\n', '\r', '\0']) {
        return Err(ScanError::Protocol(
            "path contains a line break or NUL and cannot be sent".to_string(),
        ));
    }
    Ok(format!("SCAN {}\n", path))
}

/// Read until newline, NUL or EOF, refusing anything larger than [`MAX_RESPONSE_BYTES`].
async fn read_response<R>(reader: &mut R) -> Result<Vec<u8>, ScanError>
where
    R: AsyncRead + Unpin,
{
    let mut response = Vec::with_capacity(128);
    let mut chunk = [0u8; 256];
    loop {
        let read = reader
            .read(&mut chunk)
            .await
            .map_err(|e| ScanError::Transport(format!("read: {}", e)))?;
        if read == 0 {
            break;
        }
        response.extend_from_slice(&chunk[..read]);
        if response.len() > MAX_RESPONSE_BYTES {
            return Err(ScanError::Protocol(format!(
                "response exceeds {} bytes",
                MAX_RESPONSE_BYTES
            )));
        }
        if chunk[..read].iter().any(|b| *b == b'\n' || *b == 0) {
            break;
        }
    }
    Ok(response)
}

/// Classify one clamd reply of the form `<subject>: <status>`.
///
/// The status is split off at the last `": "` so that colons inside the scanned path do not
/// matter, and it is then matched exactly:
/// * `OK` is clean
/// * `<signature> FOUND` is infected
/// * `<message> ERROR` is a daemon-side error
///
/// Anything else is a protocol error. A reply is never read as clean unless the status is
/// exactly `OK`.
pub fn parse_scan_response(raw: &[u8]) -> Result<ScanVerdict, ScanError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| ScanError::Protocol("response is not valid UTF-8".to_string()))?;
    let line = text.trim_end_matches(['\0', '\n', '\r']).trim();

    if line.is_empty() {
        return Err(ScanError::Protocol("empty response".to_string()));
    }
    if line.contains(['\n', '\r', '\0']) {
        return Err(ScanError::Protocol(format!(
            "expected a single line, got {:?}",
            line
        )));
    }

    let (_subject, status) = line
        .rsplit_once(": ")
        .ok_or_else(|| ScanError::Protocol(format!("missing status field in {:?}", line)))?;
    let status = status.trim();

    if status == "OK" {
        return Ok(ScanVerdict::Clean);
    }

    if let Some(signature) = status.strip_suffix(" FOUND") {
        let signature = signature.trim();
        if signature.is_empty() || signature.contains(char::is_whitespace) {
            return Err(ScanError::Protocol(format!(
                "malformed signature in {:?}",
                line
            )));
        }
        return Ok(ScanVerdict::infected(signature));
    }

    if let Some(message) = status.strip_suffix(" ERROR") {
        return Ok(ScanVerdict::error(format!("clamd: {}", message.trim())));
    }

    Err(ScanError::Protocol(format!("unrecognized status in {:?}", line)))
}
