//! Test helpers: a scripted clamd stand-in and a router wired to it.
//!
//! Run from workspace root: `cargo test -p warden-api`.

pub mod fixtures;

use axum_test::TestServer;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use warden_api::setup::routes;
use warden_api::state::AppState;
use warden_core::Config;

/// Fake clamd on 127.0.0.1: answers PING with PONG and every SCAN with `scan_reply`,
/// one connection per command, recording each command it receives and the permission bits
/// of every file it is asked to scan.
pub struct FakeClamd {
    pub port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    modes: Arc<Mutex<Vec<u32>>>,
    handle: JoinHandle<()>,
}

impl FakeClamd {
    pub async fn start(scan_reply: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let modes = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let seen_modes = modes.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let recorded = recorded.clone();
                let seen_modes = seen_modes.clone();
                tokio::spawn(async move {
                    let command = read_command(&mut socket).await;
                    if let Some(path) = command.strip_prefix("SCAN ") {
                        if let Some(mode) = file_mode(path) {
                            seen_modes.lock().unwrap().push(mode);
                        }
                    }
                    let reply: &[u8] = if command.contains("PING") {
                        b"PONG\0"
                    } else {
                        scan_reply.as_bytes()
                    };
                    recorded.lock().unwrap().push(command);
                    let _ = socket.write_all(reply).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            port,
            requests,
            modes,
            handle,
        }
    }

    /// SCAN commands received so far, without the trailing newline.
    pub fn scan_requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("SCAN "))
            .cloned()
            .collect()
    }
}

impl FakeClamd {
    /// Permission bits of each scanned file, as seen when the SCAN command arrived.
    pub fn scanned_file_modes(&self) -> Vec<u32> {
        self.modes.lock().unwrap().clone()
    }
}

#[cfg(unix)]
fn file_mode(path: &str) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .ok()
        .map(|meta| meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn file_mode(_path: &str) -> Option<u32> {
    None
}

impl Drop for FakeClamd {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read_command(socket: &mut tokio::net::TcpStream) -> String {
    let mut command = Vec::new();
    let mut byte = [0u8; 1];
    while let Ok(1) = socket.read(&mut byte).await {
        if byte[0] == b'\n' || byte[0] == 0 {
            break;
        }
        command.push(byte[0]);
    }
    String::from_utf8_lossy(&command).to_string()
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn test_config(clamav_port: u16) -> Config {
    let mut config = Config::default();
    config.scan.clamav_host = "127.0.0.1".to_string();
    config.scan.clamav_port = clamav_port;
    config.scan.clamav_timeout_secs = 5;
    config
}

pub fn test_server(config: Config) -> TestServer {
    let state = Arc::new(AppState::new(config.clone()));
    let app = routes::setup_routes(&config, state);
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}
