#![allow(dead_code)]

use netcat_part::common::{ListenRequest, NcError, Settings};
use netcat_part::receive::{self, ReceiveReport};
use netcat_part::transfer::ProgressTracker;
use std::net::SocketAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const CHUNK_SIZE: usize = 1024;
pub const FOX: &[u8] = b"the quick brown fox\n";

pub fn default_settings() -> Settings {
    Settings {
        chunk_size: CHUNK_SIZE,
        ..Settings::default()
    }
}

pub fn setup_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

pub fn loopback_listener() -> TcpListener {
    receive::bind_and_listen("127.0.0.1:0".parse().unwrap(), 5).expect("Failed to bind loopback")
}

/// Serve one client on `listener` in the background, writing to `dest`
pub fn spawn_server(
    listener: TcpListener,
    dest: PathBuf,
    settings: Settings,
) -> (SocketAddr, JoinHandle<Result<ReceiveReport, NcError>>) {
    let addr = listener.local_addr().expect("listener has no local address");
    let handle = tokio::spawn(async move {
        let request = ListenRequest { dest };
        let mut progress = ProgressTracker::new("test-server", false);
        receive::serve_one(listener, &request, &settings, &mut progress).await
    });
    (addr, handle)
}

/// File of `len` bytes with a repeating, position-dependent pattern
pub fn patterned_file(dir: &TempDir, name: &str, len: usize) -> (PathBuf, Vec<u8>) {
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    let path = dir.path().join(name);
    std::fs::write(&path, &data).expect("Failed to write fixture");
    (path, data)
}
