//! Webserver state management

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Runtime state shared by all handlers
#[derive(Debug)]
pub struct WebServerState {
    pub bind_address: SocketAddr,
    pub cors_allow_origins: Vec<String>,
    pub is_running: AtomicBool,
    pub requests_served: AtomicU64,
    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(bind_address: SocketAddr, cors_allow_origins: Vec<String>) -> Self {
        Self {
            bind_address,
            cors_allow_origins,
            is_running: AtomicBool::new(true),
            requests_served: AtomicU64::new(0),
            server_start_time: Instant::now(),
        }
    }

    pub fn set_running(&self, running: bool) {
        self.is_running.store(running, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Count a handled API request, returning the new total
    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    /// Whether every origin is allowed
    pub fn cors_is_permissive(&self) -> bool {
        self.cors_allow_origins.is_empty() || self.cors_allow_origins.iter().any(|o| o == "*")
    }
}
