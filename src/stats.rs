use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

#[derive(Debug, Default)]
pub struct ShieldStats {
    pub intercepted: AtomicU64,
    pub allowed: AtomicU64,
    pub replaced: AtomicU64,
    pub total_requests: AtomicU64,
    pub commands_intercepted: AtomicU64,
    pub files_substituted: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub intercepted: u64,
    pub allowed: u64,
    pub replaced: u64,
    pub total_requests: u64,
    pub commands_intercepted: u64,
    pub files_substituted: u64,
}

impl ShieldStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn request_seen(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_intercepted(&self) {
        self.intercepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_replaced(&self) {
        self.replaced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_intercepted(&self) {
        self.commands_intercepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_substituted(&self) {
        self.files_substituted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            intercepted: self.intercepted.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            replaced: self.replaced.load(Ordering::Relaxed),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            commands_intercepted: self.commands_intercepted.load(Ordering::Relaxed),
            files_substituted: self.files_substituted.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let s = self.snapshot();
        info!(
            target: "shield",
            total = s.total_requests,
            allowed = s.allowed,
            intercepted = s.intercepted,
            replaced = s.replaced,
            commands = s.commands_intercepted,
            files = s.files_substituted,
            "shield stats"
        );
    }
}
