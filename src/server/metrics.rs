//! Request counters and host-load sampling for the health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use sysinfo::System;

use crate::common::types::{RequestCounters, SystemLoadSnapshot};

/// Lock-free per-request counters shared across handler tasks.
///
/// Processing time is tracked as an exponential moving average so a single
/// slow inference does not dominate the reported figure.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    // EMA stored in microseconds to keep sub-millisecond resolution in a u64
    avg_processing_us: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, processing_ms: f64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.update_processing_time(processing_ms);
    }

    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn update_processing_time(&self, new_ms: f64) {
        let current = self.avg_processing_us.load(Ordering::Relaxed) as f64;
        let updated = if current == 0.0 {
            new_ms * 1000.0
        } else {
            current * 0.9 + new_ms * 1000.0 * 0.1
        };
        self.avg_processing_us
            .store(updated as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RequestCounters {
        RequestCounters {
            total: self.total_requests.load(Ordering::Relaxed),
            succeeded: self.successful_requests.load(Ordering::Relaxed),
            failed: self.failed_requests.load(Ordering::Relaxed),
            avg_processing_ms: self.avg_processing_us.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Samples host CPU and memory usage via `sysinfo`.
///
/// The `System` handle is kept alive between samples so CPU usage is measured
/// as a delta rather than starting from zero on every health check.
pub struct SystemProbe {
    system: Mutex<System>,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    pub fn sample(&self) -> SystemLoadSnapshot {
        let mut system = self.system.lock().expect("system probe lock poisoned");
        system.refresh_memory();
        system.refresh_cpu_usage();
        SystemLoadSnapshot {
            cpu_usage_percent: system.global_cpu_usage(),
            memory_used_mb: system.used_memory() / (1024 * 1024),
            memory_total_mb: system.total_memory() / (1024 * 1024),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_successes_and_failures() {
        let metrics = ServiceMetrics::new();
        metrics.record_success(10.0);
        metrics.record_success(20.0);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.succeeded, 2);
        assert_eq!(snapshot.failed, 1);
        assert!(snapshot.avg_processing_ms > 0.0);
    }

    #[test]
    fn processing_average_moves_toward_new_samples() {
        let metrics = ServiceMetrics::new();
        metrics.record_success(100.0);
        let first = metrics.snapshot().avg_processing_ms;
        metrics.record_success(0.0);
        let second = metrics.snapshot().avg_processing_ms;
        assert!(second < first);
    }

    #[test]
    fn probe_reports_nonzero_total_memory() {
        let probe = SystemProbe::new();
        let sample = probe.sample();
        assert!(sample.memory_total_mb > 0);
    }
}
