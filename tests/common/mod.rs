// Deterministic probes for engine tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;
use sysaudit::models::{LoadAvg, MetricResult, ProbeFailure};
use sysaudit::probes::ProbeSet;

/// Probe set with canned answers. Every metric succeeds by default;
/// `disk` can be forced to fail, `hang_open_ports` makes that probe
/// never return, and `probe_delay` slows every probe (virtual time).
/// The load average counts cycles: cycle k reports `one = k as f64`.
pub struct FakeProbes {
    pub disk: Mutex<MetricResult<u8>>,
    pub probe_delay: Option<Duration>,
    pub hang_open_ports: bool,
    load_calls: AtomicU64,
    active: AtomicI64,
    max_active: AtomicI64,
}

impl Default for FakeProbes {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProbes {
    pub fn new() -> Self {
        Self {
            disk: Mutex::new(Ok(45)),
            probe_delay: None,
            hang_open_ports: false,
            load_calls: AtomicU64::new(0),
            active: AtomicI64::new(0),
            max_active: AtomicI64::new(0),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            probe_delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn fail_disk(failure: ProbeFailure) -> Self {
        let probes = Self::new();
        *probes.disk.lock().unwrap() = Err(failure);
        probes
    }

    /// Highest number of probes ever in flight at once. Non-overlapping
    /// cycles keep this at or below the probe count (8).
    pub fn max_in_flight(&self) -> i64 {
        self.max_active.load(Ordering::Relaxed)
    }

    async fn observe<T>(&self, value: MetricResult<T>) -> MetricResult<T> {
        let now = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        self.max_active.fetch_max(now, Ordering::Relaxed);
        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::Relaxed);
        value
    }
}

#[async_trait]
impl ProbeSet for FakeProbes {
    async fn kernel_version(&self) -> MetricResult<String> {
        self.observe(Ok("6.8.0-fake".into())).await
    }

    async fn os_details(&self) -> MetricResult<String> {
        self.observe(Ok("FakeOS 1.0".into())).await
    }

    async fn user(&self) -> MetricResult<String> {
        self.observe(Ok("auditor".into())).await
    }

    async fn process_count(&self) -> MetricResult<u64> {
        self.observe(Ok(123)).await
    }

    async fn open_ports(&self) -> MetricResult<u64> {
        if self.hang_open_ports {
            std::future::pending::<()>().await;
        }
        self.observe(Ok(7)).await
    }

    async fn load_avg(&self) -> MetricResult<LoadAvg> {
        let cycle = self.load_calls.fetch_add(1, Ordering::Relaxed) + 1;
        self.observe(Ok(LoadAvg {
            one: cycle as f64,
            five: 0.5,
            fifteen: 0.25,
        }))
        .await
    }

    async fn mem_available_mb(&self) -> MetricResult<u64> {
        self.observe(Ok(8924)).await
    }

    async fn disk_usage_pct(&self) -> MetricResult<u8> {
        let result = self.disk.lock().unwrap().clone();
        self.observe(result).await
    }
}
