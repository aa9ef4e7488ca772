// One collection cycle: all probes concurrently, each bounded, always a
// full snapshot

use crate::models::{Metric, MetricResult, ProbeFailure, Snapshot};
use crate::probes::ProbeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Runs every probe for one cycle and assembles the result. Probes run
/// concurrently, so cycle latency tracks the slowest single probe (at
/// worst `probe_timeout`), not the sum. A probe that overruns its bound
/// resolves to a `Timeout` failure for that metric only; the snapshot
/// is always constructed in full before being handed to the publisher.
pub struct Assembler {
    probes: Arc<dyn ProbeSet>,
    probe_timeout: Duration,
}

impl Assembler {
    pub fn new(probes: Arc<dyn ProbeSet>, probe_timeout: Duration) -> Self {
        Self {
            probes,
            probe_timeout,
        }
    }

    pub async fn collect(&self) -> Snapshot {
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
                0
            });

        let (
            kernel_version,
            os_details,
            user,
            process_count,
            open_ports,
            load_avg,
            mem_available_mb,
            disk_usage_pct,
        ) = tokio::join!(
            self.bounded(Metric::KernelVersion, self.probes.kernel_version()),
            self.bounded(Metric::OsDetails, self.probes.os_details()),
            self.bounded(Metric::User, self.probes.user()),
            self.bounded(Metric::ProcessCount, self.probes.process_count()),
            self.bounded(Metric::OpenPorts, self.probes.open_ports()),
            self.bounded(Metric::LoadAvg, self.probes.load_avg()),
            self.bounded(Metric::MemAvailableMb, self.probes.mem_available_mb()),
            self.bounded(Metric::DiskUsagePct, self.probes.disk_usage_pct()),
        );

        Snapshot {
            timestamp_ms,
            kernel_version,
            os_details,
            user,
            process_count,
            open_ports,
            load_avg,
            mem_available_mb,
            disk_usage_pct,
        }
    }

    async fn bounded<T>(
        &self,
        metric: Metric,
        probe: impl Future<Output = MetricResult<T>>,
    ) -> MetricResult<T> {
        match tokio::time::timeout(self.probe_timeout, probe).await {
            Ok(result) => result,
            Err(_) => Err(ProbeFailure::timeout(metric, self.probe_timeout.as_secs())),
        }
    }
}
