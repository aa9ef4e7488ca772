// Domain models: metric names, per-metric results, snapshots

use serde::{Deserialize, Serialize};

/// The fixed set of recognized metrics, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    KernelVersion,
    OsDetails,
    User,
    ProcessCount,
    OpenPorts,
    LoadAvg,
    MemAvailableMb,
    DiskUsagePct,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::KernelVersion,
        Metric::OsDetails,
        Metric::User,
        Metric::ProcessCount,
        Metric::OpenPorts,
        Metric::LoadAvg,
        Metric::MemAvailableMb,
        Metric::DiskUsagePct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::KernelVersion => "kernel_version",
            Metric::OsDetails => "os_details",
            Metric::User => "user",
            Metric::ProcessCount => "process_count",
            Metric::OpenPorts => "open_ports",
            Metric::LoadAvg => "load_avg",
            Metric::MemAvailableMb => "mem_available_mb",
            Metric::DiskUsagePct => "disk_usage_pct",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a probe produced no value. Per-metric and never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    /// The facility is absent on this platform.
    #[error("unavailable")]
    Unavailable,
    /// The probe exceeded its per-cycle time bound.
    #[error("timeout")]
    Timeout,
    /// The facility produced output the probe does not understand.
    #[error("parse")]
    Parse,
    /// Insufficient privilege to query the facility.
    #[error("denied")]
    Denied,
}

/// One probe's failure: which metric, what class of fault, and a
/// human-readable reason the display can show as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{metric} probe failed ({kind}): {message}")]
pub struct ProbeFailure {
    pub metric: Metric,
    pub kind: ProbeErrorKind,
    pub message: String,
}

impl ProbeFailure {
    pub fn new(metric: Metric, kind: ProbeErrorKind, message: impl Into<String>) -> Self {
        Self {
            metric,
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(metric: Metric, message: impl Into<String>) -> Self {
        Self::new(metric, ProbeErrorKind::Unavailable, message)
    }

    pub fn timeout(metric: Metric, timeout_secs: u64) -> Self {
        Self::new(
            metric,
            ProbeErrorKind::Timeout,
            format!("probe exceeded {timeout_secs}s bound"),
        )
    }

    pub fn parse(metric: Metric, message: impl Into<String>) -> Self {
        Self::new(metric, ProbeErrorKind::Parse, message)
    }

    pub fn denied(metric: Metric, message: impl Into<String>) -> Self {
        Self::new(metric, ProbeErrorKind::Denied, message)
    }
}

pub type MetricResult<T> = Result<T, ProbeFailure>;

/// 1/5/15-minute load averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAvg {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Tagged view of one metric slot, for display and per-cycle logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricValue {
    Text(String),
    Count(u64),
    Load(LoadAvg),
    Percent(u8),
    Failed(ProbeFailure),
}

impl MetricValue {
    pub fn outcome(&self) -> &'static str {
        match self {
            MetricValue::Failed(f) => match f.kind {
                ProbeErrorKind::Unavailable => "unavailable",
                ProbeErrorKind::Timeout => "timeout",
                ProbeErrorKind::Parse => "parse",
                ProbeErrorKind::Denied => "denied",
            },
            _ => "ok",
        }
    }
}

/// One complete collection cycle. Every recognized metric has a slot,
/// resolved to either a value or a failure; nothing is ever absent.
/// Immutable after construction - the publisher hands it out behind an Arc.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Capture time, Unix millis. 0 for the pre-first-cycle placeholder.
    pub timestamp_ms: u64,
    pub kernel_version: MetricResult<String>,
    pub os_details: MetricResult<String>,
    pub user: MetricResult<String>,
    pub process_count: MetricResult<u64>,
    pub open_ports: MetricResult<u64>,
    pub load_avg: MetricResult<LoadAvg>,
    pub mem_available_mb: MetricResult<u64>,
    pub disk_usage_pct: MetricResult<u8>,
}

impl Snapshot {
    /// The defined empty snapshot returned by `latest()` before the
    /// first cycle publishes.
    pub fn placeholder() -> Self {
        let pending = |metric| ProbeFailure::unavailable(metric, "no cycle completed yet");
        Self {
            timestamp_ms: 0,
            kernel_version: Err(pending(Metric::KernelVersion)),
            os_details: Err(pending(Metric::OsDetails)),
            user: Err(pending(Metric::User)),
            process_count: Err(pending(Metric::ProcessCount)),
            open_ports: Err(pending(Metric::OpenPorts)),
            load_avg: Err(pending(Metric::LoadAvg)),
            mem_available_mb: Err(pending(Metric::MemAvailableMb)),
            disk_usage_pct: Err(pending(Metric::DiskUsagePct)),
        }
    }

    fn value(&self, metric: Metric) -> MetricValue {
        fn tag<T>(r: &MetricResult<T>, ok: impl Fn(&T) -> MetricValue) -> MetricValue {
            match r {
                Ok(v) => ok(v),
                Err(f) => MetricValue::Failed(f.clone()),
            }
        }
        match metric {
            Metric::KernelVersion => tag(&self.kernel_version, |v| MetricValue::Text(v.clone())),
            Metric::OsDetails => tag(&self.os_details, |v| MetricValue::Text(v.clone())),
            Metric::User => tag(&self.user, |v| MetricValue::Text(v.clone())),
            Metric::ProcessCount => tag(&self.process_count, |v| MetricValue::Count(*v)),
            Metric::OpenPorts => tag(&self.open_ports, |v| MetricValue::Count(*v)),
            Metric::LoadAvg => tag(&self.load_avg, |v| MetricValue::Load(*v)),
            Metric::MemAvailableMb => tag(&self.mem_available_mb, |v| MetricValue::Count(*v)),
            Metric::DiskUsagePct => tag(&self.disk_usage_pct, |v| MetricValue::Percent(*v)),
        }
    }

    /// All metric slots in fixed declaration order.
    pub fn metrics(&self) -> impl Iterator<Item = (Metric, MetricValue)> + '_ {
        Metric::ALL.iter().map(|m| (*m, self.value(*m)))
    }

    /// Per-probe outcome summary for the per-cycle log record,
    /// e.g. "kernel_version=ok open_ports=timeout ...".
    pub fn outcome_summary(&self) -> String {
        self.metrics()
            .map(|(m, v)| format!("{}={}", m, v.outcome()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
