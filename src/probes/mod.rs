// Metric acquisition via sysinfo and platform tools

pub mod parse;

use crate::models::{LoadAvg, Metric, MetricResult, ProbeFailure};
use async_trait::async_trait;
use std::sync::Arc;
use sysinfo::{ProcessesToUpdate, System};
use tokio::process::Command;

/// One acquisition method per recognized metric. Implementations never
/// panic into the assembler; every fault comes back as a `ProbeFailure`.
/// Methods hold no shared mutable state across each other, so the
/// assembler is free to run them concurrently within a cycle.
#[async_trait]
pub trait ProbeSet: Send + Sync {
    async fn kernel_version(&self) -> MetricResult<String>;
    async fn os_details(&self) -> MetricResult<String>;
    async fn user(&self) -> MetricResult<String>;
    async fn process_count(&self) -> MetricResult<u64>;
    async fn open_ports(&self) -> MetricResult<u64>;
    async fn load_avg(&self) -> MetricResult<LoadAvg>;
    async fn mem_available_mb(&self) -> MetricResult<u64>;
    async fn disk_usage_pct(&self) -> MetricResult<u8>;
}

/// Production probes: sysinfo for kernel/OS/processes/load, external
/// tools (`ss`/`netstat`, `free`, `df`) for the rest.
pub struct SystemProbes {
    sys: Arc<std::sync::Mutex<System>>,
}

impl Default for SystemProbes {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbes {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys: Arc::new(std::sync::Mutex::new(sys)),
        }
    }
}

/// Runs an external tool and captures stdout. Spawn and exit faults map
/// onto the per-metric taxonomy; the caller owns output parsing.
/// `kill_on_drop` so a tool abandoned by the per-probe timeout does not
/// outlive its cycle and pile up across cycles.
pub async fn run_tool(metric: Metric, program: &str, args: &[&str]) -> MetricResult<String> {
    let output = match Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(o) => o,
        Err(e) => {
            return Err(match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ProbeFailure::unavailable(metric, format!("{program} not found"))
                }
                std::io::ErrorKind::PermissionDenied => {
                    ProbeFailure::denied(metric, format!("{program}: permission denied"))
                }
                _ => ProbeFailure::unavailable(metric, format!("{program}: {e}")),
            });
        }
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeFailure::unavailable(
            metric,
            format!("{program} exited with {}: {}", output.status, stderr.trim()),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl ProbeSet for SystemProbes {
    async fn kernel_version(&self) -> MetricResult<String> {
        System::kernel_version().ok_or_else(|| {
            ProbeFailure::unavailable(
                Metric::KernelVersion,
                "platform reports no kernel release",
            )
        })
    }

    async fn os_details(&self) -> MetricResult<String> {
        System::long_os_version()
            .or_else(|| match (System::name(), System::os_version()) {
                (Some(name), Some(version)) => Some(format!("{name} {version}")),
                (Some(name), None) => Some(name),
                _ => None,
            })
            .ok_or_else(|| {
                ProbeFailure::unavailable(Metric::OsDetails, "platform reports no OS identity")
            })
    }

    async fn user(&self) -> MetricResult<String> {
        std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .map_err(|_| {
                ProbeFailure::unavailable(Metric::User, "neither USER nor LOGNAME is set")
            })
    }

    async fn process_count(&self) -> MetricResult<u64> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys.lock().map_err(|e| {
                ProbeFailure::unavailable(
                    Metric::ProcessCount,
                    format!("sysinfo lock poisoned: {e}"),
                )
            })?;
            sys.refresh_processes(ProcessesToUpdate::All, true);
            Ok(sys.processes().len() as u64)
        })
        .await
        .map_err(|e| {
            ProbeFailure::unavailable(Metric::ProcessCount, format!("sysinfo task join: {e}"))
        })?
    }

    async fn open_ports(&self) -> MetricResult<u64> {
        // ss first, netstat as the fallback; the metric is unavailable
        // only when both mechanisms fail.
        let first = match run_tool(Metric::OpenPorts, "ss", &["-tuln"]).await {
            Ok(out) => return Ok(parse::count_socket_lines(&out, parse::SS_HEADER_LINES)),
            Err(e) => e,
        };
        match run_tool(Metric::OpenPorts, "netstat", &["-tuln"]).await {
            Ok(out) => Ok(parse::count_socket_lines(&out, parse::NETSTAT_HEADER_LINES)),
            Err(second) => Err(ProbeFailure::unavailable(
                Metric::OpenPorts,
                format!("ss failed ({}); netstat failed ({})", first.message, second.message),
            )),
        }
    }

    async fn load_avg(&self) -> MetricResult<LoadAvg> {
        #[cfg(unix)]
        {
            let load = System::load_average();
            Ok(LoadAvg {
                one: load.one,
                five: load.five,
                fifteen: load.fifteen,
            })
        }
        #[cfg(not(unix))]
        {
            Err(ProbeFailure::unavailable(
                Metric::LoadAvg,
                "platform exposes no load average",
            ))
        }
    }

    async fn mem_available_mb(&self) -> MetricResult<u64> {
        let out = run_tool(Metric::MemAvailableMb, "free", &["-m"]).await?;
        parse::free_available_mb(&out).map_err(|e| ProbeFailure::parse(Metric::MemAvailableMb, e))
    }

    async fn disk_usage_pct(&self) -> MetricResult<u8> {
        let out = run_tool(Metric::DiskUsagePct, "df", &["-P", "/"]).await?;
        parse::df_usage_pct(&out).map_err(|e| ProbeFailure::parse(Metric::DiskUsagePct, e))
    }
}
