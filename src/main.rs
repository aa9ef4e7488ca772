use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use sysaudit::models::{MetricValue, Snapshot};
use sysaudit::publisher::Publisher;
use sysaudit::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        version = version::VERSION,
        interval_seconds = app_config.monitoring.interval_seconds,
        "{} started",
        version::NAME
    );

    let probes = Arc::new(probes::SystemProbes::new());
    let assembler = Arc::new(assembler::Assembler::new(
        probes,
        Duration::from_secs(app_config.monitoring.probe_timeout_secs),
    ));
    let publisher = Arc::new(Publisher::new(
        app_config.monitoring.history_len,
        app_config.publishing.broadcast_capacity,
    ));
    let mut scheduler = scheduler::Scheduler::new(
        assembler,
        publisher.clone(),
        app_config.monitoring.interval_seconds,
    );

    let json_output = std::env::var("SNAPSHOT_FORMAT").as_deref() == Ok("json");
    let render_publisher = publisher.clone();
    let mut notifications = publisher.subscribe();
    let render_handle = tokio::spawn(async move {
        // Presentation loop: only ever consumes published snapshots
        loop {
            let snapshot = match notifications.recv().await {
                Ok(s) => s,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "display lagged behind publishes");
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            };
            if json_output {
                match serde_json::to_string(&*snapshot) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "snapshot serialization failed"),
                }
            } else {
                print!("{}", render_text(&snapshot, &render_publisher));
            }
        }
    });

    scheduler.start();

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => return Err(anyhow::anyhow!("install SIGTERM handler: {}", e)),
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("Received shutdown signal");
    scheduler.stop().await;
    render_handle.abort();

    Ok(())
}

/// Dashboard rendering: one aligned line per metric, "N/A" for
/// failures, plus the load-average history line for the chart.
fn render_text(snapshot: &Snapshot, publisher: &Publisher) -> String {
    use std::fmt::Write;

    let captured = chrono::DateTime::from_timestamp_millis(snapshot.timestamp_ms as i64)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "--:--:--".into());

    let mut out = String::new();
    let _ = writeln!(out, "--- system audit @ {captured} ---");
    for (metric, value) in snapshot.metrics() {
        let rendered = match value {
            MetricValue::Text(s) => s,
            MetricValue::Count(n) => n.to_string(),
            MetricValue::Percent(p) => format!("{p}%"),
            MetricValue::Load(l) => format!("{:.2} / {:.2} / {:.2}", l.one, l.five, l.fifteen),
            MetricValue::Failed(f) => format!("N/A ({})", f.message),
        };
        let _ = writeln!(out, "{:<16} {}", metric.as_str(), rendered);
    }
    let history = publisher
        .history()
        .iter()
        .map(|l| format!("{:.2}", l.one))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "{:<16} {}", "load_history", history);
    out
}
