use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Cycle period in seconds. The first cycle fires immediately on start.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Max time any single probe may take within one cycle.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Load-average ring buffer capacity (chart history).
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max snapshots kept in the change-notification channel (slow
    /// subscribers may lag).
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_interval_seconds() -> u64 {
    5
}

fn default_probe_timeout_secs() -> u64 {
    3
}

fn default_history_len() -> usize {
    20
}

fn default_broadcast_capacity() -> usize {
    16
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            probe_timeout_secs: default_probe_timeout_secs(),
            history_len: default_history_len(),
        }
    }
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitoring: MonitoringConfig::default(),
            publishing: PublishingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads from the path in CONFIG_FILE (default "config.toml").
    /// A missing file means all defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = AppConfig::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(anyhow::anyhow!("read {}: {}", path, e)),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.monitoring.interval_seconds > 0,
            "monitoring.interval_seconds must be > 0, got {}",
            self.monitoring.interval_seconds
        );
        anyhow::ensure!(
            self.monitoring.probe_timeout_secs > 0,
            "monitoring.probe_timeout_secs must be > 0, got {}",
            self.monitoring.probe_timeout_secs
        );
        anyhow::ensure!(
            self.monitoring.history_len > 0,
            "monitoring.history_len must be > 0, got {}",
            self.monitoring.history_len
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        Ok(())
    }
}
