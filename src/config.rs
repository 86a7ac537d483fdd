use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::presenter::ChartStyle;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "REALTIME_CHART_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: HostConfig,
    pub stream: StreamConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub chart: ChartStyle,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// JSON file holding the configuration the host frame pushes.
    pub snapshot_path: PathBuf,
    /// How often the snapshot file is checked for a re-push.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub connect_timeout_ms: u64,
    pub event_buffer: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    /// Pixels of requested frame height per terminal row.
    pub px_per_row: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: PathBuf,
}

impl StreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.snapshot_path.as_os_str().is_empty() {
            bail!("host.snapshot_path must not be empty");
        }
        if self.host.poll_interval_ms == 0 {
            bail!("host.poll_interval_ms must be > 0");
        }
        if self.stream.connect_timeout_ms == 0 {
            bail!("stream.connect_timeout_ms must be > 0");
        }
        if self.stream.event_buffer == 0 {
            bail!("stream.event_buffer must be > 0");
        }
        if self.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        if self.ui.px_per_row == 0 {
            bail!("ui.px_per_row must be > 0");
        }
        if self.chart.live_color.trim().is_empty()
            || self.chart.reference_color.trim().is_empty()
        {
            bail!("chart colors must not be empty");
        }
        Ok(())
    }
}
