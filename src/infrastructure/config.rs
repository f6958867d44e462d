use chrono::FixedOffset;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_interval_secs")]
    pub samples_interval_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub averages_interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            samples_interval_secs: default_interval_secs(),
            averages_interval_secs: default_interval_secs(),
        }
    }
}

impl PollingSettings {
    pub fn samples_interval(&self) -> Duration {
        Duration::from_secs(self.samples_interval_secs.max(1))
    }

    pub fn averages_interval(&self) -> Duration {
        Duration::from_secs(self.averages_interval_secs.max(1))
    }
}

/// Which fields identify a live sample when merging polls.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// A timestamp already present drops the incoming sample whatever its server.
    #[default]
    Timestamp,
    TimestampAndServer,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub chronological_labels: bool,
    #[serde(default)]
    pub dedup_key: DedupKey,
    #[serde(default = "default_max_live_samples")]
    pub max_live_samples: usize,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default)]
    pub label_separator: Option<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            time_format: default_time_format(),
            chronological_labels: false,
            dedup_key: DedupKey::default(),
            max_live_samples: default_max_live_samples(),
            palette: default_palette(),
            label_separator: None,
        }
    }
}

impl DisplaySettings {
    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            anyhow::anyhow!("utc_offset_minutes out of range: {}", self.utc_offset_minutes)
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSettings {
    #[serde(default = "default_servers_per_country")]
    pub servers_per_country: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            servers_per_country: default_servers_per_country(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    60
}

// America/Lima, no daylight saving
fn default_utc_offset_minutes() -> i32 {
    -5 * 60
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

// one day of minute polls across a handful of servers
fn default_max_live_samples() -> usize {
    10_000
}

fn default_palette() -> Vec<String> {
    (0..6).map(|i| format!("hsl({}, 70%, 50%)", i * 60)).collect()
}

fn default_servers_per_country() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("NETQ").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
