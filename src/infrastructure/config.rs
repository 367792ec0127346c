use chrono::Duration;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub realtime: RealtimeSettings,
    #[serde(default)]
    pub windows: WindowSettings,
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
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeSettings {
    /// 0 disables polling; changes then come only from this service's own writes.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Look-ahead windows for expiry alerts. Each screen keeps its own.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WindowSettings {
    #[serde(default = "default_warranty_days")]
    pub warranty_days: i64,
    #[serde(default = "default_airtime_days")]
    pub airtime_days: i64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            warranty_days: default_warranty_days(),
            airtime_days: default_airtime_days(),
        }
    }
}

impl WindowSettings {
    pub fn warranty(&self) -> Duration {
        Duration::days(self.warranty_days)
    }

    pub fn airtime(&self) -> Duration {
        Duration::days(self.airtime_days)
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_warranty_days() -> i64 {
    30
}

fn default_airtime_days() -> i64 {
    7
}

/// Longest look-ahead accepted for an expiry window, in days.
pub const MAX_WINDOW_DAYS: i64 = 365;

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must be set");
        }
        for (name, days) in [
            ("windows.warranty_days", self.windows.warranty_days),
            ("windows.airtime_days", self.windows.airtime_days),
        ] {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                anyhow::bail!("{} must be between 1 and {}, got {}", name, MAX_WINDOW_DAYS, days);
            }
        }
        if self.realtime.debounce_ms == 0 {
            anyhow::bail!("realtime.debounce_ms must be positive");
        }
        Ok(())
    }
}

fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> anyhow::Result<AppConfig> {
    let settings = builder
        .add_source(
            config::Environment::with_prefix("HELPDESK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Load `config/dashboard.toml` (optional) overlaid with `HELPDESK__*`
/// environment variables, e.g. `HELPDESK__API__BASE_URL`.
pub fn load_config() -> anyhow::Result<AppConfig> {
    build(
        config::Config::builder()
            .add_source(config::File::with_name("config/dashboard").required(false)),
    )
}

#[cfg(test)]
fn load_config_from_str(toml: &str) -> anyhow::Result<AppConfig> {
    build(
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
    )
}
