use crate::application::panel_controller::PanelTimings;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub device: DeviceSettings,
    pub poll: PollSettings,
    pub panels: PanelSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceSettings {
    pub base_url: String,
    pub data_path: String,
    pub set_screen_path: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollSettings {
    pub interval_ms: u64,
    pub simulated: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelSettings {
    pub override_ms: u64,
    pub sync_debounce_ms: u64,
    pub swipe_threshold_px: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub filter: String,
}

impl DeviceSettings {
    pub fn data_url(&self) -> String {
        join_url(&self.base_url, &self.data_path)
    }

    pub fn set_screen_url(&self) -> String {
        join_url(&self.base_url, &self.set_screen_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl From<&PanelSettings> for PanelTimings {
    fn from(settings: &PanelSettings) -> Self {
        PanelTimings {
            override_window: Duration::from_millis(settings.override_ms),
            sync_debounce: Duration::from_millis(settings.sync_debounce_ms),
            swipe_threshold_px: settings.swipe_threshold_px,
        }
    }
}

/// Defaults, then `config/dashboard.toml` if present, then `DASHBOARD_*`
/// environment variables (`DASHBOARD_POLL__INTERVAL_MS=500`).
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let builder = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    Ok(builder.build()?.try_deserialize()?)
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default("device.base_url", "http://192.168.4.1")?
        .set_default("device.data_path", "/data")?
        .set_default("device.set_screen_path", "/setScreen")?
        .set_default("device.request_timeout_ms", 3000)?
        .set_default("poll.interval_ms", 1000)?
        .set_default("poll.simulated", false)?
        .set_default("panels.override_ms", 5000)?
        .set_default("panels.sync_debounce_ms", 200)?
        .set_default("panels.swipe_threshold_px", 150.0)?
        .set_default("server.bind", "127.0.0.1:8080")?
        .set_default("logging.filter", "info")?)
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from_str(toml: &str) -> anyhow::Result<DashboardConfig> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    #[test]
    fn test_defaults() {
        let config = load_from_str("").unwrap();
        assert_eq!(config.device.data_url(), "http://192.168.4.1/data");
        assert_eq!(config.device.set_screen_url(), "http://192.168.4.1/setScreen");
        assert_eq!(config.poll.interval(), Duration::from_secs(1));
        assert!(!config.poll.simulated);

        let timings = PanelTimings::from(&config.panels);
        assert_eq!(timings, PanelTimings::default());
    }

    #[test]
    fn test_file_overrides() {
        let config = load_from_str(
            r#"
            [device]
            base_url = "http://battery.local/"
            [poll]
            interval_ms = 500
            simulated = true
            [panels]
            override_ms = 8000
            "#,
        )
        .unwrap();

        assert_eq!(config.device.data_url(), "http://battery.local/data");
        assert_eq!(config.poll.interval(), Duration::from_millis(500));
        assert!(config.poll.simulated);
        assert_eq!(PanelTimings::from(&config.panels).override_window, Duration::from_secs(8));
        assert_eq!(config.panels.sync_debounce_ms, 200);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a/", "/b"), "http://a/b");
        assert_eq!(join_url("http://a", "b"), "http://a/b");
    }
}
