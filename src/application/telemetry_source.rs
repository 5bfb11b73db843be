// Device boundary - Telemetry source and panel sync traits
use crate::domain::panel::Panel;
use crate::domain::telemetry::TelemetrySnapshot;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to device failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("device answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed telemetry payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch one snapshot from the device
    async fn fetch(&self) -> Result<TelemetrySnapshot, SourceError>;
}

#[async_trait]
pub trait PanelSync: Send + Sync {
    /// Ask the device to remember the active panel (fire-and-forget)
    async fn set_panel(&self, panel: Panel) -> Result<(), SourceError>;
}
