// Device HTTP client - Polls /data and posts the active panel to /setScreen
use crate::application::telemetry_source::{PanelSync, SourceError, TelemetrySource};
use crate::domain::panel::Panel;
use crate::domain::telemetry::TelemetrySnapshot;
use crate::infrastructure::config::DeviceSettings;
use anyhow::Context;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: reqwest::Client,
    data_url: String,
    set_screen_url: String,
}

impl DeviceClient {
    pub fn new(settings: &DeviceSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build device HTTP client")?;

        Ok(Self {
            client,
            data_url: settings.data_url(),
            set_screen_url: settings.set_screen_url(),
        })
    }
}

#[async_trait]
impl TelemetrySource for DeviceClient {
    async fn fetch(&self) -> Result<TelemetrySnapshot, SourceError> {
        let response = self
            .client
            .get(&self.data_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let snapshot = serde_json::from_slice::<TelemetrySnapshot>(&body)?;
        tracing::debug!(
            "Fetched snapshot at {} (screen {:?})",
            snapshot.timestamp,
            snapshot.suggested_panel
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl PanelSync for DeviceClient {
    async fn set_panel(&self, panel: Panel) -> Result<(), SourceError> {
        let response = self
            .client
            .post(&self.set_screen_url)
            .form(&[("value", panel.index())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        tracing::debug!("Device panel set to {}", panel);
        Ok(())
    }
}
