// Simulated device - Static demo snapshot for running without hardware
use crate::application::telemetry_source::{SourceError, TelemetrySource};
use crate::domain::telemetry::{HISTORY_LEN, RECENT_AMPS_LEN, TelemetrySnapshot};
use async_trait::async_trait;

const HOURLY_KWH: [f64; 12] = [
    0.00, 0.02, 0.06, 0.10, 0.14, 0.17, 0.175, 0.17, 0.14, 0.10, 0.05, 0.01,
];

const HISTORY_CAPACITY: [f64; HISTORY_LEN] = [
    100.0, 99.0, 98.0, 97.0, 96.0, 95.0, 94.0, 93.0, 92.0, 91.0, 90.0, 89.0, 88.0, 87.0, 86.0,
    85.0, 84.0, 83.0, 82.0, 81.0, 80.0, 79.0, 78.0, 76.0, 74.0, 72.0, 70.0, 68.0, 66.0, 64.0,
    62.0, 60.0, 58.0, 56.0, 54.0, 52.0, 50.0, 48.0, 46.0, 44.0, 42.0, 40.0, 38.0, 36.0, 34.0,
    32.0, 30.0, 28.0, 27.0, 26.0, 25.0, 24.0, 23.0, 22.0, 21.0, 20.0, 19.0, 18.0, 17.0, 16.0,
    15.0, 14.0, 13.0, 12.0, 11.0, 10.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0,
];

/// Serves the same demo readings on every poll, stamped with the current time.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSource;

impl SimulatedSource {
    pub fn snapshot(now_secs: i64) -> TelemetrySnapshot {
        TelemetrySnapshot {
            timestamp: now_secs,
            battery_type: 0,
            cell_count: 4,
            watts: 123.0,
            amperage: 0.67,
            current_direction: 1,
            voltage: 14.8,
            battery_capacity_ah: 20.0,
            remaining_capacity_ah: 19.0,
            price_per_kwh: 0.25,
            total_wh: 123.5,
            total_kwh: 0.235,
            capacity_percent: 0.0,
            suggested_panel: Some(0),
            history_voltage: (0..HISTORY_LEN)
                .map(|i| 10.2 + ((i * 37) % 200) as f64 / 100.0)
                .collect(),
            history_capacity_percent: HISTORY_CAPACITY.to_vec(),
            hourly_kwh: HOURLY_KWH.to_vec(),
            last_60_amps: (0..RECENT_AMPS_LEN)
                .map(|i| ((i * 53) % 1000) as f64 / 100.0)
                .collect(),
            used_energy: Some(800.0),
            used_unit: Some("mAh".to_string()),
            max_amps: Some(12.34),
            max_amps_per_minute: Some(9.87),
            max_watts: Some(265.0),
        }
    }
}

#[async_trait]
impl TelemetrySource for SimulatedSource {
    async fn fetch(&self) -> Result<TelemetrySnapshot, SourceError> {
        Ok(Self::snapshot(chrono::Utc::now().timestamp()))
    }
}
