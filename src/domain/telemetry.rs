// Telemetry snapshot domain model
use serde::Deserialize;

/// Samples in the voltage and capacity histories (12h at 10-minute spacing).
pub const HISTORY_LEN: usize = 72;

/// Hourly energy buckets shown on the energy panel.
pub const HOURLY_LEN: usize = 12;

/// Per-second current samples shown on the load panel.
pub const RECENT_AMPS_LEN: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryType {
    LiIon,
    LiPo,
    LiFePo4,
}

impl BatteryType {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(BatteryType::LiIon),
            1 => Some(BatteryType::LiPo),
            2 => Some(BatteryType::LiFePo4),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatteryType::LiIon => "LiIon",
            BatteryType::LiPo => "LiPo",
            BatteryType::LiFePo4 => "LiFePO4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentDirection {
    Idle,
    Discharging,
    Charging,
}

impl CurrentDirection {
    /// Codes outside `{1, 2}` are treated as idle.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => CurrentDirection::Discharging,
            2 => CurrentDirection::Charging,
            _ => CurrentDirection::Idle,
        }
    }
}

/// One `/data` payload from the device.
///
/// Decoding never fails on individual fields: numbers sent as strings are
/// parsed, and anything missing or malformed falls back to zero, an empty
/// series or `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(rename = "now", default, deserialize_with = "lenient::integer")]
    pub timestamp: i64,
    #[serde(rename = "batteryType", default, deserialize_with = "lenient::integer")]
    pub battery_type: i64,
    #[serde(rename = "cellcount", default, deserialize_with = "lenient::integer")]
    pub cell_count: i64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub watts: f64,
    #[serde(rename = "Ampere", default, deserialize_with = "lenient::number")]
    pub amperage: f64,
    #[serde(rename = "cur_dir", default, deserialize_with = "lenient::integer")]
    pub current_direction: i64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub voltage: f64,
    #[serde(rename = "batteryCapacityAh", default, deserialize_with = "lenient::number")]
    pub battery_capacity_ah: f64,
    #[serde(rename = "remainingCapacityAh", default, deserialize_with = "lenient::number")]
    pub remaining_capacity_ah: f64,
    #[serde(rename = "pricePerKWh", default, deserialize_with = "lenient::number")]
    pub price_per_kwh: f64,
    #[serde(rename = "totalWh", default, deserialize_with = "lenient::number")]
    pub total_wh: f64,
    #[serde(rename = "totalKWh", default, deserialize_with = "lenient::number")]
    pub total_kwh: f64,
    #[serde(rename = "capacity", default, deserialize_with = "lenient::number")]
    pub capacity_percent: f64,
    #[serde(rename = "screen", default, deserialize_with = "lenient::optional_integer")]
    pub suggested_panel: Option<i64>,
    #[serde(rename = "historyVoltage", default, deserialize_with = "lenient::series")]
    pub history_voltage: Vec<f64>,
    #[serde(rename = "historyCapacity", default, deserialize_with = "lenient::series")]
    pub history_capacity_percent: Vec<f64>,
    #[serde(rename = "hourlyKWh", default, deserialize_with = "lenient::series")]
    pub hourly_kwh: Vec<f64>,
    #[serde(rename = "last60Amps", default, deserialize_with = "lenient::series")]
    pub last_60_amps: Vec<f64>,
    #[serde(rename = "usedEnergy", default, deserialize_with = "lenient::optional_number")]
    pub used_energy: Option<f64>,
    #[serde(rename = "usedUnit", default, deserialize_with = "lenient::optional_text")]
    pub used_unit: Option<String>,
    #[serde(rename = "maxA", default, deserialize_with = "lenient::optional_number")]
    pub max_amps: Option<f64>,
    #[serde(rename = "maxA_min", default, deserialize_with = "lenient::optional_number")]
    pub max_amps_per_minute: Option<f64>,
    #[serde(rename = "maxWatts", default, deserialize_with = "lenient::optional_number")]
    pub max_watts: Option<f64>,
}

impl TelemetrySnapshot {
    pub fn battery_type(&self) -> Option<BatteryType> {
        BatteryType::from_index(self.battery_type)
    }

    pub fn direction(&self) -> CurrentDirection {
        CurrentDirection::from_code(self.current_direction)
    }
}

/// Field decoders that degrade to defaults instead of failing the payload.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_number(value: &Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }

    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value).unwrap_or(0.0))
    }

    pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value))
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value).map(|n| n.trunc() as i64).unwrap_or(0))
    }

    pub fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value).map(|n| n.trunc() as i64))
    }

    pub fn series<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Array(items) => items.iter().map(|v| as_number(v).unwrap_or(0.0)).collect(),
            _ => Vec::new(),
        })
    }

    pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Some(s),
            _ => None,
        })
    }
}
