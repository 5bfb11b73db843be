// View model - Derives display fields from a snapshot and decides the active panel
use crate::domain::levels::ThresholdColor;
use crate::domain::panel::Panel;
use crate::domain::telemetry::{CurrentDirection, TelemetrySnapshot};
use serde::Serialize;

pub const CHARGE_LABEL: &str = "Estimated charge time";
pub const DISCHARGE_LABEL: &str = "Estimated discharge time";
pub const IDLE_LABEL: &str = "System idle";

/// Panel ownership for the lifetime of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub active_panel: Panel,
    pub user_override_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemainingEstimate {
    pub label: &'static str,
    pub hours: Option<f64>,
    pub hours_text: String,
    pub minutes_text: String,
}

impl RemainingEstimate {
    #[cfg(test)]
    pub fn display(&self) -> String {
        format!("{}h {}m", self.hours_text, self.minutes_text)
    }
}

/// Everything the renderer paints for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    pub active_panel: Panel,
    pub battery_type: String,
    pub cell_count: String,
    pub watts: String,
    pub direction_code: String,
    pub direction_class: Option<&'static str>,
    pub signed_amperage: f64,
    pub amperage: String,
    pub voltage: String,
    pub battery_capacity_ah: String,
    pub remaining_capacity_ah: String,
    pub price_per_kwh: String,
    pub total_energy: String,
    pub total_energy_unit: &'static str,
    pub total_price: String,
    pub hourly_kwh_total: String,
    pub used_energy: String,
    pub used_energy_unit: String,
    pub capacity_percent: String,
    pub capacity_color: ThresholdColor,
    pub remaining: RemainingEstimate,
    pub max_amps: Option<String>,
    pub max_amps_per_minute: Option<String>,
    pub max_watts: Option<String>,
}

/// Folds a snapshot into the view state.
///
/// The snapshot's suggested panel is only honoured while no user override is
/// active.
pub fn apply_snapshot(state: ViewState, snapshot: &TelemetrySnapshot) -> (ViewState, DerivedView) {
    let mut next = state;
    if !state.user_override_active {
        if let Some(suggested) = snapshot.suggested_panel.map(Panel::clamped) {
            if suggested != state.active_panel {
                next.active_panel = suggested;
            }
        }
    }

    let direction = snapshot.direction();
    let signed_amperage = signed_amperage(snapshot.amperage, direction);
    let (total_energy, total_energy_unit) = total_energy(snapshot.total_wh);
    let (used_energy, used_energy_unit) =
        used_energy(snapshot.used_energy, snapshot.used_unit.as_deref());
    let capacity = clamp_percent(snapshot.capacity_percent);

    let view = DerivedView {
        active_panel: next.active_panel,
        battery_type: snapshot
            .battery_type()
            .map(|t| t.label())
            .unwrap_or("Unknown")
            .to_string(),
        cell_count: snapshot.cell_count.to_string(),
        watts: snapshot.watts.to_string(),
        direction_code: snapshot.current_direction.to_string(),
        direction_class: match direction {
            CurrentDirection::Discharging => Some("backward"),
            CurrentDirection::Charging => Some("forward"),
            CurrentDirection::Idle => None,
        },
        signed_amperage,
        amperage: format!("{:.2}", signed_amperage),
        voltage: format!("{:.2}", snapshot.voltage),
        battery_capacity_ah: format!("{:.2}", snapshot.battery_capacity_ah),
        remaining_capacity_ah: format!("{:.2}", snapshot.remaining_capacity_ah),
        price_per_kwh: format!("{:.3}", snapshot.price_per_kwh),
        total_energy,
        total_energy_unit,
        total_price: format!("{:.2}", snapshot.total_kwh * snapshot.price_per_kwh),
        hourly_kwh_total: format!("{:.3}", snapshot.hourly_kwh.iter().sum::<f64>()),
        used_energy,
        used_energy_unit,
        capacity_percent: format!("{:.0}", capacity),
        capacity_color: ThresholdColor::for_percent(capacity),
        remaining: estimate_remaining(
            snapshot.amperage,
            snapshot.battery_capacity_ah,
            snapshot.remaining_capacity_ah,
            direction,
        ),
        max_amps: snapshot.max_amps.map(|v| format!("{:.2}", v)),
        max_amps_per_minute: snapshot.max_amps_per_minute.map(|v| format!("{:.3}", v)),
        max_watts: snapshot.max_watts.map(|v| format!("{:.0} W", v)),
    };

    (next, view)
}

/// Sign comes from the direction code, never from the raw value.
pub fn signed_amperage(amperage: f64, direction: CurrentDirection) -> f64 {
    match direction {
        CurrentDirection::Discharging => -amperage.abs(),
        _ => amperage.abs(),
    }
}

pub fn estimate_remaining(
    amperage: f64,
    capacity_ah: f64,
    remaining_ah: f64,
    direction: CurrentDirection,
) -> RemainingEstimate {
    let (label, hours) = match direction {
        CurrentDirection::Charging if amperage > 0.0 => {
            (CHARGE_LABEL, Some((capacity_ah - remaining_ah) / amperage))
        }
        CurrentDirection::Discharging if amperage > 0.0 => {
            (DISCHARGE_LABEL, Some(remaining_ah / amperage))
        }
        _ => (IDLE_LABEL, None),
    };

    let (hours_text, minutes_text) = match hours.filter(|h| h.is_finite() && *h >= 0.0) {
        Some(h) => {
            let mut whole = h.floor() as u64;
            let mut minutes = ((h - h.floor()) * 60.0).round() as u64;
            if minutes == 60 {
                whole += 1;
                minutes = 0;
            }
            (format!("{:02}", whole), format!("{:02}", minutes))
        }
        None => ("00".to_string(), "00".to_string()),
    };

    RemainingEstimate {
        label,
        hours,
        hours_text,
        minutes_text,
    }
}

/// Ah values below one are shown as mAh.
pub fn used_energy(value: Option<f64>, unit: Option<&str>) -> (String, String) {
    let Some(mut value) = value else {
        return ("0".to_string(), "mAh".to_string());
    };

    let mut unit = unit.filter(|u| !u.is_empty()).unwrap_or("Ah");
    if unit == "Ah" && value.abs() < 1.0 {
        value *= 1000.0;
        unit = "mAh";
    }

    let text = if unit == "Ah" {
        format!("{:.2}", value)
    } else {
        format!("{:.0}", value)
    };
    (text, unit.to_string())
}

pub fn total_energy(total_wh: f64) -> (String, &'static str) {
    if total_wh >= 1000.0 {
        (format!("{:.2}", total_wh / 1000.0), "kWh")
    } else {
        (format!("{:.2}", total_wh), "Wh")
    }
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
