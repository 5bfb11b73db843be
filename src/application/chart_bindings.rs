// Chart bindings - Per-slot chart lifecycle tied to the active panel
use crate::domain::levels::ThresholdColor;
use crate::domain::panel::Panel;
use crate::domain::telemetry::{HISTORY_LEN, HOURLY_LEN, RECENT_AMPS_LEN, TelemetrySnapshot};
use chrono::DateTime;
use serde::Serialize;

const HISTORY_INTERVAL_SECS: i64 = 600;
const HOURLY_INTERVAL_SECS: i64 = 3600;
const TEN_MINUTES_SECS: i64 = 600;

const GREEN: &str = "#5CD66E";
const BLUE: &str = "#2196f3";
const ENERGY_GREEN: &str = "#4caf50";
const AXIS_BORDER: &str = "#999999";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSlot {
    Voltage,
    Capacity,
    HourlyEnergy,
    RecentAmps,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 4] = [
        ChartSlot::Voltage,
        ChartSlot::Capacity,
        ChartSlot::HourlyEnergy,
        ChartSlot::RecentAmps,
    ];

    pub fn panel(self) -> Panel {
        match self {
            ChartSlot::Voltage | ChartSlot::Capacity => Panel::clamped(0),
            ChartSlot::HourlyEnergy => Panel::clamped(1),
            ChartSlot::RecentAmps => Panel::clamped(2),
        }
    }

    pub fn spec(self) -> ChartSpec {
        match self {
            ChartSlot::Voltage => ChartSpec {
                slot: self,
                kind: ChartKind::Line,
                label: "Voltage",
                color: GREEN,
                fill: Some(Gradient::fading("rgba(92, 214, 110, 0.8)")),
                tension: 0.25,
                point_radius: 0.0,
                animated: true,
                x_axis: AxisSpec::time(true),
                y_axis: AxisSpec::value(false),
                crosshair: Some(Crosshair::new(GREEN)),
            },
            ChartSlot::Capacity => ChartSpec {
                slot: self,
                kind: ChartKind::Bar,
                label: "Capacity",
                color: GREEN,
                fill: None,
                tension: 0.25,
                point_radius: 1.0,
                animated: true,
                x_axis: AxisSpec::time(true),
                y_axis: AxisSpec {
                    min: Some(0.0),
                    max: Some(100.0),
                    grace_percent: Some(10),
                    ..AxisSpec::value(true)
                },
                crosshair: Some(Crosshair::new(GREEN)),
            },
            ChartSlot::HourlyEnergy => ChartSpec {
                slot: self,
                kind: ChartKind::Bar,
                label: "Wh",
                color: ENERGY_GREEN,
                fill: None,
                tension: 0.0,
                point_radius: 0.0,
                animated: true,
                x_axis: AxisSpec::time(true),
                y_axis: AxisSpec {
                    grace_percent: Some(10),
                    ..AxisSpec::value(true)
                },
                crosshair: None,
            },
            ChartSlot::RecentAmps => ChartSpec {
                slot: self,
                kind: ChartKind::Line,
                label: "Amps",
                color: BLUE,
                fill: Some(Gradient::fading("rgba(33, 150, 243, 0.8)")),
                tension: 0.25,
                point_radius: 0.0,
                animated: false,
                x_axis: AxisSpec {
                    max_ticks: 4,
                    ..AxisSpec::time(false)
                },
                y_axis: AxisSpec::value(true),
                crosshair: Some(Crosshair::new(BLUE)),
            },
        }
    }

    /// Builds the labels and values this slot displays for a snapshot.
    pub fn prepare(self, snapshot: &TelemetrySnapshot) -> ChartData {
        match self {
            ChartSlot::Voltage => ChartData {
                labels: time_labels(snapshot.timestamp, HISTORY_LEN, HISTORY_INTERVAL_SECS, true),
                values: fixed_history(&snapshot.history_voltage, self),
                colors: Vec::new(),
            },
            ChartSlot::Capacity => {
                let values = fixed_history(&snapshot.history_capacity_percent, self);
                let colors = values
                    .iter()
                    .map(|v| ThresholdColor::for_percent(*v).hex().to_string())
                    .collect();
                ChartData {
                    labels: time_labels(snapshot.timestamp, HISTORY_LEN, HISTORY_INTERVAL_SECS, true),
                    values,
                    colors,
                }
            }
            ChartSlot::HourlyEnergy => ChartData {
                labels: hourly_labels(snapshot.timestamp, HOURLY_LEN),
                values: recent_window(&snapshot.hourly_kwh, HOURLY_LEN)
                    .into_iter()
                    .map(|kwh| (kwh * 1000.0).round())
                    .collect(),
                colors: Vec::new(),
            },
            ChartSlot::RecentAmps => ChartData {
                labels: seconds_ago_labels(RECENT_AMPS_LEN),
                values: recent_window(&snapshot.last_60_amps, RECENT_AMPS_LEN),
                colors: Vec::new(),
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChartSlot::Voltage => "voltage",
            ChartSlot::Capacity => "capacity",
            ChartSlot::HourlyEnergy => "hourly_energy",
            ChartSlot::RecentAmps => "recent_amps",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Vertical fill from `top` down to transparent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gradient {
    pub top: &'static str,
    pub bottom: &'static str,
}

impl Gradient {
    fn fading(top: &'static str) -> Self {
        Self {
            top,
            bottom: "rgba(0, 0, 0, 0)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub begin_at_zero: bool,
    pub grace_percent: Option<u8>,
    pub show_grid: bool,
    pub show_ticks: bool,
    pub max_ticks: u8,
    pub border_color: Option<&'static str>,
}

impl AxisSpec {
    fn time(show_ticks: bool) -> Self {
        Self {
            min: None,
            max: None,
            begin_at_zero: false,
            grace_percent: None,
            show_grid: false,
            show_ticks,
            max_ticks: 6,
            border_color: Some(AXIS_BORDER),
        }
    }

    fn value(begin_at_zero: bool) -> Self {
        Self {
            min: None,
            max: None,
            begin_at_zero,
            grace_percent: None,
            show_grid: true,
            show_ticks: true,
            max_ticks: 0,
            border_color: None,
        }
    }
}

/// After-draw hook: a vertical line through the active tooltip point plus a
/// highlight dot on the point itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crosshair {
    pub line_color: &'static str,
    pub dot_color: &'static str,
    pub dot_radius: f64,
}

impl Crosshair {
    fn new(dot_color: &'static str) -> Self {
        Self {
            line_color: "#fff",
            dot_color,
            dot_radius: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub slot: ChartSlot,
    pub kind: ChartKind,
    pub label: &'static str,
    pub color: &'static str,
    pub fill: Option<Gradient>,
    pub tension: f64,
    pub point_radius: f64,
    pub animated: bool,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub crosshair: Option<Crosshair>,
}

impl ChartSpec {
    pub fn tooltip_unit(&self) -> &'static str {
        tooltip_unit(self.label)
    }
}

/// Labels, values and optional per-point colors for one chart update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChartId(pub u64);

/// The charting backend. Instances are addressed by the id returned from
/// `create` until `destroy` releases them.
pub trait ChartLibrary {
    fn create(&mut self, spec: &ChartSpec, data: &ChartData) -> ChartId;
    fn update(&mut self, id: ChartId, data: &ChartData);
    fn destroy(&mut self, id: ChartId);
}

/// Owns zero or one live chart instance for a slot.
#[derive(Debug)]
pub struct ChartHandle {
    slot: ChartSlot,
    instance: Option<ChartId>,
}

impl ChartHandle {
    pub fn new(slot: ChartSlot) -> Self {
        Self {
            slot,
            instance: None,
        }
    }

    #[cfg(test)]
    pub fn instance(&self) -> Option<ChartId> {
        self.instance
    }

    /// Creates or updates the instance when the slot's panel is active,
    /// releases it otherwise.
    pub fn ensure(&mut self, active: Panel, snapshot: &TelemetrySnapshot, library: &mut dyn ChartLibrary) {
        if self.slot.panel() != active {
            self.release(library);
            return;
        }

        let data = self.slot.prepare(snapshot);
        match self.instance {
            Some(id) => library.update(id, &data),
            None => {
                let id = library.create(&self.slot.spec(), &data);
                tracing::debug!("Created {} chart {:?}", self.slot.name(), id);
                self.instance = Some(id);
            }
        }
    }

    pub fn release(&mut self, library: &mut dyn ChartLibrary) {
        if let Some(id) = self.instance.take() {
            tracing::debug!("Destroying {} chart {:?}", self.slot.name(), id);
            library.destroy(id);
        }
    }
}

#[derive(Debug)]
pub struct ChartBindings {
    handles: Vec<ChartHandle>,
}

impl Default for ChartBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartBindings {
    pub fn new() -> Self {
        Self {
            handles: ChartSlot::ALL.into_iter().map(ChartHandle::new).collect(),
        }
    }

    /// Inactive slots are released before active ones are created.
    pub fn ensure_all(&mut self, active: Panel, snapshot: &TelemetrySnapshot, library: &mut dyn ChartLibrary) {
        let (current, others): (Vec<_>, Vec<_>) = self
            .handles
            .iter_mut()
            .partition(|h| h.slot.panel() == active);
        for handle in others {
            handle.release(library);
        }
        for handle in current {
            handle.ensure(active, snapshot, library);
        }
    }

    pub fn release_all(&mut self, library: &mut dyn ChartLibrary) {
        for handle in &mut self.handles {
            handle.release(library);
        }
    }

    #[cfg(test)]
    pub fn instance(&self, slot: ChartSlot) -> Option<ChartId> {
        self.handles
            .iter()
            .find(|h| h.slot == slot)
            .and_then(ChartHandle::instance)
    }
}

/// `HH:MM` UTC labels for `points` samples spaced `interval_secs` apart,
/// ending at `now_secs` (floored to ten minutes when `round_to_ten_minutes`).
pub fn time_labels(now_secs: i64, points: usize, interval_secs: i64, round_to_ten_minutes: bool) -> Vec<String> {
    let base = if round_to_ten_minutes {
        now_secs.checked_sub(now_secs.rem_euclid(TEN_MINUTES_SECS))
    } else {
        Some(now_secs)
    };

    (0..points)
        .map(|i| {
            let offset = (points - 1 - i) as i64 * interval_secs;
            base.and_then(|base| base.checked_sub(offset))
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "00:00".to_string())
        })
        .collect()
}

/// Hourly labels always read `HH:00`.
pub fn hourly_labels(now_secs: i64, points: usize) -> Vec<String> {
    time_labels(now_secs, points, HOURLY_INTERVAL_SECS, true)
        .into_iter()
        .map(|label| format!("{}:00", &label[..2]))
        .collect()
}

pub fn seconds_ago_labels(points: usize) -> Vec<String> {
    (0..points).map(|i| format!("{}s ago", points - 1 - i)).collect()
}

/// Histories are only trusted at their exact nominal length; anything else
/// becomes a zero series.
pub fn fixed_history(values: &[f64], slot: ChartSlot) -> Vec<f64> {
    if values.len() == HISTORY_LEN {
        return values.to_vec();
    }
    if !values.is_empty() {
        tracing::warn!(
            "Discarding {} history with {} samples (expected {})",
            slot.name(),
            values.len(),
            HISTORY_LEN
        );
    }
    vec![0.0; HISTORY_LEN]
}

/// The most recent `len` samples, zero-padded at the front when short.
pub fn recent_window(values: &[f64], len: usize) -> Vec<f64> {
    let tail = &values[values.len().saturating_sub(len)..];
    let mut window = vec![0.0; len - tail.len()];
    window.extend_from_slice(tail);
    window
}

/// Tooltip unit from a parenthesised suffix, otherwise guessed from the label.
pub fn tooltip_unit(label: &str) -> &str {
    if let (Some(open), Some(close)) = (label.find('('), label.rfind(')')) {
        if open < close {
            return &label[open + 1..close];
        }
    }

    let lower = label.to_lowercase();
    if lower.contains("volt") {
        "V"
    } else if lower.contains("amp") {
        "A"
    } else if lower.contains("wh") {
        "Wh"
    } else if lower.contains("capacity") {
        "%"
    } else {
        ""
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;

    /// Chart library that records calls and rejects a second live instance
    /// for any slot.
    #[derive(Debug, Default)]
    pub struct FakeChartLibrary {
        next_id: u64,
        pub live: HashMap<ChartId, (ChartSlot, ChartData)>,
        pub created: usize,
        pub updated: usize,
        pub destroyed: usize,
    }

    impl FakeChartLibrary {
        pub fn live_for(&self, slot: ChartSlot) -> usize {
            self.live.values().filter(|(s, _)| *s == slot).count()
        }
    }

    impl ChartLibrary for FakeChartLibrary {
        fn create(&mut self, spec: &ChartSpec, data: &ChartData) -> ChartId {
            assert_eq!(self.live_for(spec.slot), 0, "second live {:?} chart", spec.slot);
            self.next_id += 1;
            self.created += 1;
            let id = ChartId(self.next_id);
            self.live.insert(id, (spec.slot, data.clone()));
            id
        }

        fn update(&mut self, id: ChartId, data: &ChartData) {
            let entry = self.live.get_mut(&id).expect("update of a destroyed chart");
            entry.1 = data.clone();
            self.updated += 1;
        }

        fn destroy(&mut self, id: ChartId) {
            assert!(self.live.remove(&id).is_some(), "double destroy of {:?}", id);
            self.destroyed += 1;
        }
    }
}
