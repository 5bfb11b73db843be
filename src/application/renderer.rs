// Renderer boundary - Named insertion points the view model is painted into
use crate::application::view_model::DerivedView;
use crate::domain::panel::Panel;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    BatteryType,
    CellCount,
    Watts,
    CurrentDirection,
    Ampere,
    Voltage,
    BatteryCapacityAh,
    RemainingCapacityAh,
    PricePerKWh,
    TotalEnergy,
    TotalEnergyUnit,
    TotalPrice,
    HourlyKWhTotal,
    UsedEnergy,
    UsedEnergyUnit,
    Capacity,
    CapacityGauge,
    Hours,
    Minutes,
    TimeLabel,
    MaxAmps,
    MaxAmpsPerMinute,
    MaxWatts,
    Screen,
    Direction,
}

/// Output sink for derived fields. Any UI layer that can set text and
/// classes on named points and slide between panels satisfies it.
pub trait Renderer {
    fn set_text(&mut self, field: Field, text: &str);
    fn set_class(&mut self, field: Field, class: Option<&str>);
    fn show_panel(&mut self, panel: Panel, drag_offset_px: f64);
}

pub fn paint(view: &DerivedView, renderer: &mut dyn Renderer) {
    renderer.set_text(Field::BatteryType, &view.battery_type);
    renderer.set_text(Field::CellCount, &view.cell_count);
    renderer.set_text(Field::Watts, &view.watts);
    renderer.set_text(Field::CurrentDirection, &view.direction_code);
    renderer.set_text(Field::Ampere, &view.amperage);
    renderer.set_text(Field::Voltage, &view.voltage);
    renderer.set_text(Field::BatteryCapacityAh, &view.battery_capacity_ah);
    renderer.set_text(Field::RemainingCapacityAh, &view.remaining_capacity_ah);
    renderer.set_text(Field::PricePerKWh, &view.price_per_kwh);
    renderer.set_text(Field::TotalEnergy, &view.total_energy);
    renderer.set_text(Field::TotalEnergyUnit, view.total_energy_unit);
    renderer.set_text(Field::TotalPrice, &view.total_price);
    renderer.set_text(Field::HourlyKWhTotal, &view.hourly_kwh_total);
    renderer.set_text(Field::UsedEnergy, &view.used_energy);
    renderer.set_text(Field::UsedEnergyUnit, &view.used_energy_unit);
    renderer.set_text(Field::Capacity, &view.capacity_percent);
    renderer.set_class(Field::CapacityGauge, Some(view.capacity_color.name()));
    renderer.set_text(Field::Hours, &format!("{}h", view.remaining.hours_text));
    renderer.set_text(Field::Minutes, &format!("{}m", view.remaining.minutes_text));
    renderer.set_text(Field::TimeLabel, view.remaining.label);
    renderer.set_class(Field::Direction, view.direction_class);
    renderer.set_text(Field::Screen, &view.active_panel.to_string());

    // Absent peaks keep whatever was painted last.
    if let Some(max_amps) = &view.max_amps {
        renderer.set_text(Field::MaxAmps, max_amps);
    }
    if let Some(max_amps_per_minute) = &view.max_amps_per_minute {
        renderer.set_text(Field::MaxAmpsPerMinute, max_amps_per_minute);
    }
    if let Some(max_watts) = &view.max_watts {
        renderer.set_text(Field::MaxWatts, max_watts);
    }
}
