// Application layer - View model, panel control, chart lifecycle and the event loop
pub mod chart_bindings;
pub mod clock;
pub mod dashboard_service;
pub mod panel_controller;
pub mod renderer;
pub mod telemetry_source;
pub mod view_model;
