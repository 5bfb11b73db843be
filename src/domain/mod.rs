// Domain layer - Telemetry payloads and panel primitives
pub mod levels;
pub mod panel;
pub mod telemetry;
