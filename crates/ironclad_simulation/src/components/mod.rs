//! Shared ECS components for vehicles.
//!
//! Domain-specific state (sensors, planner, weapon, drive) lives in its own
//! module; this module only holds what every subsystem reads:
//! - vehicle: Vehicle, VehicleControls, VehicleTelemetry, ControlSource, PlayerCommand, Disabled
//! - health: Health (armor + regeneration)

pub mod health;
pub mod vehicle;

pub use health::*;
pub use vehicle::*;
