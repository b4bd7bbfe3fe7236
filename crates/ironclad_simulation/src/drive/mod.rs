//! Drive module: desired motion → per-wheel commands.
//!
//! - controller: `DriveController` (torque filter, speed cap, stuck recovery),
//!   `DriveIntent`, `DriveConfig`, path-follow steering
//! - wheels: `WheelSet` (implements `DrivetrainActuator`)
//! - systems: follow_path, player_intent, apply_drive (physics tick)
//!
//! Precedence: stuck recovery > sensor override > path steering.

pub mod controller;
pub mod systems;
pub mod wheels;

#[cfg(test)]
mod controller_tests;

pub use controller::*;
pub use systems::*;
pub use wheels::*;
