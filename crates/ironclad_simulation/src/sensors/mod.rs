//! Reactive obstacle avoidance (ray sensors around the hull).
//!
//! Each physics tick every sensor casts a ray; hit distance becomes an
//! intensity in [0, 1] and the role table folds intensities into a
//! `SteeringCorrection` that the drive controller may use instead of the
//! path-follow steer.

pub mod components;
pub mod systems;

#[cfg(test)]
mod components_tests;

pub use components::*;
pub use systems::*;
