//! AI decision-making module
//!
//! Two-state behavior machine per vehicle:
//! - Roaming: random destinations, perception armed
//! - Engaging: chase + shoot the closest hostile found by the last scan
//!
//! The systems are registered by `AgentControlPlugin` (lib.rs) in the
//! `LogicSet::Decide` set.

pub mod components;
pub mod events;
pub mod systems;

pub use components::{select_closest_target, within_engagement_range, BehaviorConfig, BehaviorState, Turret};
pub use events::{BehaviorChanged, TransitionReason};
pub use systems::{aim_turrets, update_behavior_state};
