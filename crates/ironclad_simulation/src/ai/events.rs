//! AI events (debug visualization, telemetry).

use bevy::prelude::*;

use crate::ai::BehaviorState;

/// Why a behavior transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    HostileSpotted,
    /// Target despawned or died
    TargetLost,
    TargetOutOfRange,
}

/// Event: behavior state changed.
#[derive(Event, Debug, Clone)]
pub struct BehaviorChanged {
    pub entity: Entity,
    pub previous: BehaviorState,
    pub current: BehaviorState,
    pub reason: TransitionReason,
}
