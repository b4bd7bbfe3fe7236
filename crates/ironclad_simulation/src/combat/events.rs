//! Combat events.
//!
//! Flow: `ShellFired` (controller → projectile backend) → `ShellHit`
//! (backend → damage) → `DamageDealt` / `EntityDied`.

use bevy::prelude::*;

/// Event: снаряд вылетел из ствола.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ShellFired {
    pub shooter: Entity,
    /// Цель (None для выстрелов игрока)
    pub target: Option<Entity>,
    pub origin: Vec3,
    /// Normalized
    pub direction: Vec3,
    pub range: f32,
    pub speed: f32,
    pub damage: f32,
}

/// Event: снаряд попал в машину (projectile backend → damage pipeline).
#[derive(Event, Debug, Clone)]
pub struct ShellHit {
    pub shooter: Entity,
    pub target: Entity,
    pub damage: f32,
    pub point: Vec3,
}

#[derive(Event, Debug, Clone)]
pub struct ReloadStarted {
    pub entity: Entity,
    pub duration: f32,
}

#[derive(Event, Debug, Clone)]
pub struct ReloadCompleted {
    pub entity: Entity,
    pub clip_ammo: u32,
    pub total_ammo: u32,
}
