//! Combat module
//!
//! - weapon: `CombatController` (ammo, cadence, reload), `WeaponConfig`
//! - events: ShellFired → ShellHit, reload notifications
//! - damage: armor/health pipeline, death handling, regeneration
//! - systems: AI engagement fire, player fire, weapon timers
//!
//! The projectile itself belongs to the backend: it consumes `ShellFired`
//! and reports `ShellHit`.

use bevy::prelude::*;

pub mod damage;
pub mod events;
pub mod systems;
pub mod weapon;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod damage_tests;
#[cfg(test)]
mod weapon_tests;

pub use damage::*;
pub use events::*;
pub use systems::*;
pub use weapon::*;

use crate::LogicSet;

/// Combat Plugin
///
/// Registers combat events and the damage pipeline (`LogicSet::Resolve`):
/// 1. apply_shell_hits: ShellHit → armor/health, DamageDealt, EntityDied
/// 2. handle_deaths: Dead marker, zeroed controls
/// 3. regenerate_health: passive repair while not firing
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ShellFired>()
            .add_event::<ShellHit>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<ReloadStarted>()
            .add_event::<ReloadCompleted>();

        crate::configure_sets(app);

        app.add_systems(
            Update,
            (damage::apply_shell_hits, damage::handle_deaths, damage::regenerate_health)
                .chain()
                .in_set(LogicSet::Resolve),
        );
    }
}
