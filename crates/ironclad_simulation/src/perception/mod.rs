//! Perimeter perception: periodic overlap scans for hostile vehicles.
//!
//! The module only scans while armed (Roaming). Each scan rebuilds the
//! candidate list from scratch; an empty list is an ordinary result.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::BehaviorState;
use crate::combat::Dead;
use crate::components::{Disabled, Vehicle};
use crate::error::{ensure_positive, ConfigError};
use crate::layers::{LayerMask, COLLISION_LAYER_VEHICLES};
use crate::services::SpatialQuery;

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Пауза между scan (с)
    pub check_interval: f32,
    /// Радиус обнаружения (м)
    pub radius: f32,
    pub layer_filter: LayerMask,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            check_interval: 3.0,
            radius: 40.0,
            layer_filter: COLLISION_LAYER_VEHICLES,
        }
    }
}

impl PerceptionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("perception.check_interval", self.check_interval)?;
        ensure_positive("perception.radius", self.radius)?;
        Ok(())
    }
}

/// Состояние perception одной AI машины.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PerceptionModule {
    pub config: PerceptionConfig,
    /// Seconds accumulated since the last scan
    pub elapsed: f32,
    /// Hostile candidates found by the latest scan, in scan order
    pub results: Vec<Entity>,
    pub armed: bool,
}

impl Default for PerceptionModule {
    fn default() -> Self {
        Self::new(PerceptionConfig::default())
    }
}

impl PerceptionModule {
    /// Стартует armed и готовым: первый tick сразу сканирует.
    pub fn new(config: PerceptionConfig) -> Self {
        let elapsed = config.check_interval;
        Self {
            config,
            elapsed,
            results: Vec::new(),
            armed: true,
        }
    }

    /// Включить scanner; следующий tick сканирует сразу.
    pub fn arm(&mut self) {
        self.armed = true;
        self.elapsed = self.config.check_interval;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.results.clear();
    }

    /// Advance the accumulator. Returns true when a scan is due (and resets it).
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.armed {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed >= self.config.check_interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    /// Rebuild the candidate list around `position`.
    ///
    /// `exclude` (the scanning vehicle) never appears; `is_hostile` filters the
    /// rest. Order follows the spatial query.
    pub fn scan(
        &mut self,
        spatial: &impl SpatialQuery,
        position: Vec3,
        exclude: Entity,
        is_hostile: impl Fn(Entity) -> bool,
    ) -> &[Entity] {
        self.results.clear();
        self.results.extend(
            spatial
                .overlap_sphere(position, self.config.radius, self.config.layer_filter)
                .into_iter()
                .filter(|&candidate| candidate != exclude && is_hostile(candidate)),
        );
        &self.results
    }
}

/// Система: perimeter scan для armed (Roaming) машин по таймеру.
pub fn scan_perimeter<B: Resource + SpatialQuery>(
    time: Res<Time>,
    backend: Res<B>,
    mut scanners: Query<
        (Entity, &Transform, &Vehicle, &BehaviorState, &mut PerceptionModule),
        (Without<Disabled>, Without<Dead>),
    >,
    candidates: Query<&Vehicle, Without<Dead>>,
) {
    let delta = time.delta_secs();

    for (entity, transform, vehicle, state, mut perception) in scanners.iter_mut() {
        if !matches!(state, BehaviorState::Roaming) {
            continue;
        }
        if !perception.tick(delta) {
            continue;
        }

        let found = perception.scan(backend.as_ref(), transform.translation, entity, |candidate| {
            candidates
                .get(candidate)
                .map(|other| vehicle.is_hostile_to(other))
                .unwrap_or(false)
        });

        if !found.is_empty() {
            crate::log(&format!(
                "Perception: {:?} spotted {} hostile(s)",
                entity,
                found.len()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedOverlap(Vec<Entity>);

    impl SpatialQuery for FixedOverlap {
        fn overlap_sphere(&self, _: Vec3, _: f32, _: LayerMask) -> Vec<Entity> {
            self.0.clone()
        }
    }

    #[test]
    fn test_first_tick_scans() {
        let mut perception = PerceptionModule::default();
        assert!(perception.tick(0.016));
        assert!(!perception.tick(0.016));
    }

    #[test]
    fn test_scan_interval() {
        let mut perception = PerceptionModule::default();
        assert!(perception.tick(0.1));

        assert!(!perception.tick(1.0));
        assert!(!perception.tick(1.0));
        assert!(perception.tick(1.0)); // 3.0 accumulated
    }

    #[test]
    fn test_disarmed_never_scans() {
        let mut perception = PerceptionModule::default();
        perception.disarm();
        assert!(!perception.tick(10.0));

        perception.arm();
        assert!(perception.tick(0.0));
    }

    #[test]
    fn test_scan_excludes_self_and_friends() {
        let me = Entity::from_raw(1);
        let friend = Entity::from_raw(2);
        let enemy = Entity::from_raw(3);
        let spatial = FixedOverlap(vec![me, friend, enemy]);

        let mut perception = PerceptionModule::default();
        let found = perception.scan(&spatial, Vec3::ZERO, me, |candidate| candidate == enemy);
        assert_eq!(found, &[enemy]);
    }

    #[test]
    fn test_scan_rebuilds_from_scratch() {
        let me = Entity::from_raw(1);
        let enemy = Entity::from_raw(3);

        let mut perception = PerceptionModule::default();
        perception.scan(&FixedOverlap(vec![enemy]), Vec3::ZERO, me, |_| true);
        assert_eq!(perception.results.len(), 1);

        let found = perception.scan(&FixedOverlap(Vec::new()), Vec3::ZERO, me, |_| true);
        assert!(found.is_empty());
    }

    #[test]
    fn test_disarm_clears_results() {
        let mut perception = PerceptionModule::default();
        perception.results.push(Entity::from_raw(4));
        perception.disarm();
        assert!(perception.results.is_empty());
    }
}
