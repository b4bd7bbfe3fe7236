//! Behavior components (state machine, config, turret) and the pure decision helpers.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ConfigError};
use crate::math::{smooth_damp_angle, wrap_angle, yaw_towards};

/// Поведение AI машины (верхний уровень FSM).
///
/// Roaming → Engaging как только scan нашёл врага;
/// Engaging → Roaming когда цель пропала или вышла из радиуса.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum BehaviorState {
    /// Катаемся между случайными точками, perception armed
    #[default]
    Roaming,

    /// Преследуем и стреляем (weak handle, проверяется каждый tick)
    Engaging { target: Entity },
}

impl BehaviorState {
    pub fn target(&self) -> Option<Entity> {
        match self {
            BehaviorState::Roaming => None,
            BehaviorState::Engaging { target } => Some(*target),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BehaviorState::Roaming => "Roaming",
            BehaviorState::Engaging { .. } => "Engaging",
        }
    }
}

/// Параметры поведения.
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Дальше этого бросаем цель (м)
    pub max_engage_distance: f32,
    /// Ближе этого газ отпускается, чтобы не таранить цель (м)
    pub engage_standoff_distance: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_engage_distance: 50.0,
            engage_standoff_distance: 12.0,
        }
    }
}

impl BehaviorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("behavior.max_engage_distance", self.max_engage_distance)?;
        ensure_positive("behavior.engage_standoff_distance", self.engage_standoff_distance)?;
        Ok(())
    }
}

/// Башня (только yaw), critically damped сглаживание.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Turret {
    /// World yaw (радианы, 0 = смотрит в -Z)
    pub yaw: f32,
    pub yaw_velocity: f32,
    /// Примерное время выхода на новый курс (с)
    pub smooth_time: f32,
}

impl Default for Turret {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            yaw_velocity: 0.0,
            smooth_time: 0.3,
        }
    }
}

impl Turret {
    /// Шаг башни к `desired_yaw` (не зависит от FPS).
    pub fn aim(&mut self, desired_yaw: f32, delta: f32) {
        let yaw = smooth_damp_angle(self.yaw, desired_yaw, &mut self.yaw_velocity, self.smooth_time, delta);
        self.yaw = wrap_angle(yaw);
    }

    /// Навести на точку мира из `origin` (высота игнорируется).
    pub fn aim_at(&mut self, origin: Vec3, point: Vec3, delta: f32) {
        let direction = Vec3::new(point.x - origin.x, 0.0, point.z - origin.z);
        if direction.length_squared() > f32::EPSILON {
            self.aim(yaw_towards(direction), delta);
        }
    }

    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::NEG_Z
    }
}

/// Ближайший кандидат по squared distance. При равенстве побеждает первый.
pub fn select_closest_target(origin: Vec3, candidates: impl IntoIterator<Item = (Entity, Vec3)>) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;

    for (entity, position) in candidates {
        let distance_sq = origin.distance_squared(position);
        match best {
            Some((_, best_sq)) if distance_sq >= best_sq => {}
            _ => best = Some((entity, distance_sq)),
        }
    }

    best.map(|(entity, _)| entity)
}

/// Цель в `target_position` ещё в радиусе боя?
pub fn within_engagement_range(origin: Vec3, target_position: Vec3, max_engage_distance: f32) -> bool {
    origin.distance_squared(target_position) <= max_engage_distance * max_engage_distance
}
