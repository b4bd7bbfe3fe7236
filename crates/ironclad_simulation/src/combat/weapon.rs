//! Main gun: ammo, fire cadence and timed reload.
//!
//! `CombatController::try_fire` is the only way a shell leaves the barrel;
//! AI and player vehicles both go through it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::ShellFired;
use crate::error::{ensure_positive, ensure_range, ConfigError};
use crate::services::WeaponSink;

/// Параметры орудия.
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub clip_size: u32,
    /// Запас снарядов при спавне (без заряженной обоймы)
    pub total_ammo: u32,
    /// Время перезарядки обоймы (с)
    pub reload_time: f32,
    /// Пауза между выстрелами (с)
    pub fire_rate: f32,
    /// Стреляем только по целям ближе этого (м)
    pub projectile_range: f32,
    pub shell_speed: f32,
    pub damage: f32,
    /// Точка прицела выше origin цели на столько (м)
    pub aim_height_offset: f32,
    /// Высота ствола над origin корпуса (м)
    pub muzzle_height: f32,
    /// Выстрел игрока ближе этого блокируется ("danger close")
    pub minimum_fire_distance: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            clip_size: 5,
            total_ammo: 40,
            reload_time: 3.0,
            fire_rate: 2.0,
            projectile_range: 1000.0,
            shell_speed: 100.0,
            damage: 25.0,
            aim_height_offset: 2.0,
            muzzle_height: 2.0,
            minimum_fire_distance: 5.0,
        }
    }
}

impl WeaponConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clip_size == 0 {
            return Err(ConfigError::EmptyClip);
        }
        ensure_positive("weapon.reload_time", self.reload_time)?;
        ensure_positive("weapon.fire_rate", self.fire_rate)?;
        ensure_positive("weapon.projectile_range", self.projectile_range)?;
        ensure_positive("weapon.shell_speed", self.shell_speed)?;
        ensure_range("weapon.damage", self.damage, 0.0, f32::MAX)?;
        ensure_range("weapon.minimum_fire_distance", self.minimum_fire_distance, 0.0, f32::MAX)?;
        Ok(())
    }
}

/// Боезапас и таймеры.
///
/// Инвариант: current_clip_ammo ≤ clip_size; идущая перезарядка не
/// перезапускается.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct WeaponState {
    pub current_clip_ammo: u32,
    pub total_ammo: u32,
    pub is_reloading: bool,
    pub fire_cooldown_remaining: f32,
    pub reload_remaining: f32,
}

/// Результат одного `try_fire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    /// Обойма пуста, перезарядка только что началась
    ReloadStarted,
    Reloading,
    CoolingDown,
    /// Пусто и в обойме, и в запасе
    OutOfAmmo,
}

impl FireOutcome {
    pub fn fired(self) -> bool {
        self == FireOutcome::Fired
    }
}

/// Орудие одной машины.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CombatController {
    pub config: WeaponConfig,
    pub state: WeaponState,
}

impl Default for CombatController {
    fn default() -> Self {
        Self::new(WeaponConfig::default())
    }
}

impl CombatController {
    /// Полная обойма + запас из config.
    pub fn new(config: WeaponConfig) -> Self {
        let state = WeaponState {
            current_clip_ammo: config.clip_size,
            total_ammo: config.total_ammo,
            ..Default::default()
        };
        Self { config, state }
    }

    /// Орудие на cooldown после выстрела (блокирует регенерацию корпуса).
    pub fn is_firing(&self) -> bool {
        self.state.fire_cooldown_remaining > 0.0
    }

    pub fn in_range(&self, origin: Vec3, target_position: Vec3) -> bool {
        let range = self.config.projectile_range;
        origin.distance_squared(target_position) <= range * range
    }

    pub fn muzzle(&self, hull_position: Vec3) -> Vec3 {
        hull_position + Vec3::Y * self.config.muzzle_height
    }

    /// Точка прицела для цели в `target_position`.
    pub fn aim_point(&self, target_position: Vec3) -> Vec3 {
        target_position + Vec3::Y * self.config.aim_height_offset
    }

    /// Начать перезарядку, если она не идёт и есть чем заряжать.
    pub fn begin_reload(&mut self) -> bool {
        if self.state.is_reloading || self.state.total_ammo == 0 {
            return false;
        }
        self.state.is_reloading = true;
        self.state.reload_remaining = self.config.reload_time;
        true
    }

    /// Выстрел из `origin` в `aim_point`, если орудие готово.
    ///
    /// Пустая обойма → вместо выстрела начинается перезарядка. Во время
    /// перезарядки или cooldown ничего не происходит.
    pub fn try_fire(
        &mut self,
        shooter: Entity,
        target: Option<Entity>,
        origin: Vec3,
        aim_point: Vec3,
        sink: &mut impl WeaponSink,
    ) -> FireOutcome {
        if self.state.is_reloading {
            return FireOutcome::Reloading;
        }

        if self.state.current_clip_ammo == 0 {
            return if self.begin_reload() {
                FireOutcome::ReloadStarted
            } else {
                FireOutcome::OutOfAmmo
            };
        }

        if self.state.fire_cooldown_remaining > 0.0 {
            return FireOutcome::CoolingDown;
        }

        let mut direction = (aim_point - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = Vec3::NEG_Z;
        }

        self.state.current_clip_ammo -= 1;
        self.state.fire_cooldown_remaining = self.config.fire_rate;

        sink.fire(ShellFired {
            shooter,
            target,
            origin,
            direction,
            range: self.config.projectile_range,
            speed: self.config.shell_speed,
            damage: self.config.damage,
        });

        FireOutcome::Fired
    }

    /// Тикаем cooldown и перезарядку. true = перезарядка завершилась.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.state.fire_cooldown_remaining = (self.state.fire_cooldown_remaining - delta).max(0.0);

        if !self.state.is_reloading {
            return false;
        }

        self.state.reload_remaining -= delta;
        if self.state.reload_remaining > 0.0 {
            return false;
        }

        let refill = (self.config.clip_size - self.state.current_clip_ammo.min(self.config.clip_size))
            .min(self.state.total_ammo);
        self.state.current_clip_ammo += refill;
        self.state.total_ammo -= refill;
        self.state.is_reloading = false;
        self.state.reload_remaining = 0.0;
        true
    }
}
