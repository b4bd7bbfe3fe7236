//! Combat controller systems (logic tick).

use bevy::prelude::*;

use crate::ai::{BehaviorState, Turret};
use crate::combat::{CombatController, Dead, FireOutcome, ReloadCompleted, ReloadStarted, ShellFired};
use crate::components::{Disabled, PlayerCommand, Vehicle, VehicleControls};
use crate::services::RayCaster;

/// Система: cooldown + перезарядка, флаг стрельбы копируется в controls.
pub fn tick_weapons(
    time: Res<Time>,
    mut vehicles: Query<
        (Entity, &mut CombatController, &mut VehicleControls),
        (Without<Disabled>, Without<Dead>),
    >,
    mut completed_events: EventWriter<ReloadCompleted>,
) {
    let delta = time.delta_secs();

    for (entity, mut gun, mut controls) in vehicles.iter_mut() {
        if gun.tick(delta) {
            crate::log(&format!(
                "Combat: {:?} reloaded ({} in clip, {} in reserve)",
                entity, gun.state.current_clip_ammo, gun.state.total_ammo
            ));
            completed_events.write(ReloadCompleted {
                entity,
                clip_ammo: gun.state.current_clip_ammo,
                total_ammo: gun.state.total_ammo,
            });
        }
        controls.is_firing = gun.is_firing();
    }
}

/// Система: темп стрельбы AI в Engaging.
///
/// Стреляем по цели (+ aim height offset), если она в пределах
/// projectile range и орудие готово; пустая обойма запускает перезарядку.
pub fn engage_targets(
    mut shooters: Query<
        (Entity, &Transform, &BehaviorState, &mut CombatController),
        (With<Vehicle>, Without<Disabled>, Without<Dead>),
    >,
    targets: Query<&Transform, (With<Vehicle>, Without<Dead>)>,
    mut fire_events: EventWriter<ShellFired>,
    mut reload_events: EventWriter<ReloadStarted>,
) {
    for (entity, transform, state, mut gun) in shooters.iter_mut() {
        let BehaviorState::Engaging { target } = *state else {
            continue;
        };
        let Ok(target_transform) = targets.get(target) else {
            continue;
        };

        let target_position = target_transform.translation;
        if !gun.in_range(transform.translation, target_position) {
            continue;
        }

        let origin = gun.muzzle(transform.translation);
        let aim_point = gun.aim_point(target_position);
        let outcome = gun.try_fire(entity, Some(target), origin, aim_point, &mut fire_events);

        report_outcome(entity, outcome, &gun, &mut reload_events);
    }
}

/// Система: башня игрока следует за курсом корпуса.
///
/// Игрок решает только когда стрелять; ствол всегда смотрит по корпусу.
pub fn aim_player_turrets(
    time: Res<Time>,
    mut vehicles: Query<(&Transform, &mut Turret), (With<PlayerCommand>, Without<Disabled>, Without<Dead>)>,
) {
    let delta = time.delta_secs();
    for (transform, mut turret) in vehicles.iter_mut() {
        let ahead = transform.translation + transform.forward() * 10.0;
        turret.aim_at(transform.translation, ahead, delta);
    }
}

/// Система: выстрел игрока по направлению башни.
///
/// Отказ, если первое препятствие на линии огня ближе
/// `minimum_fire_distance`.
pub fn player_fire<B: Resource + RayCaster>(
    backend: Res<B>,
    mut shooters: Query<
        (Entity, &Transform, &PlayerCommand, &Turret, &mut CombatController),
        (Without<Disabled>, Without<Dead>),
    >,
    mut fire_events: EventWriter<ShellFired>,
    mut reload_events: EventWriter<ReloadStarted>,
) {
    for (entity, transform, command, turret, mut gun) in shooters.iter_mut() {
        if !command.fire {
            continue;
        }

        let origin = gun.muzzle(transform.translation);
        let direction = turret.forward();
        let range = gun.config.projectile_range;

        let aim_point = match backend.cast_ray(origin, direction, range, Some(entity)) {
            Some(hit) if hit.distance < gun.config.minimum_fire_distance => {
                crate::log(&format!(
                    "Combat: {:?} shot refused, obstacle {:.1} m ahead",
                    entity, hit.distance
                ));
                continue;
            }
            Some(hit) => hit.point,
            None => origin + direction * range,
        };

        let outcome = gun.try_fire(entity, None, origin, aim_point, &mut fire_events);
        report_outcome(entity, outcome, &gun, &mut reload_events);
    }
}

fn report_outcome(
    entity: Entity,
    outcome: FireOutcome,
    gun: &CombatController,
    reload_events: &mut EventWriter<ReloadStarted>,
) {
    match outcome {
        FireOutcome::Fired => {
            crate::log(&format!(
                "Combat: {:?} fired ({} left in clip)",
                entity, gun.state.current_clip_ammo
            ));
        }
        FireOutcome::ReloadStarted => {
            crate::log(&format!("Combat: {:?} reloading", entity));
            reload_events.write(ReloadStarted {
                entity,
                duration: gun.config.reload_time,
            });
        }
        _ => {}
    }
}
