//! Drive systems (physics tick).

use bevy::prelude::*;

use crate::ai::{BehaviorConfig, BehaviorState};
use crate::combat::Dead;
use crate::components::{ControlSource, Disabled, PlayerCommand, Vehicle, VehicleControls, VehicleTelemetry};
use crate::drive::{steer_toward, DriveController, DriveIntent, WheelSet};
use crate::navigation::PathPlanner;
use crate::sensors::SteeringSensorArray;

/// Система: AI path-follow intent к текущему waypoint.
///
/// Нет waypoint → накатом. В Engaging газ отпускается внутри standoff
/// distance, чтобы не таранить цель.
pub fn follow_path(
    mut drivers: Query<
        (
            &Transform,
            &PathPlanner,
            &BehaviorState,
            &BehaviorConfig,
            &DriveController,
            &mut DriveIntent,
        ),
        (Without<Disabled>, Without<Dead>),
    >,
    targets: Query<&Transform, With<Vehicle>>,
) {
    for (transform, planner, state, behavior, drive, mut intent) in drivers.iter_mut() {
        let Some(waypoint) = planner.path.current() else {
            *intent = DriveIntent::default();
            continue;
        };

        let mut next = steer_toward(transform, waypoint, drive.config.slowdown_distance);

        if let Some(target) = state.target().and_then(|target| targets.get(target).ok()) {
            let standoff = behavior.engage_standoff_distance;
            if transform.translation.distance_squared(target.translation) <= standoff * standoff {
                next.throttle = 0.0;
            }
        }

        *intent = next;
    }
}

/// Система: ввод игрока → drive intent (ручной реверс, без avoidance).
pub fn player_intent(mut drivers: Query<(&PlayerCommand, &mut DriveIntent), (Without<Disabled>, Without<Dead>)>) {
    for (command, mut intent) in drivers.iter_mut() {
        let drive = command.drive.clamp(-1.0, 1.0);
        *intent = DriveIntent {
            throttle: drive.abs(),
            steer: command.steer.clamp(-1.0, 1.0),
            brake: if command.brake { 1.0 } else { 0.0 },
            reverse: drive < 0.0,
        };
    }
}

/// Система: intent + avoidance + recovery → команды колёсам.
///
/// Попутно пишет `VehicleControls` (наружный интерфейс).
pub fn apply_drive(
    time: Res<Time>,
    mut vehicles: Query<
        (
            Entity,
            &Transform,
            &VehicleTelemetry,
            &ControlSource,
            &DriveIntent,
            Option<&SteeringSensorArray>,
            &mut DriveController,
            &mut WheelSet,
            &mut VehicleControls,
        ),
        (With<Vehicle>, Without<Disabled>, Without<Dead>),
    >,
) {
    let delta = time.delta_secs();

    for (entity, transform, telemetry, source, intent, sensors, mut drive, mut wheels, mut controls) in
        vehicles.iter_mut()
    {
        // Игроку avoidance override не положен
        let correction = match source {
            ControlSource::Ai => sensors.map(|array| &array.correction),
            ControlSource::Player => None,
        };

        let was_recovering = drive.recovery.is_reversing();
        let output = drive.resolve(intent, correction, transform.translation, telemetry.speed, delta);
        let recovering = drive.recovery.is_reversing();

        if recovering != was_recovering {
            let message = if recovering {
                format!("Drive: {:?} stalled, reversing out", entity)
            } else {
                format!("Drive: {:?} recovered, resuming", entity)
            };
            crate::log(&message);
        }

        output.apply(&mut *wheels);

        controls.throttle = output.throttle;
        controls.steer = output.steer;
        controls.brake = output.brake;
        controls.is_reversing = output.is_reversing;
    }
}
