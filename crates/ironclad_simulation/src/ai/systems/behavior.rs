//! Behavior state machine systems (logic tick).

use bevy::prelude::*;

use crate::ai::{
    select_closest_target, within_engagement_range, BehaviorChanged, BehaviorConfig, BehaviorState,
    TransitionReason, Turret,
};
use crate::combat::Dead;
use crate::components::{Disabled, Vehicle};
use crate::navigation::PathPlanner;
use crate::perception::PerceptionModule;

/// Система: переходы Roaming ↔ Engaging (edge-triggered).
///
/// Roaming: последний scan не пустой → атакуем ближайшего врага, roam path
/// сбрасывается, perception выключается.
/// Engaging: цель пропала или дальше `max_engage_distance` → обратно в
/// Roaming, chase path сбрасывается, perception снова armed. Без гистерезиса.
pub fn update_behavior_state(
    mut vehicles: Query<
        (
            Entity,
            &Transform,
            &BehaviorConfig,
            &mut BehaviorState,
            &mut PerceptionModule,
            &mut PathPlanner,
        ),
        (With<Vehicle>, Without<Disabled>, Without<Dead>),
    >,
    targets: Query<&Transform, (With<Vehicle>, Without<Dead>)>,
    mut changed_events: EventWriter<BehaviorChanged>,
) {
    for (entity, transform, config, mut state, mut perception, mut planner) in vehicles.iter_mut() {
        let position = transform.translation;
        let previous = *state;

        let transition = match previous {
            BehaviorState::Roaming => {
                if perception.results.is_empty() {
                    None
                } else {
                    let candidates = perception
                        .results
                        .iter()
                        .filter_map(|&candidate| targets.get(candidate).ok().map(|t| (candidate, t.translation)));

                    match select_closest_target(position, candidates) {
                        Some(target) => Some((BehaviorState::Engaging { target }, TransitionReason::HostileSpotted)),
                        None => {
                            // Все кандидаты исчезли между scan и решением
                            perception.results.clear();
                            None
                        }
                    }
                }
            }
            BehaviorState::Engaging { target } => match targets.get(target) {
                Err(_) => Some((BehaviorState::Roaming, TransitionReason::TargetLost)),
                Ok(target_transform)
                    if !within_engagement_range(position, target_transform.translation, config.max_engage_distance) =>
                {
                    Some((BehaviorState::Roaming, TransitionReason::TargetOutOfRange))
                }
                Ok(_) => None,
            },
        };

        let Some((next, reason)) = transition else {
            continue;
        };

        match next {
            BehaviorState::Engaging { .. } => perception.disarm(),
            BehaviorState::Roaming => perception.arm(),
        }
        planner.clear();
        *state = next;

        crate::log_info(&format!(
            "Behavior: {:?} {} → {} ({:?})",
            entity,
            previous.name(),
            next.name(),
            reason
        ));

        changed_events.write(BehaviorChanged {
            entity,
            previous,
            current: next,
            reason,
        });
    }
}

/// Система: поворот башни к цели (Engaging) или по курсу корпуса.
pub fn aim_turrets(
    time: Res<Time>,
    mut vehicles: Query<(&Transform, &BehaviorState, &mut Turret), (Without<Disabled>, Without<Dead>)>,
    targets: Query<&Transform, With<Vehicle>>,
) {
    let delta = time.delta_secs();

    for (transform, state, mut turret) in vehicles.iter_mut() {
        let aim_point = state
            .target()
            .and_then(|target| targets.get(target).ok())
            .map(|target| target.translation)
            .unwrap_or_else(|| transform.translation + transform.forward() * 10.0);

        turret.aim_at(transform.translation, aim_point, delta);
    }
}
