//! Path planning system (logic tick).

use bevy::prelude::*;

use crate::ai::BehaviorState;
use crate::combat::Dead;
use crate::components::{Disabled, Vehicle};
use crate::navigation::{PathPlanner, PlanEvent};
use crate::services::NavigationOracle;
use crate::DeterministicRng;

/// Система: выбор точек назначения + обновление путей.
///
/// Roaming → случайная точка (sample_position), бросаем по прибытии/give-up.
/// Engaging → текущая позиция цели, прижатая к walkable поверхности,
/// re-plan по завершении пути или раз в `recalc_interval`.
pub fn plan_paths<B: Resource + NavigationOracle>(
    time: Res<Time>,
    backend: Res<B>,
    mut rng: ResMut<DeterministicRng>,
    mut planners: Query<
        (Entity, &Transform, &BehaviorState, &mut PathPlanner),
        (With<Vehicle>, Without<Disabled>, Without<Dead>),
    >,
    targets: Query<&Transform, (With<Vehicle>, Without<Dead>)>,
) {
    let delta = time.delta_secs();

    for (entity, transform, state, mut planner) in planners.iter_mut() {
        let position = transform.translation;

        match state {
            BehaviorState::Roaming => {
                let event = planner.update_roaming(backend.as_ref(), &mut rng.rng, position, delta);
                match event {
                    PlanEvent::NewDestination => {
                        if let Some(destination) = planner.destination {
                            crate::log(&format!(
                                "Navigation: {:?} roaming to ({:.1}, {:.1}), {} waypoint(s)",
                                entity,
                                destination.x,
                                destination.z,
                                planner.path.remaining()
                            ));
                        }
                    }
                    PlanEvent::Abandoned => {
                        crate::log(&format!("Navigation: {:?} dropped roam destination", entity));
                    }
                    _ => {}
                }
            }
            BehaviorState::Engaging { target } => {
                // Живость цели проверяет behavior система; здесь просто ждём tick
                let Ok(target_transform) = targets.get(*target) else {
                    continue;
                };
                planner.update_engaging(backend.as_ref(), position, target_transform.translation, delta);
            }
        }
    }
}
