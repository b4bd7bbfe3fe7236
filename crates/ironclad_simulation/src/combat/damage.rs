//! Damage pipeline: ShellHit → armor/health → DamageDealt / EntityDied → Dead.

use bevy::prelude::*;

use crate::combat::ShellHit;
use crate::components::{Health, VehicleControls};
use crate::drive::WheelSet;

/// Event: урон нанесён.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    /// Снято с health
    pub damage: f32,
    /// Поглощено броней
    pub absorbed: f32,
    pub target_died: bool,
}

/// Event: машина уничтожена (health = 0).
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: машина уничтожена. Все controller системы её пропускают.
///
/// Обломки остаются в мире, автоматического деспавна нет.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Система: попадания снарядов → сначала броня, потом health.
///
/// Попадания в себя игнорируются. EntityDied отправляется один раз, на
/// попадании, обнулившем health.
pub fn apply_shell_hits(
    mut hit_events: EventReader<ShellHit>,
    mut targets: Query<&mut Health, Without<Dead>>,
    mut damage_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
) {
    for hit in hit_events.read() {
        if hit.shooter == hit.target {
            crate::log_warning(&format!("Combat: {:?} hit itself, ignored", hit.shooter));
            continue;
        }

        let Ok(mut health) = targets.get_mut(hit.target) else {
            continue;
        };

        let was_alive = health.is_alive();
        let before = health.current;
        let outcome = health.take_damage(hit.damage);
        let target_died = was_alive && !health.is_alive();

        damage_events.write(DamageDealt {
            attacker: hit.shooter,
            target: hit.target,
            damage: outcome.dealt,
            absorbed: outcome.absorbed,
            target_died,
        });

        crate::log(&format!(
            "Combat: {:?} hit {:?} for {:.1} (+{:.1} armor), HP {:.1} → {:.1}",
            hit.shooter, hit.target, outcome.dealt, outcome.absorbed, before, health.current
        ));

        if target_died {
            died_events.write(EntityDied {
                entity: hit.target,
                killer: Some(hit.shooter),
            });
        }
    }
}

/// Система: помечаем уничтоженные машины `Dead`, обнуляем controls, блокируем колёса.
pub fn handle_deaths(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    mut vehicles: Query<(&mut VehicleControls, Option<&mut WheelSet>)>,
) {
    for died in died_events.read() {
        let Ok(mut entity_commands) = commands.get_entity(died.entity) else {
            continue;
        };
        entity_commands.insert(Dead);

        if let Ok((mut controls, wheels)) = vehicles.get_mut(died.entity) {
            *controls = VehicleControls::default();
            if let Some(mut wheels) = wheels {
                wheels.lock();
            }
        }

        crate::log_info(&format!("Combat: {:?} destroyed by {:?}", died.entity, died.killer));
    }
}

/// Система: пассивная регенерация корпуса, пока орудие не на cooldown.
pub fn regenerate_health(time: Res<Time>, mut vehicles: Query<(&mut Health, &VehicleControls), Without<Dead>>) {
    let delta = time.delta_secs();

    for (mut health, controls) in vehicles.iter_mut() {
        if !controls.is_firing {
            health.regenerate(delta);
        }
    }
}
