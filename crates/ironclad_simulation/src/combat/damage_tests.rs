//! Tests for the damage pipeline.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::combat::{apply_shell_hits, handle_deaths, DamageDealt, Dead, EntityDied, ShellHit};
    use crate::components::{Health, VehicleControls};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_event::<ShellHit>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_systems(Update, (apply_shell_hits, handle_deaths).chain());
        app
    }

    fn hit(app: &mut App, shooter: Entity, target: Entity, damage: f32) {
        app.world_mut().send_event(ShellHit {
            shooter,
            target,
            damage,
            point: Vec3::ZERO,
        });
    }

    #[test]
    fn test_hit_goes_through_armor_first() {
        let mut app = test_app();
        let shooter = app.world_mut().spawn(Health::default()).id();
        let target = app
            .world_mut()
            .spawn((Health::new(100.0).with_armor(10.0), VehicleControls::default()))
            .id();

        hit(&mut app, shooter, target, 25.0);
        app.update();

        let health = app.world().get::<Health>(target).unwrap();
        assert_eq!(health.armor, 0.0);
        assert_eq!(health.current, 85.0);

        let dealt: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<DamageDealt>>()
            .drain()
            .collect();
        assert_eq!(dealt.len(), 1);
        assert_eq!(dealt[0].damage, 15.0);
        assert_eq!(dealt[0].absorbed, 10.0);
        assert!(!dealt[0].target_died);
    }

    #[test]
    fn test_self_hit_discarded() {
        let mut app = test_app();
        let tank = app.world_mut().spawn((Health::default(), VehicleControls::default())).id();

        hit(&mut app, tank, tank, 50.0);
        app.update();

        assert_eq!(app.world().get::<Health>(tank).unwrap().current, 100.0);
    }

    #[test]
    fn test_lethal_hit_marks_dead_once() {
        let mut app = test_app();
        let shooter = app.world_mut().spawn(Health::default()).id();
        let target = app
            .world_mut()
            .spawn((
                Health::new(30.0),
                VehicleControls {
                    throttle: 1.0,
                    steer: 0.5,
                    ..Default::default()
                },
            ))
            .id();

        // Two hits in the same tick: only one death
        hit(&mut app, shooter, target, 25.0);
        hit(&mut app, shooter, target, 25.0);
        app.update();

        let world = app.world();
        assert!(world.get::<Dead>(target).is_some());
        assert_eq!(world.get::<Health>(target).unwrap().current, 0.0);
        assert_eq!(*world.get::<VehicleControls>(target).unwrap(), VehicleControls::default());

        let died: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<EntityDied>>()
            .drain()
            .collect();
        assert_eq!(died.len(), 1);
        assert_eq!(died[0].killer, Some(shooter));
    }

    #[test]
    fn test_dead_target_takes_no_more_hits() {
        let mut app = test_app();
        let shooter = app.world_mut().spawn(Health::default()).id();
        let target = app.world_mut().spawn((Health::new(10.0), VehicleControls::default())).id();

        hit(&mut app, shooter, target, 50.0);
        app.update();
        app.world_mut().resource_mut::<Events<DamageDealt>>().clear();

        hit(&mut app, shooter, target, 50.0);
        app.update();

        let dealt: Vec<_> = app
            .world_mut()
            .resource_mut::<Events<DamageDealt>>()
            .drain()
            .collect();
        assert!(dealt.is_empty());
    }
}
