//! Tests for the combat controller (fire cadence, ammo, reload).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::combat::{CombatController, FireOutcome, ShellFired, WeaponConfig};
    use crate::error::ConfigError;

    const SHOOTER: Entity = Entity::PLACEHOLDER;

    fn fire(gun: &mut CombatController, shots: &mut Vec<ShellFired>) -> FireOutcome {
        gun.try_fire(SHOOTER, None, Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), shots)
    }

    #[test]
    fn test_spawns_loaded() {
        let gun = CombatController::default();
        assert_eq!(gun.state.current_clip_ammo, 5);
        assert_eq!(gun.state.total_ammo, 40);
        assert!(!gun.state.is_reloading);
        assert!(!gun.is_firing());
    }

    #[test]
    fn test_fire_decrements_clip_and_starts_cooldown() {
        let mut gun = CombatController::default();
        let mut shots = Vec::new();

        assert!(fire(&mut gun, &mut shots).fired());
        assert_eq!(gun.state.current_clip_ammo, 4);
        assert_eq!(gun.state.fire_cooldown_remaining, 2.0);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].direction, Vec3::NEG_Z);
        assert_eq!(shots[0].damage, 25.0);
        assert!(gun.is_firing());
    }

    #[test]
    fn test_cooldown_blocks_until_elapsed() {
        let mut gun = CombatController::default();
        let mut shots = Vec::new();

        fire(&mut gun, &mut shots);
        assert_eq!(fire(&mut gun, &mut shots), FireOutcome::CoolingDown);

        gun.tick(1.0);
        assert_eq!(fire(&mut gun, &mut shots), FireOutcome::CoolingDown);

        gun.tick(1.0);
        assert_eq!(fire(&mut gun, &mut shots), FireOutcome::Fired);
        assert_eq!(shots.len(), 2);
    }

    #[test]
    fn test_empty_clip_starts_reload_once() {
        let mut gun = CombatController::default();
        gun.state.current_clip_ammo = 0;
        let mut shots = Vec::new();

        assert_eq!(fire(&mut gun, &mut shots), FireOutcome::ReloadStarted);
        assert!(gun.state.is_reloading);
        assert_eq!(gun.state.reload_remaining, 3.0);

        gun.tick(1.0);
        let remaining = gun.state.reload_remaining;

        // Second attempt before completion: no shot, timer untouched
        assert_eq!(fire(&mut gun, &mut shots), FireOutcome::Reloading);
        assert_eq!(gun.state.reload_remaining, remaining);
        assert!(shots.is_empty());
    }

    #[test]
    fn test_reload_refills_up_to_clip_size() {
        let mut gun = CombatController::default();
        gun.state.current_clip_ammo = 0;
        gun.begin_reload();

        assert!(!gun.tick(2.9));
        assert!(gun.tick(0.2));
        assert_eq!(gun.state.current_clip_ammo, 5);
        assert_eq!(gun.state.total_ammo, 35);
        assert!(!gun.state.is_reloading);
    }

    #[test]
    fn test_reload_with_short_reserve() {
        let mut gun = CombatController::default();
        gun.state.current_clip_ammo = 0;
        gun.state.total_ammo = 3;
        gun.begin_reload();
        gun.tick(3.0);

        assert_eq!(gun.state.current_clip_ammo, 3);
        assert_eq!(gun.state.total_ammo, 0);
    }

    #[test]
    fn test_out_of_ammo_never_reloads() {
        let mut gun = CombatController::default();
        gun.state.current_clip_ammo = 0;
        gun.state.total_ammo = 0;
        let mut shots = Vec::new();

        assert_eq!(fire(&mut gun, &mut shots), FireOutcome::OutOfAmmo);
        assert!(!gun.state.is_reloading);
        assert!(!gun.begin_reload());
    }

    #[test]
    fn test_aim_point_offset_and_range() {
        let gun = CombatController::default();
        assert_eq!(gun.aim_point(Vec3::new(5.0, 0.0, 5.0)), Vec3::new(5.0, 2.0, 5.0));
        assert_eq!(gun.muzzle(Vec3::ZERO), Vec3::new(0.0, 2.0, 0.0));
        assert!(gun.in_range(Vec3::ZERO, Vec3::new(999.0, 0.0, 0.0)));
        assert!(!gun.in_range(Vec3::ZERO, Vec3::new(1001.0, 0.0, 0.0)));
    }

    #[test]
    fn test_degenerate_aim_falls_back_to_forward() {
        let mut gun = CombatController::default();
        let mut shots = Vec::new();
        gun.try_fire(SHOOTER, None, Vec3::ONE, Vec3::ONE, &mut shots);
        assert_eq!(shots[0].direction, Vec3::NEG_Z);
    }

    #[test]
    fn test_config_validation() {
        assert!(WeaponConfig::default().validate().is_ok());

        let no_clip = WeaponConfig {
            clip_size: 0,
            ..Default::default()
        };
        assert_eq!(no_clip.validate(), Err(ConfigError::EmptyClip));

        let no_cadence = WeaponConfig {
            fire_rate: 0.0,
            ..Default::default()
        };
        assert!(no_cadence.validate().is_err());
    }
}
