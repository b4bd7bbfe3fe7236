//! Vehicle hull health with armor and passive regeneration.

use bevy::prelude::*;

/// Здоровье корпуса.
///
/// Инвариант: 0 ≤ current ≤ max, armor ≥ 0.
/// Броня принимает урон первой; регенерация доводит health только до `regen_cap`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub armor: f32,
    /// Базовая скорость (hp/с), применяется удвоенной
    pub regen_rate: f32,
    /// Регенерация останавливается на этом значении
    pub regen_cap: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Как одно попадание разделилось между броней и корпусом.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub absorbed: f32,
    pub dealt: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            armor: 0.0,
            regen_rate: 2.0,
            regen_cap: 50.0,
        }
    }

    pub fn with_armor(mut self, armor: f32) -> Self {
        self.armor = armor.max(0.0);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn percent(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    /// Нанести `amount` урона: сначала броня, остаток в health (не ниже 0).
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        let amount = amount.max(0.0);
        let absorbed = amount.min(self.armor);
        self.armor -= absorbed;

        let leftover = amount - absorbed;
        let dealt = leftover.min(self.current);
        self.current -= dealt;

        DamageOutcome { absorbed, dealt }
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    /// Пассивная регенерация за tick. Мёртвый корпус не регенерирует.
    pub fn regenerate(&mut self, delta: f32) {
        if !self.is_alive() || self.current >= self.regen_cap {
            return;
        }
        let headroom = self.regen_cap.min(self.max) - self.current;
        self.heal((2.0 * self.regen_rate * delta).min(headroom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armor_absorbs_first() {
        let mut health = Health::new(100.0).with_armor(30.0);

        let outcome = health.take_damage(20.0);
        assert_eq!(outcome, DamageOutcome { absorbed: 20.0, dealt: 0.0 });
        assert_eq!(health.current, 100.0);
        assert_eq!(health.armor, 10.0);

        let outcome = health.take_damage(25.0);
        assert_eq!(outcome, DamageOutcome { absorbed: 10.0, dealt: 15.0 });
        assert_eq!(health.current, 85.0);
        assert_eq!(health.armor, 0.0);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut health = Health::new(40.0);
        let outcome = health.take_damage(100.0);
        assert_eq!(outcome.dealt, 40.0);
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_regenerate_up_to_cap() {
        let mut health = Health::new(100.0);
        health.current = 45.0;

        // 2 * 2.0 * 1.0 = 4 per second, capped at 50
        health.regenerate(1.0);
        assert_eq!(health.current, 49.0);
        health.regenerate(1.0);
        assert_eq!(health.current, 50.0);
        health.regenerate(1.0);
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut health = Health::new(80.0);
        health.take_damage(60.0);
        assert_eq!(health.percent(), 0.25);

        health.heal(100.0);
        assert_eq!(health.current, 80.0);
        assert_eq!(health.percent(), 1.0);
    }

    #[test]
    fn test_dead_hull_does_not_regenerate() {
        let mut health = Health::new(100.0);
        health.take_damage(100.0);
        health.regenerate(5.0);
        assert_eq!(health.current, 0.0);
    }
}
