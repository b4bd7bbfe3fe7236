//! Vehicle core components: Vehicle, controls, telemetry, control source.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Health;
use crate::error::ConfigError;

/// Боевая машина (AI или игрок).
///
/// Health, VehicleControls, VehicleTelemetry и ControlSource подтягиваются
/// через required components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Health, VehicleControls, VehicleTelemetry, ControlSource)]
pub struct Vehicle {
    /// Машины с разными faction_id враждебны друг другу
    pub faction_id: u64,
}

impl Vehicle {
    pub fn is_hostile_to(&self, other: &Vehicle) -> bool {
        self.faction_id != other.faction_id
    }
}

/// Resolved control surface for the current tick.
///
/// Invariant: throttle ∈ [0, 1], steer ∈ [-1, 1], brake ∈ [0, 1].
/// Positive steer turns right.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct VehicleControls {
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    pub is_reversing: bool,
    /// Орудие на cooldown; блокирует регенерацию корпуса
    pub is_firing: bool,
}

/// Физическое состояние, пишется physics backend каждый fixed tick.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct VehicleTelemetry {
    pub velocity: Vec3,
    /// |velocity|
    pub speed: f32,
    /// Скорость со знаком вдоль forward корпуса (отрицательная при реверсе)
    pub forward_speed: f32,
    pub wheel_rpm: f32,
}

/// Кто управляет машиной.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(rename_all = "snake_case")]
pub enum ControlSource {
    #[default]
    Ai,
    Player,
}

/// Raw player input, written by whatever input layer the host has.
///
/// `drive` ∈ [-1, 1]: positive forward, negative reverse.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerCommand {
    pub drive: f32,
    pub steer: f32,
    pub brake: bool,
    pub fire: bool,
}

/// Машина не прошла валидацию config и остаётся неподвижной.
#[derive(Component, Debug, Clone)]
pub struct Disabled(pub ConfigError);
