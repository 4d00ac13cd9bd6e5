use glam::{Quat, Vec3};

use crate::ecs::{Component, Entity};

#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

impl Component for Transform {}

/// Sphere collider centred on the entity's transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    pub radius: f32,
}

impl Default for Collider {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}

impl Component for Collider {}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RigidBody {
    pub velocity: Vec3,
    /// Zero for immovable bodies.
    pub inverse_mass: f32,
}

impl RigidBody {
    pub fn with_mass(mass: f32, velocity: Vec3) -> Self {
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        Self {
            velocity,
            inverse_mass,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.inverse_mass > 0.0
    }
}

impl Component for RigidBody {}

/// Displacement to apply this tick. Re-created by physics every tick and
/// consumed by movement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Move {
    pub delta: Vec3,
}

impl Component for Move {}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projectile {
    pub age_ticks: u32,
    pub lifetime_ticks: u32,
}

impl Projectile {
    pub fn is_expired(&self) -> bool {
        self.age_ticks >= self.lifetime_ticks
    }
}

impl Component for Projectile {}

#[derive(Clone, Debug, PartialEq)]
pub struct Launcher {
    pub direction: Vec3,
    pub speed: f32,
    pub cooldown_ticks: u32,
    pub remaining_ticks: u32,
    pub projectile_lifetime_ticks: u32,
    pub projectile_radius: f32,
    /// Maximum per-axis jitter added to the normalised direction.
    pub spread: f32,
}

impl Default for Launcher {
    fn default() -> Self {
        Self {
            direction: Vec3::X,
            speed: 10.0,
            cooldown_ticks: 30,
            remaining_ticks: 0,
            projectile_lifetime_ticks: 60,
            projectile_radius: 0.1,
            spread: 0.0,
        }
    }
}

impl Component for Launcher {}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub target: Option<Entity>,
    pub offset: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: None,
            offset: Vec3::new(0.0, 2.0, -6.0),
        }
    }
}

impl Component for Camera {}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Name(pub String);

impl Component for Name {}
