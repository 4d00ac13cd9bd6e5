use anyhow::Result;
use glam::Vec3;

use crate::{
    components::{Move, RigidBody, Transform},
    ecs::Registry,
    engine::{System, SystemContext},
    rng::SystemRng,
};

/// Integrates gravity and turns each dynamic body's velocity into this
/// tick's [`Move`].
pub struct PhysicsSystem {
    gravity: Vec3,
}

impl PhysicsSystem {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.81, 0.0))
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &str {
        "physics"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        registry: &mut Registry,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let dt = ctx.dt_seconds;
        for entity in registry.collect_linked::<(RigidBody, Transform)>() {
            let body = registry.get_component_mut::<RigidBody>(entity)?;
            if !body.is_dynamic() {
                continue;
            }
            body.velocity += self.gravity * dt;
            let delta = body.velocity * dt;
            // replaces last tick's move if movement never consumed it
            registry.create_component::<Move>(entity)?.delta = delta;
        }
        Ok(())
    }
}
