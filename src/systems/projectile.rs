use anyhow::Result;
use glam::Vec3;
use rand::Rng;
use tracing::{debug, trace};

use crate::{
    components::{Collider, Launcher, Projectile, RigidBody, Transform},
    ecs::{EcsError, Entity, Registry},
    engine::{System, SystemContext},
    rng::SystemRng,
};

/// Ages and expires projectiles, and fires launchers whose cooldown elapsed.
pub struct ProjectileSystem {
    fired: u64,
    expired: u64,
}

impl ProjectileSystem {
    pub fn new() -> Self {
        Self {
            fired: 0,
            expired: 0,
        }
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    pub fn expired(&self) -> u64 {
        self.expired
    }

    fn expire(&mut self, registry: &mut Registry) -> Result<()> {
        for entity in registry.entity_container::<Projectile>() {
            let projectile = registry.get_component_mut::<Projectile>(entity)?;
            projectile.age_ticks += 1;
            if projectile.is_expired() {
                registry.destroy_entity(entity)?;
                self.expired += 1;
                trace!(%entity, "projectile expired");
            }
        }
        Ok(())
    }

    fn spawn(
        registry: &mut Registry,
        origin: Vec3,
        launcher: &Launcher,
        rng: &mut SystemRng<'_>,
    ) -> Result<Option<Entity>> {
        let mut direction = launcher.direction.normalize_or_zero();
        if launcher.spread > 0.0 {
            let s = launcher.spread;
            direction += Vec3::new(
                rng.gen_range(-s..=s),
                rng.gen_range(-s..=s),
                rng.gen_range(-s..=s),
            );
            direction = direction.normalize_or_zero();
        }

        let entity = match registry.create_entity() {
            Ok(entity) => entity,
            Err(err @ EcsError::ResourceExhausted { .. }) => {
                debug!(%err, "launcher skipped this tick");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        registry.insert_component(entity, Transform::from_position(origin))?;
        registry.insert_component(entity, RigidBody::with_mass(1.0, direction * launcher.speed))?;
        registry.insert_component(
            entity,
            Collider {
                radius: launcher.projectile_radius,
            },
        )?;
        registry.insert_component(
            entity,
            Projectile {
                age_ticks: 0,
                lifetime_ticks: launcher.projectile_lifetime_ticks,
            },
        )?;
        Ok(Some(entity))
    }
}

impl Default for ProjectileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProjectileSystem {
    fn name(&self) -> &str {
        "projectile"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        registry: &mut Registry,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        self.expire(registry)?;

        for entity in registry.collect_linked::<(Launcher, Transform)>() {
            let origin = registry.get_component::<Transform>(entity)?.position;
            let launcher = registry.get_component_mut::<Launcher>(entity)?;
            if launcher.remaining_ticks > 0 {
                launcher.remaining_ticks -= 1;
                continue;
            }
            launcher.remaining_ticks = launcher.cooldown_ticks;
            let launcher = launcher.clone();
            if let Some(projectile) = Self::spawn(registry, origin, &launcher, rng)? {
                self.fired += 1;
                trace!(launcher = %entity, %projectile, "projectile fired");
            }
        }
        Ok(())
    }
}
