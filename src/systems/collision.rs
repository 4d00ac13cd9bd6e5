use anyhow::Result;
use glam::Vec3;

use crate::{
    components::{Collider, RigidBody, Transform},
    ecs::{Entity, Registry},
    engine::{System, SystemContext},
    rng::SystemRng,
};

/// Sphere-sphere contact resolution.
///
/// Overlapping pairs are pushed apart in proportion to their inverse masses
/// and lose the velocity component that closes the gap. Entities without a
/// rigid body, or with zero inverse mass, never move.
pub struct CollisionSystem {
    contacts_last_tick: usize,
    total_contacts: u64,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self {
            contacts_last_tick: 0,
            total_contacts: 0,
        }
    }

    pub fn contacts_last_tick(&self) -> usize {
        self.contacts_last_tick
    }

    pub fn total_contacts(&self) -> u64 {
        self.total_contacts
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn inverse_mass(registry: &Registry, entity: Entity) -> f32 {
    registry
        .get_component::<RigidBody>(entity)
        .map(|body| body.inverse_mass)
        .unwrap_or(0.0)
}

fn velocity(registry: &Registry, entity: Entity) -> Vec3 {
    registry
        .get_component::<RigidBody>(entity)
        .map(|body| body.velocity)
        .unwrap_or(Vec3::ZERO)
}

fn sphere(registry: &Registry, entity: Entity) -> Result<(Vec3, f32)> {
    let position = registry.get_component::<Transform>(entity)?.position;
    let radius = registry.get_component::<Collider>(entity)?.radius;
    Ok((position, radius))
}

impl System for CollisionSystem {
    fn name(&self) -> &str {
        "collision"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        registry: &mut Registry,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let colliders = registry.collect_linked::<(Collider, Transform)>();
        let mut contacts = 0;
        for (i, &a) in colliders.iter().enumerate() {
            for &b in &colliders[i + 1..] {
                let (pa, ra) = sphere(registry, a)?;
                let (pb, rb) = sphere(registry, b)?;
                let offset = pb - pa;
                let distance = offset.length();
                let overlap = ra + rb - distance;
                if overlap <= 0.0 {
                    continue;
                }
                contacts += 1;

                let inv_a = inverse_mass(registry, a);
                let inv_b = inverse_mass(registry, b);
                let total = inv_a + inv_b;
                if total <= 0.0 {
                    continue;
                }
                let normal = if distance > f32::EPSILON {
                    offset / distance
                } else {
                    Vec3::Y
                };

                registry.get_component_mut::<Transform>(a)?.position -= normal * overlap * inv_a / total;
                registry.get_component_mut::<Transform>(b)?.position += normal * overlap * inv_b / total;

                let closing = (velocity(registry, b) - velocity(registry, a)).dot(normal);
                if closing < 0.0 {
                    let impulse = -closing / total;
                    if let Ok(body) = registry.get_component_mut::<RigidBody>(a) {
                        body.velocity -= normal * impulse * inv_a;
                    }
                    if let Ok(body) = registry.get_component_mut::<RigidBody>(b) {
                        body.velocity += normal * impulse * inv_b;
                    }
                }
            }
        }
        self.contacts_last_tick = contacts;
        self.total_contacts += contacts as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngManager;

    fn spawn_sphere(registry: &mut Registry, position: Vec3, radius: f32, body: Option<RigidBody>) -> Entity {
        let entity = registry.create_entity().unwrap();
        registry
            .insert_component(entity, Transform::from_position(position))
            .unwrap();
        registry.insert_component(entity, Collider { radius }).unwrap();
        if let Some(body) = body {
            registry.insert_component(entity, body).unwrap();
        }
        entity
    }

    fn run(system: &mut CollisionSystem, registry: &mut Registry) {
        let mut rng = RngManager::new(0);
        let ctx = SystemContext {
            tick: 1,
            dt_seconds: 0.1,
            scenario_name: "test",
        };
        system
            .run(&ctx, registry, &mut rng.stream("collision"))
            .unwrap();
    }

    #[test]
    fn ball_resting_on_static_ground_is_pushed_out() {
        let mut registry = Registry::new();
        let ground = spawn_sphere(&mut registry, Vec3::new(0.0, -1.0, 0.0), 1.0, None);
        let ball = spawn_sphere(
            &mut registry,
            Vec3::new(0.0, 0.25, 0.0),
            0.5,
            Some(RigidBody::with_mass(1.0, Vec3::new(0.0, -3.0, 0.0))),
        );

        let mut system = CollisionSystem::new();
        run(&mut system, &mut registry);

        assert_eq!(system.contacts_last_tick(), 1);
        let position = registry.get_component::<Transform>(ball).unwrap().position;
        assert!((position.y - 0.5).abs() < 1e-5, "ball at {position}");
        let body = registry.get_component::<RigidBody>(ball).unwrap();
        assert!(body.velocity.y.abs() < 1e-5);
        let ground_position = registry.get_component::<Transform>(ground).unwrap().position;
        assert_eq!(ground_position, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn equal_masses_split_the_correction() {
        let mut registry = Registry::new();
        let a = spawn_sphere(
            &mut registry,
            Vec3::ZERO,
            1.0,
            Some(RigidBody::with_mass(1.0, Vec3::X)),
        );
        let b = spawn_sphere(
            &mut registry,
            Vec3::new(1.0, 0.0, 0.0),
            1.0,
            Some(RigidBody::with_mass(1.0, -Vec3::X)),
        );

        let mut system = CollisionSystem::new();
        run(&mut system, &mut registry);

        let pa = registry.get_component::<Transform>(a).unwrap().position;
        let pb = registry.get_component::<Transform>(b).unwrap().position;
        assert!((pa.x + 0.5).abs() < 1e-5);
        assert!((pb.x - 1.5).abs() < 1e-5);
        let va = registry.get_component::<RigidBody>(a).unwrap().velocity;
        let vb = registry.get_component::<RigidBody>(b).unwrap().velocity;
        assert!(va.length() < 1e-5 && vb.length() < 1e-5);
    }

    #[test]
    fn separated_spheres_do_not_touch() {
        let mut registry = Registry::new();
        spawn_sphere(&mut registry, Vec3::ZERO, 0.5, None);
        spawn_sphere(&mut registry, Vec3::new(3.0, 0.0, 0.0), 0.5, None);

        let mut system = CollisionSystem::new();
        run(&mut system, &mut registry);
        assert_eq!(system.contacts_last_tick(), 0);
        assert_eq!(system.total_contacts(), 0);
    }
}
