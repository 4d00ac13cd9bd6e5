use anyhow::Result;
use glam::{Quat, Vec3};
use tracing::debug;

use crate::{
    components::{Camera, Transform},
    ecs::Registry,
    engine::{System, SystemContext},
    rng::SystemRng,
};

/// Keeps follow cameras at their offset from the target, looking at it.
pub struct CameraSystem;

impl CameraSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CameraSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CameraSystem {
    fn name(&self) -> &str {
        "camera"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        registry: &mut Registry,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for entity in registry.collect_linked::<(Camera, Transform)>() {
            let camera = registry.get_component::<Camera>(entity)?;
            let (Some(target), offset) = (camera.target, camera.offset) else {
                continue;
            };
            let focus = match registry.get_component::<Transform>(target) {
                Ok(transform) => transform.position,
                Err(err) => {
                    debug!(camera = %entity, %err, "camera target unavailable, skipping");
                    continue;
                }
            };

            let eye = focus + offset;
            let transform = registry.get_component_mut::<Transform>(entity)?;
            transform.position = eye;
            let forward = (focus - eye).normalize_or_zero();
            if forward != Vec3::ZERO {
                transform.rotation = Quat::from_rotation_arc(Vec3::Z, forward);
            }
        }
        Ok(())
    }
}
