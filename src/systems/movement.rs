use anyhow::Result;

use crate::{
    components::{Move, Transform},
    ecs::Registry,
    engine::{System, SystemContext},
    rng::SystemRng,
};

/// Applies and consumes each entity's pending [`Move`].
pub struct MovementSystem {
    moved_last_tick: usize,
}

impl MovementSystem {
    pub fn new() -> Self {
        Self { moved_last_tick: 0 }
    }

    pub fn moved_last_tick(&self) -> usize {
        self.moved_last_tick
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        registry: &mut Registry,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let pending = registry.collect_linked::<(Move, Transform)>();
        for &entity in &pending {
            let step = registry.remove_component::<Move>(entity)?;
            registry.get_component_mut::<Transform>(entity)?.position += step.delta;
        }
        self.moved_last_tick = pending.len();
        Ok(())
    }
}
