use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    ecs::Registry,
    rng::{RngManager, SystemRng},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub dt_seconds: f32,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            settings: self.settings,
            tick: 0,
            total_time: Duration::ZERO,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
    tick: u64,
    total_time: Duration,
}

impl Engine {
    pub fn run(&mut self, registry: &mut Registry, ticks: u64) -> Result<RunReport> {
        self.run_with_hook(registry, ticks, |_| {})
    }

    /// Runs `ticks` ticks, handing each tick's stats to `hook`.
    pub fn run_with_hook<F>(
        &mut self,
        registry: &mut Registry,
        ticks: u64,
        mut hook: F,
    ) -> Result<RunReport>
    where
        F: FnMut(&TickStats),
    {
        info!(
            scenario = %self.settings.scenario_name,
            ticks,
            entities = registry.entity_count(),
            "run started"
        );
        for _ in 0..ticks {
            let stats = self.tick(registry)?;
            hook(&stats);
        }
        let report = self.report(registry);
        info!(
            scenario = %self.settings.scenario_name,
            ticks = report.ticks,
            entities = report.final_entity_count,
            "run finished"
        );
        Ok(report)
    }

    /// Runs every system once, in registration order.
    pub fn tick(&mut self, registry: &mut Registry) -> Result<TickStats> {
        self.tick += 1;
        let tick_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            let ctx = SystemContext {
                tick: self.tick,
                dt_seconds: self.settings.dt_seconds,
                scenario_name: &self.settings.scenario_name,
            };
            let start = Instant::now();
            system
                .run(&ctx, registry, &mut rng_stream)
                .with_context(|| format!("system '{}' failed on tick {}", system.name(), self.tick))?;
            system_times.push((system.name().to_string(), start.elapsed()));
        }
        let duration = tick_start.elapsed();
        self.total_time += duration;

        let stats = TickStats {
            tick: self.tick,
            duration,
            system_times,
            entity_count: registry.entity_count(),
        };
        debug!(
            tick = stats.tick,
            duration_us = stats.duration.as_micros() as u64,
            entities = stats.entity_count,
            systems = %format_system_times(&stats.system_times),
            "tick complete"
        );
        Ok(stats)
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn report(&self, registry: &Registry) -> RunReport {
        let average_tick_ms = if self.tick == 0 {
            0.0
        } else {
            self.total_time.as_secs_f64() * 1_000.0 / self.tick as f64
        };
        RunReport {
            scenario: self.settings.scenario_name.clone(),
            seed: self.rng.master_seed(),
            ticks: self.tick,
            final_entity_count: registry.entity_count(),
            average_tick_ms,
            component_types: registry
                .registered_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// `name=micros` pairs in run order, e.g. `physics=12us movement=3us`.
fn format_system_times(times: &[(String, Duration)]) -> String {
    times
        .iter()
        .map(|(name, elapsed)| format!("{name}={}us", elapsed.as_micros()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Statistics for a single tick
#[derive(Debug, Clone)]
pub struct TickStats {
    pub tick: u64,
    pub duration: Duration,
    pub system_times: Vec<(String, Duration)>,
    pub entity_count: usize,
}

/// Summary of a run. Carries timings and counts, never entity state.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub seed: u64,
    pub ticks: u64,
    pub final_entity_count: usize,
    pub average_tick_ms: f64,
    pub component_types: Vec<String>,
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub dt_seconds: f32,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        registry: &mut Registry,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
