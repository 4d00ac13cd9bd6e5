pub mod components;
pub mod ecs;
pub mod engine;
pub mod rng;
pub mod scenario;
pub mod systems;

pub use ecs::{EcsError, EcsResult, Entity, Registry, RegistryConfig};
pub use engine::{Engine, EngineBuilder, EngineSettings, RunReport, TickStats};
pub use scenario::{Scenario, ScenarioLoader};
