use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec3;
use serde::Deserialize;

use crate::{
    components::{Camera, Collider, Launcher, Name, RigidBody, Transform},
    ecs::{Entity, Registry, RegistryConfig},
    engine::{EngineBuilder, EngineSettings},
    systems::{CameraSystem, CollisionSystem, MovementSystem, PhysicsSystem, ProjectileSystem},
};

fn default_dt_seconds() -> f32 {
    1.0 / 60.0
}

fn default_gravity() -> Vec3 {
    Vec3::new(0.0, -9.81, 0.0)
}

fn default_radius() -> f32 {
    0.5
}

fn default_mass() -> f32 {
    1.0
}

fn default_speed() -> f32 {
    10.0
}

fn default_cooldown_ticks() -> u32 {
    30
}

fn default_projectile_lifetime() -> u32 {
    60
}

fn default_projectile_radius() -> f32 {
    0.1
}

fn default_camera_offset() -> Vec3 {
    Vec3::new(0.0, 2.0, -6.0)
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_dt_seconds")]
    pub dt_seconds: f32,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub max_entities: Option<u32>,
    #[serde(default = "default_gravity")]
    pub gravity: Vec3,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub launchers: Vec<LauncherSpec>,
    #[serde(default)]
    pub camera: Option<CameraSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BodySpec {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Static bodies collide but carry no rigid body.
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LauncherSpec {
    pub position: Vec3,
    pub direction: Vec3,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_cooldown_ticks")]
    pub cooldown_ticks: u32,
    #[serde(default = "default_projectile_lifetime")]
    pub projectile_lifetime_ticks: u32,
    #[serde(default = "default_projectile_radius")]
    pub projectile_radius: f32,
    #[serde(default)]
    pub spread: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraSpec {
    /// Name of the body to follow.
    pub target: String,
    #[serde(default = "default_camera_offset")]
    pub offset: Vec3,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt_seconds.is_finite() || self.dt_seconds <= 0.0 {
            bail!("dt_seconds must be positive, got {}", self.dt_seconds);
        }
        let mut names: Vec<&str> = self.bodies.iter().map(|b| b.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            bail!("body name '{}' defined more than once", pair[0]);
        }
        for body in &self.bodies {
            if body.radius.is_nan() || body.radius <= 0.0 {
                bail!("body '{}' must have a positive radius", body.name);
            }
        }
        if let Some(camera) = &self.camera {
            if !self.bodies.iter().any(|b| b.name == camera.target) {
                bail!("camera target '{}' is not a body", camera.target);
            }
        }
        Ok(())
    }

    pub fn registry_config(&self) -> RegistryConfig {
        match self.max_entities {
            Some(max_entities) => RegistryConfig { max_entities },
            None => RegistryConfig::default(),
        }
    }

    /// Builds a registry holding every body, launcher and the camera.
    pub fn build_registry(&self) -> Result<Registry> {
        let mut registry = Registry::with_config(self.registry_config());
        let mut camera_target: Option<Entity> = None;

        for body in &self.bodies {
            let entity = registry.create_entity()?;
            registry.insert_component(entity, Name(body.name.clone()))?;
            registry.insert_component(entity, Transform::from_position(body.position))?;
            registry.insert_component(entity, Collider { radius: body.radius })?;
            if !body.is_static {
                registry.insert_component(entity, RigidBody::with_mass(body.mass, body.velocity))?;
            }
            if self.camera.as_ref().is_some_and(|c| c.target == body.name) {
                camera_target = Some(entity);
            }
        }

        for spec in &self.launchers {
            let entity = registry.create_entity()?;
            registry.insert_component(entity, Transform::from_position(spec.position))?;
            registry.insert_component(
                entity,
                Launcher {
                    direction: spec.direction,
                    speed: spec.speed,
                    cooldown_ticks: spec.cooldown_ticks,
                    remaining_ticks: 0,
                    projectile_lifetime_ticks: spec.projectile_lifetime_ticks,
                    projectile_radius: spec.projectile_radius,
                    spread: spec.spread,
                },
            )?;
        }

        if let Some(spec) = &self.camera {
            let entity = registry.create_entity()?;
            registry.create_component::<Transform>(entity)?;
            registry.insert_component(
                entity,
                Camera {
                    target: camera_target,
                    offset: spec.offset,
                },
            )?;
        }

        Ok(registry)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }

    /// Engine with the standard system order: projectiles, physics,
    /// movement, collision, camera.
    pub fn engine_builder(&self) -> EngineBuilder {
        let settings = EngineSettings {
            scenario_name: self.name.clone(),
            seed: self.seed,
            dt_seconds: self.dt_seconds,
        };
        EngineBuilder::new(settings)
            .with_system(ProjectileSystem::new())
            .with_system(PhysicsSystem::new(self.gravity))
            .with_system(MovementSystem::new())
            .with_system(CollisionSystem::new())
            .with_system(CameraSystem::new())
    }
}
