mod camera;
mod collision;
mod movement;
mod physics;
mod projectile;

pub use camera::CameraSystem;
pub use collision::CollisionSystem;
pub use movement::MovementSystem;
pub use physics::PhysicsSystem;
pub use projectile::ProjectileSystem;
