//! Rigid-body simulator boundary.
//!
//! The scene never integrates bodies itself. It talks to an external
//! simulator through the [`Simulator`] trait, which mirrors the contract the
//! rigidbody components rely on:
//!
//! 1. `create_body(mass, moment, kind)` then `create_shape(body, desc)`
//! 2. `add(body, shape)` registers both with the simulated world
//! 3. position/angle/velocity are read and written per body, angles in radians
//! 4. `apply_force_at_world_point` accumulates a force for the next step only
//! 5. `step(dt)` advances the world by one fixed step
//!
//! Bodies created but not yet added may still be positioned; they do not take
//! part in stepping until [`Simulator::add`] is called.
//!
//! [`RapierSimulator`] is the default backend.

mod rapier;

use bevy_ecs::prelude::Resource;

use crate::error::Result;
use crate::math::Vec2;

pub use rapier::RapierSimulator;

/// Opaque handle to a simulator body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Opaque handle to a simulator shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub u64);

/// Whether a body is moved by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    /// Immovable. Only repositioned explicitly by gameplay code.
    Static,
}

/// Collision geometry, in body-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    /// Axis-aligned box centred on the body.
    Box { width: f32, height: f32 },
    Circle { radius: f32 },
    /// Segment from `a` to `b`, inflated by `radius`.
    Segment { a: Vec2, b: Vec2, radius: f32 },
}

/// Full shape description handed to [`Simulator::create_shape`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDesc {
    pub kind: ShapeKind,
    pub friction: f32,
    pub elasticity: f32,
}

impl ShapeDesc {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            friction: 0.7,
            elasticity: 0.0,
        }
    }
}

/// Contract between the scene and an external rigid-body simulator.
///
/// Getters return `None` for unknown handles; mutators on unknown handles
/// return [`EngineError::UnknownBody`](crate::error::EngineError::UnknownBody).
pub trait Simulator: Send + Sync {
    /// Create a body. `moment` may be `f32::INFINITY` to forbid rotation.
    fn create_body(&mut self, mass: f32, moment: f32, kind: BodyKind) -> BodyHandle;

    /// Create a shape attached to `body`.
    fn create_shape(&mut self, body: BodyHandle, desc: ShapeDesc) -> Result<ShapeHandle>;

    /// Register a body and one of its shapes with the simulated world.
    fn add(&mut self, body: BodyHandle, shape: ShapeHandle) -> Result<()>;

    /// Destroy a body and every shape attached to it. Unknown handles are
    /// ignored.
    fn remove(&mut self, body: BodyHandle);

    fn contains(&self, body: BodyHandle) -> bool;

    fn position(&self, body: BodyHandle) -> Option<Vec2>;
    fn set_position(&mut self, body: BodyHandle, position: Vec2) -> Result<()>;

    /// Body angle in radians.
    fn angle(&self, body: BodyHandle) -> Option<f32>;
    fn set_angle(&mut self, body: BodyHandle, radians: f32) -> Result<()>;

    fn velocity(&self, body: BodyHandle) -> Option<Vec2>;
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> Result<()>;

    fn mass(&self, body: BodyHandle) -> Option<f32>;

    /// Apply `force` at world-space `point` during the next step. Forces are
    /// cleared after every step.
    fn apply_force_at_world_point(&mut self, body: BodyHandle, force: Vec2, point: Vec2)
    -> Result<()>;

    /// Instantaneous change of momentum through the centre of mass.
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) -> Result<()>;

    fn gravity(&self) -> Vec2;
    fn set_gravity(&mut self, gravity: Vec2);

    /// Advance the simulated world by `dt` seconds.
    fn step(&mut self, dt: f32);
}

/// Per-scene resource owning the simulator.
#[derive(Resource)]
pub struct PhysicsWorld {
    simulator: Box<dyn Simulator>,
    steps: u64,
}

impl PhysicsWorld {
    pub fn new(simulator: Box<dyn Simulator>) -> Self {
        Self {
            simulator,
            steps: 0,
        }
    }

    /// Scene default: rapier backend with the given gravity.
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self::new(Box::new(RapierSimulator::new(gravity)))
    }

    pub fn simulator(&self) -> &dyn Simulator {
        self.simulator.as_ref()
    }

    pub fn simulator_mut(&mut self) -> &mut dyn Simulator {
        self.simulator.as_mut()
    }

    pub fn step(&mut self, dt: f32) {
        self.simulator.step(dt);
        self.steps += 1;
    }

    /// Number of fixed steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
