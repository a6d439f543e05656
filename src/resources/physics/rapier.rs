//! rapier2d backend for the [`Simulator`] contract.
//!
//! Bodies and shapes are staged until [`Simulator::add`] inserts them into the
//! rapier sets, so a body can be positioned before it starts simulating.
//! Mass and moment come entirely from the body description: colliders are
//! created with zero density and the body carries explicit mass properties.

use rapier2d::parry::mass_properties::MassProperties;
use rapier2d::prelude::*;
use rustc_hash::FxHashMap;

use super::{BodyHandle, BodyKind, ShapeDesc, ShapeHandle, ShapeKind, Simulator};
use crate::error::{EngineError, Result};
use crate::math::Vec2;

enum BodyState {
    Staged(RigidBody),
    Live(RigidBodyHandle),
}

struct BodyEntry {
    state: BodyState,
    kind: BodyKind,
    mass: f32,
}

enum ShapeState {
    Staged(Collider),
    Live(ColliderHandle),
}

struct ShapeEntry {
    body: BodyHandle,
    state: ShapeState,
}

pub struct RapierSimulator {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    body_entries: FxHashMap<BodyHandle, BodyEntry>,
    shape_entries: FxHashMap<ShapeHandle, ShapeEntry>,
    next_id: u64,
}

impl RapierSimulator {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            body_entries: FxHashMap::default(),
            shape_entries: FxHashMap::default(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of bodies currently registered with the rapier world.
    pub fn live_body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        match &self.body_entries.get(&handle)?.state {
            BodyState::Staged(body) => Some(body),
            BodyState::Live(live) => self.bodies.get(*live),
        }
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        let entry = self
            .body_entries
            .get_mut(&handle)
            .ok_or(EngineError::UnknownBody(handle))?;
        match &mut entry.state {
            BodyState::Staged(body) => Ok(body),
            BodyState::Live(live) => self
                .bodies
                .get_mut(*live)
                .ok_or(EngineError::UnknownBody(handle)),
        }
    }
}

fn build_shape(kind: ShapeKind) -> SharedShape {
    match kind {
        ShapeKind::Box { width, height } => SharedShape::cuboid(width / 2.0, height / 2.0),
        ShapeKind::Circle { radius } => SharedShape::ball(radius),
        ShapeKind::Segment { a, b, radius } if radius > 0.0 => {
            SharedShape::capsule(Point::from(a), Point::from(b), radius)
        }
        ShapeKind::Segment { a, b, .. } => SharedShape::segment(Point::from(a), Point::from(b)),
    }
}

impl Simulator for RapierSimulator {
    fn create_body(&mut self, mass: f32, moment: f32, kind: BodyKind) -> BodyHandle {
        let builder = match kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic if moment.is_finite() => RigidBodyBuilder::dynamic()
                .additional_mass_properties(MassProperties::new(Point::origin(), mass, moment)),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .lock_rotations()
                .additional_mass(mass),
        };
        let handle = BodyHandle(self.next_id());
        self.body_entries.insert(
            handle,
            BodyEntry {
                state: BodyState::Staged(builder.build()),
                kind,
                mass,
            },
        );
        handle
    }

    fn create_shape(&mut self, body: BodyHandle, desc: ShapeDesc) -> Result<ShapeHandle> {
        if !self.body_entries.contains_key(&body) {
            return Err(EngineError::UnknownBody(body));
        }
        let collider = ColliderBuilder::new(build_shape(desc.kind))
            .density(0.0)
            .friction(desc.friction)
            .restitution(desc.elasticity)
            .build();
        let handle = ShapeHandle(self.next_id());
        self.shape_entries.insert(
            handle,
            ShapeEntry {
                body,
                state: ShapeState::Staged(collider),
            },
        );
        Ok(handle)
    }

    fn add(&mut self, body: BodyHandle, shape: ShapeHandle) -> Result<()> {
        match self.shape_entries.get(&shape) {
            Some(entry) if entry.body == body => {}
            _ => return Err(EngineError::UnknownShape(shape)),
        }
        let mut entry = self
            .body_entries
            .remove(&body)
            .ok_or(EngineError::UnknownBody(body))?;
        let live = match entry.state {
            BodyState::Staged(rigid_body) => self.bodies.insert(rigid_body),
            BodyState::Live(live) => live,
        };
        entry.state = BodyState::Live(live);
        self.body_entries.insert(body, entry);

        if let Some(mut shape_entry) = self.shape_entries.remove(&shape) {
            let collider = match shape_entry.state {
                ShapeState::Staged(collider) => {
                    self.colliders
                        .insert_with_parent(collider, live, &mut self.bodies)
                }
                ShapeState::Live(collider) => collider,
            };
            shape_entry.state = ShapeState::Live(collider);
            self.shape_entries.insert(shape, shape_entry);
        }
        Ok(())
    }

    fn remove(&mut self, body: BodyHandle) {
        if let Some(entry) = self.body_entries.remove(&body) {
            if let BodyState::Live(live) = entry.state {
                self.bodies.remove(
                    live,
                    &mut self.islands,
                    &mut self.colliders,
                    &mut self.impulse_joints,
                    &mut self.multibody_joints,
                    true,
                );
            }
        }
        self.shape_entries.retain(|_, shape| shape.body != body);
    }

    fn contains(&self, body: BodyHandle) -> bool {
        self.body_entries.contains_key(&body)
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.body(body).map(|b| *b.translation())
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2) -> Result<()> {
        self.body_mut(body)?.set_translation(position, true);
        Ok(())
    }

    fn angle(&self, body: BodyHandle) -> Option<f32> {
        self.body(body).map(|b| b.rotation().angle())
    }

    fn set_angle(&mut self, body: BodyHandle, radians: f32) -> Result<()> {
        self.body_mut(body)?.set_rotation(Rotation::new(radians), true);
        Ok(())
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.body(body).map(|b| *b.linvel())
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> Result<()> {
        self.body_mut(body)?.set_linvel(velocity, true);
        Ok(())
    }

    fn mass(&self, body: BodyHandle) -> Option<f32> {
        self.body_entries.get(&body).map(|entry| match entry.kind {
            BodyKind::Static => f32::INFINITY,
            BodyKind::Dynamic => entry.mass,
        })
    }

    fn apply_force_at_world_point(
        &mut self,
        body: BodyHandle,
        force: Vec2,
        point: Vec2,
    ) -> Result<()> {
        self.body_mut(body)?
            .add_force_at_point(force, Point::from(point), true);
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) -> Result<()> {
        let (kind, mass) = self
            .body_entries
            .get(&body)
            .map(|entry| (entry.kind, entry.mass))
            .ok_or(EngineError::UnknownBody(body))?;
        if kind == BodyKind::Static {
            return Ok(());
        }
        // mass properties of a freshly inserted body are only refreshed on
        // the next step, so the velocity change is applied directly
        let rigid_body = self.body_mut(body)?;
        let linvel = *rigid_body.linvel() + impulse / mass;
        rigid_body.set_linvel(linvel, true);
        Ok(())
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        // forces apply to a single step
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
        }
    }
}
