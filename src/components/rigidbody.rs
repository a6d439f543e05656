//! Rigid-body component bridging a game object to the physics simulator.
//!
//! The [`Rigidbody2D`] component owns one simulator body and one shape. The
//! transform is the source of truth when the body is created (on `start` and
//! on `reset_to_start`); from then on the simulator is, and every fixed step
//! copies the body position and angle back into the transform. Static bodies
//! are never copied back; when gameplay code moves one, the next fixed step
//! recreates its body at the new pose. [`Rigidbody2D::recreate`] does the same
//! immediately.
//!
//! Only root game objects may carry a rigidbody: the simulator knows nothing
//! of the scene hierarchy.
//!
//! # Example
//! ```ignore
//! let player = scene.spawn_at("player", 100.0, 100.0);
//! scene
//!     .object_mut(player)
//!     .unwrap()
//!     .add_component(Rigidbody2D::new_box(32.0, 48.0).with_mass(2.0).freeze_rotation())?;
//! scene.add_game_object(player)?;
//!
//! // later, from a component hook
//! Rigidbody2D::apply_force(obj, 0.0, -500.0)?;
//! ```

use log::{debug, warn};

use crate::component::Component;
use crate::error::{EngineError, Result};
use crate::gameobject::{GameObjectMut, GameObjectRef};
use crate::math::{Vec2, rotate};
use crate::render::{Canvas, Color};
use crate::resources::physics::{BodyHandle, BodyKind, ShapeDesc, ShapeHandle, ShapeKind, Simulator};
use crate::systems::lifecycle;

/// Distance (world units) or angle (radians) past which a static body is
/// considered moved by gameplay code.
const POSE_TOLERANCE: f32 = 1e-3;

/// Smallest mass handed to the simulator.
pub const MIN_MASS: f32 = 0.0001;
/// Smallest box side or circle radius handed to the simulator.
pub const MIN_DIMENSION: f32 = 1.0;

const AXIS_LENGTH: f32 = 20.0;

/// Configured collision geometry, before scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Box { width: f32, height: f32 },
    Circle { radius: f32 },
    /// Segment between two body-local points, inflated by `thickness`.
    Segment { point_a: Vec2, point_b: Vec2, thickness: f32 },
}

/// Shape actually created for the simulator, and whether any configured
/// value had to be raised to a safe minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedShape {
    pub kind: ShapeKind,
    pub clamped: bool,
}

/// Scale the configured shape and clamp it to [`MIN_DIMENSION`].
///
/// Boxes scale per axis, circles by the larger axis. Segments are not
/// scaled; a negative thickness becomes zero.
pub fn resolve_shape(shape: BodyShape, scale: Vec2) -> ResolvedShape {
    match shape {
        BodyShape::Box { width, height } => {
            let (w, h) = (width * scale.x, height * scale.y);
            ResolvedShape {
                kind: ShapeKind::Box {
                    width: w.max(MIN_DIMENSION),
                    height: h.max(MIN_DIMENSION),
                },
                clamped: !(w >= MIN_DIMENSION && h >= MIN_DIMENSION),
            }
        }
        BodyShape::Circle { radius } => {
            let r = radius * scale.x.max(scale.y);
            ResolvedShape {
                kind: ShapeKind::Circle {
                    radius: r.max(MIN_DIMENSION),
                },
                clamped: !(r >= MIN_DIMENSION),
            }
        }
        BodyShape::Segment {
            point_a,
            point_b,
            thickness,
        } => ResolvedShape {
            kind: ShapeKind::Segment {
                a: point_a,
                b: point_b,
                radius: thickness.max(0.0),
            },
            clamped: !(thickness >= 0.0),
        },
    }
}

/// Mass raised to [`MIN_MASS`] when non-positive.
pub fn safe_mass(mass: f32) -> f32 {
    if mass >= MIN_MASS { mass } else { MIN_MASS }
}

/// Moment of inertia of `kind` with `mass`, about the body origin.
pub fn moment_for(kind: ShapeKind, mass: f32) -> f32 {
    match kind {
        ShapeKind::Box { width, height } => mass * (width * width + height * height) / 12.0,
        ShapeKind::Circle { radius } => mass * radius * radius / 2.0,
        ShapeKind::Segment { a, b, radius } => {
            let length_sq = (b - a).norm_squared();
            let mid = (a + b) / 2.0;
            mass * ((length_sq + 4.0 * radius * radius) / 12.0 + mid.norm_squared())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rigidbody2D {
    shape: BodyShape,
    mass: f32,
    is_static: bool,
    freeze_rotation: bool,
    /// Body position relative to the transform's world position.
    offset: Vec2,
    /// Draw outline, centre of mass and local axes.
    pub debug: bool,
    body: Option<BodyHandle>,
    shape_handle: Option<ShapeHandle>,
    resolved: Option<ShapeKind>,
}

impl Rigidbody2D {
    pub fn new(shape: BodyShape) -> Self {
        Self {
            shape,
            mass: 1.0,
            is_static: false,
            freeze_rotation: false,
            offset: Vec2::new(0.0, 0.0),
            debug: false,
            body: None,
            shape_handle: None,
            resolved: None,
        }
    }

    pub fn new_box(width: f32, height: f32) -> Self {
        Self::new(BodyShape::Box { width, height })
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(BodyShape::Circle { radius })
    }

    pub fn segment(point_a: Vec2, point_b: Vec2, thickness: f32) -> Self {
        Self::new(BodyShape::Segment {
            point_a,
            point_b,
            thickness,
        })
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Immovable body. Its transform is never overwritten by the simulator.
    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Infinite moment of inertia: the body never rotates.
    pub fn freeze_rotation(mut self) -> Self {
        self.freeze_rotation = true;
        self
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn shape(&self) -> BodyShape {
        self.shape
    }

    /// Shape handed to the simulator by the last body creation.
    pub fn resolved_shape(&self) -> Option<ShapeKind> {
        self.resolved
    }

    pub fn configured_mass(&self) -> f32 {
        self.mass
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_rotation_frozen(&self) -> bool {
        self.freeze_rotation
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn shape_handle(&self) -> Option<ShapeHandle> {
        self.shape_handle
    }

    fn create_body(&mut self, obj: &mut GameObjectMut<'_>) -> Result<()> {
        let name = obj.name().to_string();
        let transform = *obj.transform()?;
        let position = obj.world_position() + self.offset;

        let resolved = resolve_shape(self.shape, obj.world_scale());
        if resolved.clamped {
            warn!(
                "Rigidbody2D on '{}': shape {:?} clamped to {:?}",
                name, self.shape, resolved.kind
            );
        }
        let mass = safe_mass(self.mass);
        if mass != self.mass {
            warn!("Rigidbody2D on '{}': mass {} clamped to {}", name, self.mass, mass);
        }
        let kind = if self.is_static {
            BodyKind::Static
        } else {
            BodyKind::Dynamic
        };
        let moment = if self.freeze_rotation {
            f32::INFINITY
        } else {
            moment_for(resolved.kind, mass)
        };

        let sim = obj.physics_mut().ok_or(EngineError::NoPhysicsWorld)?;
        let body = sim.create_body(mass, moment, kind);
        sim.set_position(body, position)?;
        sim.set_angle(body, transform.local_rotation_radians())?;
        let shape = sim.create_shape(body, ShapeDesc::new(resolved.kind))?;
        sim.add(body, shape)?;

        obj.transform_mut()?.set_physics_body(Some(body));
        self.body = Some(body);
        self.shape_handle = Some(shape);
        self.resolved = Some(resolved.kind);
        debug!("Created {:?} body {:?} for '{}'", kind, body, name);
        Ok(())
    }

    fn destroy_body(&mut self, obj: &mut GameObjectMut<'_>) {
        let Some(body) = self.body.take() else {
            return;
        };
        self.shape_handle = None;
        if let Some(sim) = obj.physics_mut() {
            sim.remove(body);
        }
        if let Ok(transform) = obj.transform_mut() {
            if transform.physics_body() == Some(body) {
                transform.set_physics_body(None);
            }
        }
        debug!("Destroyed body {:?}", body);
    }

    fn body_of(obj: &GameObjectRef<'_>) -> Result<BodyHandle> {
        obj.get_component::<Rigidbody2D>()
            .and_then(Rigidbody2D::body)
            .ok_or(EngineError::NoPhysicsBody(obj.entity()))
    }

    fn with_simulator<R>(
        obj: &mut GameObjectMut<'_>,
        f: impl FnOnce(&mut dyn Simulator, BodyHandle) -> Result<R>,
    ) -> Result<R> {
        let body = Self::body_of(&obj.as_readonly())?;
        let sim = obj.physics_mut().ok_or(EngineError::NoPhysicsWorld)?;
        f(sim, body)
    }

    /// Apply a force at the body's centre for the next fixed step.
    pub fn apply_force(obj: &mut GameObjectMut<'_>, fx: f32, fy: f32) -> Result<()> {
        Self::with_simulator(obj, |sim, body| {
            let at = sim.position(body).ok_or(EngineError::UnknownBody(body))?;
            sim.apply_force_at_world_point(body, Vec2::new(fx, fy), at)
        })
    }

    pub fn apply_impulse(obj: &mut GameObjectMut<'_>, ix: f32, iy: f32) -> Result<()> {
        Self::with_simulator(obj, |sim, body| sim.apply_impulse(body, Vec2::new(ix, iy)))
    }

    pub fn set_velocity(obj: &mut GameObjectMut<'_>, vx: f32, vy: f32) -> Result<()> {
        Self::with_simulator(obj, |sim, body| sim.set_velocity(body, Vec2::new(vx, vy)))
    }

    pub fn velocity(obj: &GameObjectRef<'_>) -> Result<Vec2> {
        let body = Self::body_of(obj)?;
        let sim = obj.physics().ok_or(EngineError::NoPhysicsWorld)?;
        sim.velocity(body).ok_or(EngineError::UnknownBody(body))
    }

    /// Destroy the body and build a new one from the current transform.
    pub fn recreate(obj: &mut GameObjectMut<'_>) -> Result<()> {
        let entity = obj.entity();
        lifecycle::with_component::<Rigidbody2D, _>(obj.world_mut(), entity, |rb, obj| {
            if rb.body.is_none() {
                return Err(EngineError::NoPhysicsBody(obj.entity()));
            }
            rb.destroy_body(obj);
            rb.create_body(obj)
        })
        .unwrap_or(Err(EngineError::NoPhysicsBody(entity)))
    }

    /// Whether the transform has moved away from the simulator pose.
    fn pose_diverged(&self, obj: &GameObjectRef<'_>, body: BodyHandle) -> Result<bool> {
        let sim = obj.physics().ok_or(EngineError::NoPhysicsWorld)?;
        let (Some(position), Some(angle)) = (sim.position(body), sim.angle(body)) else {
            return Ok(false);
        };
        let wanted = obj.world_position() + self.offset;
        let rotation = obj.transform()?.local_rotation_radians();
        let turn = (rotation - angle).rem_euclid(std::f32::consts::TAU);
        let angle_diff = turn.min(std::f32::consts::TAU - turn);
        Ok((wanted - position).norm() > POSE_TOLERANCE || angle_diff > POSE_TOLERANCE)
    }

    /// Mass as seen by the simulator (infinite for static bodies).
    pub fn mass(obj: &GameObjectRef<'_>) -> Result<f32> {
        let body = Self::body_of(obj)?;
        let sim = obj.physics().ok_or(EngineError::NoPhysicsWorld)?;
        sim.mass(body).ok_or(EngineError::UnknownBody(body))
    }
}

impl Component for Rigidbody2D {
    fn start(&mut self, obj: &mut GameObjectMut<'_>) -> Result<()> {
        self.create_body(obj)
    }

    fn fixed_update(&mut self, obj: &mut GameObjectMut<'_>, _dt: f32) -> Result<()> {
        let Some(body) = self.body else {
            return Ok(());
        };
        if self.is_static {
            if self.pose_diverged(&obj.as_readonly(), body)? {
                debug!("Static body {:?} on '{}' moved, recreating", body, obj.name());
                self.destroy_body(obj);
                self.create_body(obj)?;
            }
            return Ok(());
        }
        let Some(sim) = obj.physics() else {
            return Ok(());
        };
        let (Some(position), Some(angle)) = (sim.position(body), sim.angle(body)) else {
            return Ok(());
        };
        let local = position - self.offset;
        obj.set_world_position(local.x, local.y)?;
        obj.transform_mut()?.set_local_rotation(angle.to_degrees());
        Ok(())
    }

    fn render(&self, obj: &GameObjectRef<'_>, canvas: &mut Canvas<'_>) {
        if !self.debug {
            return;
        }
        let (Some(body), Some(kind), Some(sim)) = (self.body, self.resolved, obj.physics()) else {
            return;
        };
        let (Some(pos), Some(angle)) = (sim.position(body), sim.angle(body)) else {
            return;
        };

        match kind {
            ShapeKind::Box { width, height } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                let corners = [
                    Vec2::new(-hw, -hh),
                    Vec2::new(hw, -hh),
                    Vec2::new(hw, hh),
                    Vec2::new(-hw, hh),
                ]
                .map(|c| rotate(c, angle) + pos);
                canvas.polygon(&corners, 2.0, Color::RED);
            }
            ShapeKind::Circle { radius } => canvas.circle(pos, radius, Color::RED, false),
            ShapeKind::Segment { a, b, radius } => canvas.line(
                rotate(a, angle) + pos,
                rotate(b, angle) + pos,
                (radius * 2.0).max(1.0),
                Color::RED,
            ),
        }

        canvas.circle(pos, 3.0, Color::GREEN, true);
        let x_axis = rotate(Vec2::new(AXIS_LENGTH, 0.0), angle);
        let y_axis = rotate(Vec2::new(0.0, AXIS_LENGTH), angle);
        canvas.line(pos, pos + x_axis, 2.0, Color::BLUE);
        canvas.line(pos, pos + y_axis, 2.0, Color::YELLOW);
    }

    fn on_remove(&mut self, obj: &mut GameObjectMut<'_>) {
        self.destroy_body(obj);
    }

    fn reset_to_start(&mut self, obj: &mut GameObjectMut<'_>) -> Result<()> {
        self.destroy_body(obj);
        self.create_body(obj)
    }

    fn requires_root(&self) -> bool {
        true
    }
}
