//! Position, rotation and scale of a game object.
//!
//! A [`Transform`] stores only *local* state. World-space values are derived
//! on demand by folding the parent chain (via [`ChildOf`]) up to the root:
//!
//! - position: sum of local positions (child offsets are **not** rotated or
//!   scaled by the parent)
//! - rotation: sum of local rotations, normalised to `[0, 360)`
//! - scale: component-wise product of local scales
//!
//! Nothing is cached, so mutating an ancestor is visible immediately. Every
//! world query is `O(depth)`.

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;

use crate::component::Component as Behaviour;
use crate::error::{EngineError, Result};
use crate::math::Vec2;
use crate::resources::physics::BodyHandle;

/// Normalise an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Local-frame placement of a game object. Created with the game object and
/// never removable.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec2,
    rotation_degrees: f32,
    scale: Vec2,
    /// Simulator body created for this transform by a rigidbody, if any.
    physics_body: Option<BodyHandle>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::new(0.0, 0.0),
            rotation_degrees: 0.0,
            scale: Vec2::new(1.0, 1.0),
            physics_body: None,
        }
    }
}

impl Transform {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn set_local_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    pub fn local_position(&self) -> Vec2 {
        self.position
    }

    /// Set the local rotation in degrees. Stored normalised to `[0, 360)`.
    pub fn set_local_rotation(&mut self, degrees: f32) {
        self.rotation_degrees = normalize_degrees(degrees);
    }

    /// Local rotation in degrees, always in `[0, 360)`.
    pub fn local_rotation(&self) -> f32 {
        self.rotation_degrees
    }

    pub fn local_rotation_radians(&self) -> f32 {
        self.rotation_degrees.to_radians()
    }

    pub fn set_local_scale(&mut self, sx: f32, sy: f32) {
        self.scale = Vec2::new(sx, sy);
    }

    /// Set both scale axes to `s`.
    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec2::new(s, s);
    }

    pub fn local_scale(&self) -> Vec2 {
        self.scale
    }

    /// Body that owns the authoritative position of this transform during
    /// the fixed step, if a rigidbody created one.
    pub fn physics_body(&self) -> Option<BodyHandle> {
        self.physics_body
    }

    pub(crate) fn set_physics_body(&mut self, body: Option<BodyHandle>) {
        self.physics_body = body;
    }
}

impl Behaviour for Transform {}

/// Iterate `entity` and its ancestors, nearest first.
fn ancestry(world: &World, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
    std::iter::successors(Some(entity), move |current| {
        world.get::<ChildOf>(*current).map(|child_of| child_of.parent())
    })
}

fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<ChildOf>(entity).map(|child_of| child_of.parent())
}

fn transform_mut(world: &mut World, entity: Entity) -> Result<Mut<'_, Transform>> {
    world
        .get_mut::<Transform>(entity)
        .ok_or(EngineError::NoSuchGameObject(entity))
}

/// World position: local position plus the parent's world position.
pub fn world_position(world: &World, entity: Entity) -> Vec2 {
    ancestry(world, entity)
        .filter_map(|e| world.get::<Transform>(e))
        .fold(Vec2::new(0.0, 0.0), |acc, t| acc + t.position)
}

/// Set the world position by subtracting the parent's *current* world
/// position. No rotation or scale compensation is applied.
pub fn set_world_position(world: &mut World, entity: Entity, x: f32, y: f32) -> Result<()> {
    let parent_world = parent_of(world, entity)
        .map(|parent| world_position(world, parent))
        .unwrap_or_else(|| Vec2::new(0.0, 0.0));
    let mut transform = transform_mut(world, entity)?;
    transform.position = Vec2::new(x, y) - parent_world;
    Ok(())
}

/// World rotation in degrees, normalised to `[0, 360)`.
pub fn world_rotation(world: &World, entity: Entity) -> f32 {
    let sum: f32 = ancestry(world, entity)
        .filter_map(|e| world.get::<Transform>(e))
        .map(|t| t.rotation_degrees)
        .sum();
    normalize_degrees(sum)
}

pub fn world_rotation_radians(world: &World, entity: Entity) -> f32 {
    world_rotation(world, entity).to_radians()
}

pub fn set_world_rotation(world: &mut World, entity: Entity, degrees: f32) -> Result<()> {
    let parent_rotation = parent_of(world, entity)
        .map(|parent| world_rotation(world, parent))
        .unwrap_or(0.0);
    let mut transform = transform_mut(world, entity)?;
    transform.set_local_rotation(degrees - parent_rotation);
    Ok(())
}

/// World scale: component-wise product of local scales up to the root.
pub fn world_scale(world: &World, entity: Entity) -> Vec2 {
    ancestry(world, entity)
        .filter_map(|e| world.get::<Transform>(e))
        .fold(Vec2::new(1.0, 1.0), |acc, t| acc.component_mul(&t.scale))
}

/// Set the world scale by dividing out the parent's world scale. An axis on
/// which the parent scale is zero cannot be decomposed and keeps its local
/// value.
pub fn set_world_scale(world: &mut World, entity: Entity, sx: f32, sy: f32) -> Result<()> {
    let parent_scale = parent_of(world, entity)
        .map(|parent| world_scale(world, parent))
        .unwrap_or_else(|| Vec2::new(1.0, 1.0));
    let mut transform = transform_mut(world, entity)?;
    if parent_scale.x != 0.0 {
        transform.scale.x = sx / parent_scale.x;
    }
    if parent_scale.y != 0.0 {
        transform.scale.y = sy / parent_scale.y;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn spawn(world: &mut World, x: f32, y: f32) -> Entity {
        world.spawn(Transform::new(x, y)).id()
    }

    fn parent(world: &mut World, child: Entity, parent: Entity) {
        world.entity_mut(child).insert(ChildOf(parent));
        world.flush();
    }

    // ==================== LOCAL STATE ====================

    #[test]
    fn default_transform_is_identity() {
        let t = Transform::default();
        assert_eq!(t.local_position(), Vec2::new(0.0, 0.0));
        assert!(approx_eq(t.local_rotation(), 0.0));
        assert_eq!(t.local_scale(), Vec2::new(1.0, 1.0));
        assert!(t.physics_body().is_none());
    }

    #[test]
    fn negative_rotation_wraps_into_range() {
        let mut t = Transform::default();
        t.set_local_rotation(-90.0);
        assert!(approx_eq(t.local_rotation(), 270.0));
    }

    #[test]
    fn large_rotation_wraps_into_range() {
        let mut t = Transform::default();
        t.set_local_rotation(725.0);
        assert!(approx_eq(t.local_rotation(), 5.0));
        t.set_local_rotation(360.0);
        assert!(approx_eq(t.local_rotation(), 0.0));
    }

    #[test]
    fn rotation_always_in_half_open_range() {
        let mut t = Transform::default();
        for d in [-1e-7_f32, -720.0, -359.99, 0.0, 359.999, 1080.5, -45.0] {
            t.set_local_rotation(d);
            let r = t.local_rotation();
            assert!((0.0..360.0).contains(&r), "{d} normalised to {r}");
        }
    }

    #[test]
    fn radians_accessor_converts() {
        let mut t = Transform::default();
        t.set_local_rotation(180.0);
        assert!(approx_eq(t.local_rotation_radians(), std::f32::consts::PI));
    }

    #[test]
    fn uniform_scale_sets_both_axes() {
        let mut t = Transform::default();
        t.set_uniform_scale(2.5);
        assert_eq!(t.local_scale(), Vec2::new(2.5, 2.5));
        t.set_local_scale(2.0, 3.0);
        assert_eq!(t.local_scale(), Vec2::new(2.0, 3.0));
    }

    // ==================== WORLD COMPOSITION ====================

    #[test]
    fn root_world_position_is_local() {
        let mut world = World::new();
        let e = spawn(&mut world, 12.0, -4.0);
        assert_eq!(world_position(&world, e), Vec2::new(12.0, -4.0));
    }

    #[test]
    fn child_offset_is_not_rotated_by_parent() {
        let mut world = World::new();
        let p = spawn(&mut world, 100.0, 100.0);
        world.get_mut::<Transform>(p).unwrap().set_local_rotation(90.0);
        world.get_mut::<Transform>(p).unwrap().set_local_scale(2.0, 2.0);
        let c = spawn(&mut world, 40.0, 0.0);
        parent(&mut world, c, p);

        let pos = world_position(&world, c);
        assert!(approx_eq(pos.x, 140.0));
        assert!(approx_eq(pos.y, 100.0));
    }

    #[test]
    fn rotation_and_scale_compose_through_chain() {
        let mut world = World::new();
        let a = spawn(&mut world, 0.0, 0.0);
        let b = spawn(&mut world, 0.0, 0.0);
        let c = spawn(&mut world, 0.0, 0.0);
        parent(&mut world, b, a);
        parent(&mut world, c, b);
        world.get_mut::<Transform>(a).unwrap().set_local_rotation(300.0);
        world.get_mut::<Transform>(b).unwrap().set_local_rotation(45.0);
        world.get_mut::<Transform>(c).unwrap().set_local_rotation(30.0);
        world.get_mut::<Transform>(a).unwrap().set_local_scale(2.0, 1.0);
        world.get_mut::<Transform>(c).unwrap().set_local_scale(3.0, 0.5);

        assert!(approx_eq(world_rotation(&world, c), 15.0));
        assert_eq!(world_scale(&world, c), Vec2::new(6.0, 0.5));
    }

    #[test]
    fn set_world_rotation_decomposes_against_parent() {
        let mut world = World::new();
        let p = spawn(&mut world, 0.0, 0.0);
        let c = spawn(&mut world, 0.0, 0.0);
        parent(&mut world, c, p);
        world.get_mut::<Transform>(p).unwrap().set_local_rotation(100.0);

        set_world_rotation(&mut world, c, 40.0).unwrap();
        assert!(approx_eq(world.get::<Transform>(c).unwrap().local_rotation(), 300.0));
        assert!(approx_eq(world_rotation(&world, c), 40.0));
    }

    #[test]
    fn set_world_scale_divides_parent_scale() {
        let mut world = World::new();
        let p = spawn(&mut world, 0.0, 0.0);
        let c = spawn(&mut world, 0.0, 0.0);
        parent(&mut world, c, p);
        world.get_mut::<Transform>(p).unwrap().set_local_scale(2.0, 4.0);

        set_world_scale(&mut world, c, 1.0, 1.0).unwrap();
        assert_eq!(world.get::<Transform>(c).unwrap().local_scale(), Vec2::new(0.5, 0.25));
        assert_eq!(world_scale(&world, c), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn set_world_scale_keeps_axis_under_zero_parent_scale() {
        let mut world = World::new();
        let p = spawn(&mut world, 0.0, 0.0);
        let c = spawn(&mut world, 0.0, 0.0);
        parent(&mut world, c, p);
        world.get_mut::<Transform>(p).unwrap().set_local_scale(0.0, 2.0);

        set_world_scale(&mut world, c, 5.0, 5.0).unwrap();
        assert_eq!(world.get::<Transform>(c).unwrap().local_scale(), Vec2::new(1.0, 2.5));
    }

    #[test]
    fn set_world_position_on_missing_entity_fails() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        assert!(matches!(
            set_world_position(&mut world, e, 1.0, 1.0),
            Err(EngineError::NoSuchGameObject(_))
        ));
    }
}
