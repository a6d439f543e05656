//! Scenes: independently activatable worlds of game objects.
//!
//! Each [`Scene`] owns its own bevy [`World`] (the entity arena), its own
//! physics simulator and a default "Camera" game object. Root game objects
//! are kept in insertion order in the [`SceneRoots`] resource; children are
//! reached only through their parents.
//!
//! Queries, removal and registration are hierarchy-aware: they always cover
//! whole subtrees.

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use smallvec::SmallVec;

use crate::component::{Component as Behaviour, FrameContext};
use crate::components::camera::Camera;
use crate::components::transform::Transform;
use crate::error::{EngineError, Result};
use crate::gameobject::{
    self, ComponentSet, GameObject, GameObjectMut, GameObjectRef, StartTransform, children_of,
};
use crate::math::Vec2;
use crate::render::{Canvas, CameraView, Color, Surface};
use crate::resources::physics::{PhysicsWorld, Simulator};
use crate::resources::signals::EngineSignals;
use crate::snapshot::{self, SceneSnapshot};
use crate::systems::lifecycle;

/// Downward gravity used when no configuration is given.
pub const DEFAULT_GRAVITY_Y: f32 = 900.0;
pub const DEFAULT_VIEWPORT: (u32, u32) = (800, 600);

/// Root game objects of a scene, in insertion order.
#[derive(Resource, Debug, Clone, Default)]
pub struct SceneRoots(Vec<Entity>);

impl SceneRoots {
    pub fn push(&mut self, entity: Entity) {
        if !self.contains(entity) {
            self.0.push(entity);
        }
    }

    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.0.len();
        self.0.retain(|e| *e != entity);
        self.0.len() != before
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.0
    }
}

/// The game object carrying the scene's [`Camera`].
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneCamera(pub Entity);

pub struct Scene {
    name: String,
    world: World,
    pub background: Color,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, Vec2::new(0.0, DEFAULT_GRAVITY_Y), DEFAULT_VIEWPORT)
    }

    pub fn with_settings(name: impl Into<String>, gravity: Vec2, viewport: (u32, u32)) -> Self {
        let name = name.into();
        let mut world = World::new();
        world.insert_resource(PhysicsWorld::with_gravity(gravity));
        world.insert_resource(SceneRoots::default());
        world.insert_resource(EngineSignals::default());

        let camera = gameobject::spawn_detached(&mut world, "Camera", Transform::default());
        world.insert_resource(SceneCamera(camera));
        let mut scene = Self {
            name,
            world,
            background: Color::BLACK,
        };
        let attached = scene
            .object_mut(camera)
            .map(|mut obj| obj.add_component(Camera::new(viewport.0, viewport.1)));
        if let Some(Err(err)) = attached {
            warn!("Scene '{}': camera component not attached: {err}", scene.name);
        }
        if let Err(err) = scene.add_game_object(camera) {
            warn!("Scene '{}': camera not registered: {err}", scene.name);
        }
        debug!("Created scene '{}'", scene.name);
        scene
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Swap the physics backend. Only meaningful before any body exists.
    pub fn set_simulator(&mut self, simulator: Box<dyn Simulator>) {
        self.world.insert_resource(PhysicsWorld::new(simulator));
    }

    pub fn physics(&self) -> &PhysicsWorld {
        self.world.resource::<PhysicsWorld>()
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        self.world.resource_mut::<PhysicsWorld>().into_inner()
    }

    /// Create a detached game object at the origin. It takes part in the
    /// frame loop once added with [`add_game_object`](Self::add_game_object)
    /// or attached below a registered game object.
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        gameobject::spawn_detached(&mut self.world, name, Transform::default())
    }

    pub fn spawn_at(&mut self, name: impl Into<String>, x: f32, y: f32) -> Entity {
        gameobject::spawn_detached(&mut self.world, name, Transform::new(x, y))
    }

    pub fn object(&self, entity: Entity) -> Option<GameObjectRef<'_>> {
        gameobject::exists(&self.world, entity).then(|| GameObjectRef::new(&self.world, entity))
    }

    pub fn object_mut(&mut self, entity: Entity) -> Option<GameObjectMut<'_>> {
        if gameobject::exists(&self.world, entity) {
            Some(GameObjectMut::new(&mut self.world, entity))
        } else {
            None
        }
    }

    /// Register `entity` as a root game object and start its subtree.
    ///
    /// A game object that currently has a parent is detached from it first.
    /// Adding an existing root again is a no-op apart from starting
    /// components that have not started yet.
    pub fn add_game_object(&mut self, entity: Entity) -> Result<()> {
        if !gameobject::exists(&self.world, entity) {
            return Err(EngineError::NoSuchGameObject(entity));
        }
        if self.world.get::<ChildOf>(entity).is_some() {
            self.world.entity_mut(entity).remove::<ChildOf>();
            self.world.flush();
        }
        self.world.resource_mut::<SceneRoots>().push(entity);
        lifecycle::register_subtree(&mut self.world, entity);
        debug!("Added {:?} to scene '{}'", entity, self.name);
        lifecycle::start_subtree(&mut self.world, entity)
    }

    /// Tear down and despawn `entity` with its whole subtree. Works for
    /// roots and children alike. Returns `false` for unknown game objects.
    pub fn remove_game_object(&mut self, entity: Entity) -> bool {
        if !gameobject::exists(&self.world, entity) {
            return false;
        }
        lifecycle::teardown_subtree(&mut self.world, entity);
        self.world.resource_mut::<SceneRoots>().remove(entity);
        self.world.despawn(entity);
        debug!("Removed {:?} from scene '{}'", entity, self.name);
        true
    }

    pub fn roots(&self) -> &[Entity] {
        self.world.resource::<SceneRoots>().as_slice()
    }

    fn roots_snapshot(&self) -> SmallVec<[Entity; 8]> {
        SmallVec::from_slice(self.roots())
    }

    /// Every registered game object, depth-first in pass order.
    pub fn game_objects(&self) -> Vec<Entity> {
        fn visit(world: &World, entity: Entity, out: &mut Vec<Entity>) {
            out.push(entity);
            for child in children_of(world, entity) {
                visit(world, child, out);
            }
        }
        let mut out = Vec::new();
        for root in self.roots() {
            visit(&self.world, *root, &mut out);
        }
        out
    }

    /// Every `T` attached anywhere in the scene, depth-first.
    pub fn get_components<T: Behaviour>(&self) -> Vec<&T> {
        self.game_objects()
            .into_iter()
            .filter_map(|e| gameobject::component::<T>(&self.world, e))
            .collect()
    }

    /// Game objects carrying a `T`, depth-first.
    pub fn game_objects_with<T: Behaviour>(&self) -> Vec<Entity> {
        self.game_objects()
            .into_iter()
            .filter(|e| {
                self.world
                    .get::<ComponentSet>(*e)
                    .is_some_and(|set| set.get::<T>().is_some())
            })
            .collect()
    }

    /// First registered game object named `name`, depth-first.
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.game_objects().into_iter().find(|e| {
            self.world
                .get::<GameObject>(*e)
                .is_some_and(|info| info.name == name)
        })
    }

    pub fn camera_object(&self) -> Entity {
        self.world.resource::<SceneCamera>().0
    }

    pub fn camera(&self) -> Option<&Camera> {
        gameobject::component::<Camera>(&self.world, self.camera_object())
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        let camera = self.camera_object();
        gameobject::component_mut::<Camera>(&mut self.world, camera)
    }

    pub fn update(&mut self, frame: &FrameContext<'_>) -> Result<()> {
        for root in self.roots_snapshot() {
            lifecycle::update_subtree(&mut self.world, root, frame)?;
        }
        Ok(())
    }

    /// One fixed pass: step the simulator, then run every `fixed_update` so
    /// rigidbodies read post-step state.
    pub fn fixed_update(&mut self, dt: f32) -> Result<()> {
        self.physics_mut().step(dt);
        for root in self.roots_snapshot() {
            lifecycle::fixed_update_subtree(&mut self.world, root, dt)?;
        }
        Ok(())
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear(self.background);
        let view = self.camera().map(Camera::view).unwrap_or_else(CameraView::default);
        let mut canvas = Canvas::new(surface, view);
        for root in self.roots() {
            lifecycle::render_subtree(&self.world, *root, &mut canvas);
        }
    }

    /// Restore every game object to the transform it had when registered and
    /// let components rebuild their state (rigidbodies recreate their body).
    pub fn reset_to_start(&mut self) -> Result<()> {
        info!("Resetting scene '{}' to start", self.name);
        for root in self.roots_snapshot() {
            lifecycle::reset_subtree(&mut self.world, root)?;
        }
        Ok(())
    }

    /// Recorded start transform of a registered game object.
    pub fn start_transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<StartTransform>(entity).map(|start| start.0)
    }

    /// Drain the engine requests recorded during this frame.
    pub fn take_signals(&mut self) -> EngineSignals {
        self.world
            .get_resource_or_insert_with(EngineSignals::default)
            .take()
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        snapshot::capture(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}
