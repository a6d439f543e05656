//! Game objects and their component containers.
//!
//! A game object is an entity in its scene's [`World`] carrying:
//!
//! - [`GameObject`]: name, identity and the active flag
//! - [`Transform`]: always present, never removable
//! - [`ComponentSet`]: the attached [`Component`](crate::component::Component)s,
//!   in attachment order, at most one per concrete type
//!
//! Parent/child links use bevy's [`ChildOf`]/[`Children`] relationship, so a
//! parent owns its children: despawning a game object despawns its subtree.
//! [`GameObjectRef`] and [`GameObjectMut`] are the handles components see.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::component::{Component as Behaviour, short_type_name};
use crate::components::transform::{self, Transform};
use crate::error::{EngineError, Result};
use crate::math::Vec2;
use crate::resources::physics::{PhysicsWorld, Simulator};
use crate::resources::signals::EngineSignals;
use crate::scene::SceneRoots;
use crate::systems::lifecycle;

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity and activity of a game object.
#[derive(Component, Debug, Clone)]
pub struct GameObject {
    pub name: String,
    uid: u128,
    id: u64,
    /// Inactive game objects and their whole subtree are skipped by update,
    /// fixed_update and render.
    pub active: bool,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: fastrand::u128(..),
            id: NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed),
            active: true,
        }
    }

    /// Globally unique identifier.
    pub fn uid(&self) -> u128 {
        self.uid
    }

    /// Sequential process-local id, handy in logs.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Marker: the game object is registered in its scene, either as a root or
/// through a registered ancestor.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct InScene;

/// Local transform recorded when the game object was registered.
#[derive(Component, Debug, Clone, Copy)]
pub struct StartTransform(pub Transform);

pub(crate) struct ComponentSlot {
    type_id: TypeId,
    type_name: &'static str,
    active: bool,
    started: bool,
    /// `None` while the component is running one of its own hooks.
    component: Option<Box<dyn Behaviour>>,
}

fn downcast_ref<T: Behaviour>(component: &dyn Behaviour) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

fn downcast_mut<T: Behaviour>(component: &mut dyn Behaviour) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// Ordered components of one game object, indexed by concrete type.
#[derive(Component, Default)]
pub struct ComponentSet {
    slots: Vec<ComponentSlot>,
    index: FxHashMap<TypeId, usize>,
}

impl ComponentSet {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.index.contains_key(&type_id)
    }

    /// Short type names in attachment order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.type_name)
    }

    pub fn get<T: Behaviour>(&self) -> Option<&T> {
        let slot = &self.slots[*self.index.get(&TypeId::of::<T>())?];
        downcast_ref::<T>(slot.component.as_deref()?)
    }

    pub fn get_mut<T: Behaviour>(&mut self) -> Option<&mut T> {
        let idx = *self.index.get(&TypeId::of::<T>())?;
        downcast_mut::<T>(self.slots[idx].component.as_deref_mut()?)
    }

    fn slot(&self, type_id: TypeId) -> Option<&ComponentSlot> {
        self.index.get(&type_id).map(|idx| &self.slots[*idx])
    }

    fn slot_mut(&mut self, type_id: TypeId) -> Option<&mut ComponentSlot> {
        let idx = *self.index.get(&type_id)?;
        Some(&mut self.slots[idx])
    }

    fn push<T: Behaviour>(&mut self, component: T) {
        self.index.insert(TypeId::of::<T>(), self.slots.len());
        self.slots.push(ComponentSlot {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name::<T>(),
            active: true,
            started: false,
            component: Some(Box::new(component)),
        });
    }

    fn remove(&mut self, type_id: TypeId) -> Option<ComponentSlot> {
        let idx = self.index.remove(&type_id)?;
        let slot = self.slots.remove(idx);
        for (i, later) in self.slots.iter().enumerate().skip(idx) {
            self.index.insert(later.type_id, i);
        }
        Some(slot)
    }

    /// Types in attachment order, captured before a pass so the pass is not
    /// disturbed by components added or removed along the way.
    pub(crate) fn type_ids(&self) -> SmallVec<[TypeId; 8]> {
        self.slots.iter().map(|slot| slot.type_id).collect()
    }

    pub(crate) fn iter_attached(&self) -> impl Iterator<Item = (bool, &dyn Behaviour)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.component.as_deref().map(|c| (slot.active, c)))
    }

    pub(crate) fn is_active(&self, type_id: TypeId) -> bool {
        self.slot(type_id).is_some_and(|slot| slot.active)
    }

    pub(crate) fn is_started(&self, type_id: TypeId) -> bool {
        self.slot(type_id).is_some_and(|slot| slot.started)
    }

    /// Flag the slot as started. Returns `false` if it already was.
    pub(crate) fn mark_started(&mut self, type_id: TypeId) -> bool {
        match self.slot_mut(type_id) {
            Some(slot) if !slot.started => {
                slot.started = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take(&mut self, type_id: TypeId) -> Option<Box<dyn Behaviour>> {
        self.slot_mut(type_id)?.component.take()
    }

    /// Put a component back into its vacated slot. Hands the component back
    /// if the slot was removed (or refilled) in the meantime.
    pub(crate) fn restore(
        &mut self,
        type_id: TypeId,
        component: Box<dyn Behaviour>,
    ) -> std::result::Result<(), Box<dyn Behaviour>> {
        match self.slot_mut(type_id) {
            Some(slot) if slot.component.is_none() => {
                slot.component = Some(component);
                Ok(())
            }
            _ => Err(component),
        }
    }
}

/// Spawn a detached game object (no parent, no scene).
pub(crate) fn spawn_detached(world: &mut World, name: impl Into<String>, transform: Transform) -> Entity {
    world
        .spawn((GameObject::new(name), transform, ComponentSet::default()))
        .id()
}

pub fn exists(world: &World, entity: Entity) -> bool {
    world.get::<GameObject>(entity).is_some()
}

pub fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<ChildOf>(entity).map(|child_of| child_of.parent())
}

pub fn children_of(world: &World, entity: Entity) -> SmallVec<[Entity; 8]> {
    match world.get::<Children>(entity) {
        Some(children) => {
            let slice: &[Entity] = children;
            SmallVec::from_slice(slice)
        }
        None => SmallVec::new(),
    }
}

pub fn in_scene(world: &World, entity: Entity) -> bool {
    world.get::<InScene>(entity).is_some()
}

/// Whether `ancestor` appears on the parent chain of `entity`.
fn is_ancestor(world: &World, ancestor: Entity, entity: Entity) -> bool {
    std::iter::successors(parent_of(world, entity), |e| parent_of(world, *e))
        .any(|e| e == ancestor)
}

fn requires_root_component(world: &World, entity: Entity) -> Option<&'static str> {
    let set = world.get::<ComponentSet>(entity)?;
    set.slots
        .iter()
        .find(|slot| slot.component.as_ref().is_some_and(|c| c.requires_root()))
        .map(|slot| slot.type_name)
}

/// Look up a component on any game object of `world`.
pub fn component<T: Behaviour>(world: &World, entity: Entity) -> Option<&T> {
    if TypeId::of::<T>() == TypeId::of::<Transform>() {
        let t: &dyn Any = world.get::<Transform>(entity)?;
        return t.downcast_ref::<T>();
    }
    world.get::<ComponentSet>(entity)?.get::<T>()
}

pub fn component_mut<T: Behaviour>(world: &mut World, entity: Entity) -> Option<&mut T> {
    if TypeId::of::<T>() == TypeId::of::<Transform>() {
        let t: &mut dyn Any = world.get_mut::<Transform>(entity)?.into_inner();
        return t.downcast_mut::<T>();
    }
    world.get_mut::<ComponentSet>(entity)?.into_inner().get_mut::<T>()
}

/// Make `child` a child of `parent`.
///
/// The child is first detached from its current parent (and from the scene's
/// root list). Its local transform is left untouched. If the parent is
/// registered, the child subtree is registered and started; otherwise it
/// becomes unscened like its new parent.
pub fn attach_child(world: &mut World, parent: Entity, child: Entity) -> Result<()> {
    for e in [parent, child] {
        if !exists(world, e) {
            return Err(EngineError::NoSuchGameObject(e));
        }
    }
    if parent == child || is_ancestor(world, child, parent) {
        return Err(EngineError::HierarchyCycle { parent, child });
    }
    if let Some(component) = requires_root_component(world, child) {
        return Err(EngineError::InvalidAttachment {
            component,
            reason: "rigidbody components are only valid on root game objects",
        });
    }

    if let Some(mut roots) = world.get_resource_mut::<SceneRoots>() {
        roots.remove(child);
    }
    world.entity_mut(child).insert(ChildOf(parent));
    world.flush();
    debug!("Reparented {:?} under {:?}", child, parent);

    if in_scene(world, parent) {
        lifecycle::register_subtree(world, child);
        lifecycle::start_subtree(world, child)
    } else {
        lifecycle::unregister_subtree(world, child);
        Ok(())
    }
}

/// Detach `child` from `parent`. The child subtree becomes unscened until it
/// is added again. Returns `false` if `child` was not a child of `parent`.
pub fn detach_child(world: &mut World, parent: Entity, child: Entity) -> bool {
    if parent_of(world, child) != Some(parent) {
        return false;
    }
    world.entity_mut(child).remove::<ChildOf>();
    world.flush();
    lifecycle::unregister_subtree(world, child);
    debug!("Detached {:?} from {:?}", child, parent);
    true
}

/// Read-only view of a game object.
#[derive(Clone, Copy)]
pub struct GameObjectRef<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> GameObjectRef<'w> {
    pub fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    pub fn info(&self) -> Option<&'w GameObject> {
        self.world.get::<GameObject>(self.entity)
    }

    pub fn name(&self) -> &'w str {
        self.info().map(|info| info.name.as_str()).unwrap_or("")
    }

    pub fn is_active(&self) -> bool {
        self.info().is_some_and(|info| info.active)
    }

    pub fn in_scene(&self) -> bool {
        in_scene(self.world, self.entity)
    }

    pub fn transform(&self) -> Result<&'w Transform> {
        self.world
            .get::<Transform>(self.entity)
            .ok_or(EngineError::NoSuchGameObject(self.entity))
    }

    pub fn world_position(&self) -> Vec2 {
        transform::world_position(self.world, self.entity)
    }

    pub fn world_rotation(&self) -> f32 {
        transform::world_rotation(self.world, self.entity)
    }

    pub fn world_rotation_radians(&self) -> f32 {
        transform::world_rotation_radians(self.world, self.entity)
    }

    pub fn world_scale(&self) -> Vec2 {
        transform::world_scale(self.world, self.entity)
    }

    pub fn get_component<T: Behaviour>(&self) -> Option<&'w T> {
        component::<T>(self.world, self.entity)
    }

    pub fn has_component<T: Behaviour>(&self) -> bool {
        TypeId::of::<T>() == TypeId::of::<Transform>()
            || self
                .world
                .get::<ComponentSet>(self.entity)
                .is_some_and(|set| set.contains_type(TypeId::of::<T>()))
    }

    /// Whether the component of type `T` is attached and active.
    pub fn is_component_active<T: Behaviour>(&self) -> bool {
        self.world
            .get::<ComponentSet>(self.entity)
            .is_some_and(|set| set.is_active(TypeId::of::<T>()))
    }

    pub fn is_component_started<T: Behaviour>(&self) -> bool {
        self.world
            .get::<ComponentSet>(self.entity)
            .is_some_and(|set| set.is_started(TypeId::of::<T>()))
    }

    /// Attached component names, `Transform` first.
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names = vec![short_type_name::<Transform>()];
        if let Some(set) = self.world.get::<ComponentSet>(self.entity) {
            names.extend(set.names());
        }
        names
    }

    pub fn parent(&self) -> Option<Entity> {
        parent_of(self.world, self.entity)
    }

    pub fn children(&self) -> SmallVec<[Entity; 8]> {
        children_of(self.world, self.entity)
    }

    pub fn physics(&self) -> Option<&'w dyn Simulator> {
        self.world
            .get_resource::<PhysicsWorld>()
            .map(|physics| physics.simulator())
    }
}

/// Mutable view of a game object, handed to component hooks.
pub struct GameObjectMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> GameObjectMut<'w> {
    pub fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn as_readonly(&self) -> GameObjectRef<'_> {
        GameObjectRef::new(self.world, self.entity)
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Mutable view of another game object in the same scene.
    pub fn object_mut(&mut self, entity: Entity) -> Option<GameObjectMut<'_>> {
        if exists(self.world, entity) {
            Some(GameObjectMut::new(self.world, entity))
        } else {
            None
        }
    }

    pub fn name(&self) -> &str {
        self.world
            .get::<GameObject>(self.entity)
            .map(|info| info.name.as_str())
            .unwrap_or("")
    }

    pub fn set_active(&mut self, active: bool) {
        if let Some(mut info) = self.world.get_mut::<GameObject>(self.entity) {
            info.active = active;
        }
    }

    pub fn transform(&self) -> Result<&Transform> {
        self.world
            .get::<Transform>(self.entity)
            .ok_or(EngineError::NoSuchGameObject(self.entity))
    }

    pub fn transform_mut(&mut self) -> Result<&mut Transform> {
        self.world
            .get_mut::<Transform>(self.entity)
            .map(Mut::into_inner)
            .ok_or(EngineError::NoSuchGameObject(self.entity))
    }

    pub fn world_position(&self) -> Vec2 {
        transform::world_position(self.world, self.entity)
    }

    pub fn set_world_position(&mut self, x: f32, y: f32) -> Result<()> {
        transform::set_world_position(self.world, self.entity, x, y)
    }

    pub fn world_rotation(&self) -> f32 {
        transform::world_rotation(self.world, self.entity)
    }

    pub fn set_world_rotation(&mut self, degrees: f32) -> Result<()> {
        transform::set_world_rotation(self.world, self.entity, degrees)
    }

    pub fn world_scale(&self) -> Vec2 {
        transform::world_scale(self.world, self.entity)
    }

    pub fn set_world_scale(&mut self, sx: f32, sy: f32) -> Result<()> {
        transform::set_world_scale(self.world, self.entity, sx, sy)
    }

    pub fn get_component<T: Behaviour>(&self) -> Option<&T> {
        component::<T>(self.world, self.entity)
    }

    pub fn get_component_mut<T: Behaviour>(&mut self) -> Option<&mut T> {
        component_mut::<T>(self.world, self.entity)
    }

    /// Attach `component`.
    ///
    /// Fails with [`EngineError::DuplicateComponent`] if a `T` is already
    /// attached (the existing one is kept), and with
    /// [`EngineError::InvalidAttachment`] if `T` requires a root game object
    /// and this one has a parent. If the game object is registered in a
    /// scene, the component is started immediately; if that start fails the
    /// component is detached again and the error returned.
    pub fn add_component<T: Behaviour>(&mut self, component: T) -> Result<()> {
        let type_name = short_type_name::<T>();
        if TypeId::of::<T>() == TypeId::of::<Transform>() {
            return Err(EngineError::DuplicateComponent {
                component: type_name,
            });
        }
        if component.requires_root() && self.as_readonly().parent().is_some() {
            return Err(EngineError::InvalidAttachment {
                component: type_name,
                reason: "rigidbody components are only valid on root game objects",
            });
        }
        let mut set = self
            .world
            .get_mut::<ComponentSet>(self.entity)
            .ok_or(EngineError::NoSuchGameObject(self.entity))?;
        if set.contains_type(TypeId::of::<T>()) {
            return Err(EngineError::DuplicateComponent {
                component: type_name,
            });
        }
        set.push(component);
        debug!("Attached {} to {:?}", type_name, self.entity);

        if in_scene(self.world, self.entity) {
            if let Err(err) = lifecycle::start_component(self.world, self.entity, TypeId::of::<T>()) {
                // a component that failed to start is not left attached
                self.remove_component::<T>();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Detach the `T` component, running its `on_remove` hook. Returns
    /// `false` for `Transform` and for types that are not attached.
    pub fn remove_component<T: Behaviour>(&mut self) -> bool {
        let type_id = TypeId::of::<T>();
        if type_id == TypeId::of::<Transform>() {
            return false;
        }
        let Some(slot) = self
            .world
            .get_mut::<ComponentSet>(self.entity)
            .and_then(|set| set.into_inner().remove(type_id))
        else {
            return false;
        };
        debug!("Detached {} from {:?}", slot.type_name, self.entity);
        // a component removing itself is torn down when its hook returns
        if let Some(mut component) = slot.component {
            component.on_remove(self);
        }
        true
    }

    /// Toggle a component's active flag. Returns `false` if `T` is not
    /// attached.
    pub fn set_component_active<T: Behaviour>(&mut self, active: bool) -> bool {
        self.world
            .get_mut::<ComponentSet>(self.entity)
            .and_then(|set| set.into_inner().slot_mut(TypeId::of::<T>()))
            .map(|slot| slot.active = active)
            .is_some()
    }

    pub fn add_child(&mut self, child: Entity) -> Result<()> {
        attach_child(self.world, self.entity, child)
    }

    pub fn remove_child(&mut self, child: Entity) -> bool {
        detach_child(self.world, self.entity, child)
    }

    pub fn physics(&self) -> Option<&dyn Simulator> {
        self.world
            .get_resource::<PhysicsWorld>()
            .map(|physics| physics.simulator())
    }

    pub fn physics_mut(&mut self) -> Option<&mut dyn Simulator> {
        self.world
            .get_resource_mut::<PhysicsWorld>()
            .map(|physics| physics.into_inner().simulator_mut())
    }

    pub fn request_scene(&mut self, name: impl Into<String>) {
        self.world
            .get_resource_or_insert_with(EngineSignals::default)
            .request_scene(name);
    }

    pub fn request_quit(&mut self) {
        self.world
            .get_resource_or_insert_with(EngineSignals::default)
            .request_quit();
    }
}
