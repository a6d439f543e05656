//! Lifecycle propagation through game object subtrees.
//!
//! Every pass visits a game object's components in attachment order, then
//! recurses into its children in insertion order. Component and child lists
//! are snapshotted before a pass touches them, so hooks may add or remove
//! components and game objects freely: removed ones are skipped, added ones
//! are picked up on the next pass (or started immediately on attachment).
//!
//! A hook runs with its component taken out of the [`ComponentSet`]; the
//! component is put back afterwards even when the hook fails.

use std::any::TypeId;

use bevy_ecs::prelude::*;
use log::{debug, warn};
use smallvec::SmallVec;

use crate::component::{Component as Behaviour, FrameContext};
use crate::components::transform::Transform;
use crate::error::Result;
use crate::gameobject::{
    ComponentSet, GameObject, GameObjectMut, GameObjectRef, InScene, StartTransform, children_of,
};
use crate::render::Canvas;

fn types_of(world: &World, entity: Entity) -> SmallVec<[TypeId; 8]> {
    world
        .get::<ComponentSet>(entity)
        .map(ComponentSet::type_ids)
        .unwrap_or_default()
}

fn object_active(world: &World, entity: Entity) -> bool {
    world.get::<GameObject>(entity).is_some_and(|info| info.active)
}

/// Run `hook` on one component with the component detached from its set.
///
/// If the component was removed from its game object while the hook ran, it
/// is torn down here with `on_remove` instead of being put back.
fn run_hook(
    world: &mut World,
    entity: Entity,
    type_id: TypeId,
    hook: impl FnOnce(&mut dyn Behaviour, &mut GameObjectMut<'_>) -> Result<()>,
) -> Result<()> {
    let Some(mut component) = world
        .get_mut::<ComponentSet>(entity)
        .and_then(|set| set.into_inner().take(type_id))
    else {
        return Ok(());
    };

    let mut obj = GameObjectMut::new(world, entity);
    let result = hook(component.as_mut(), &mut obj);

    let orphan = match world.get_mut::<ComponentSet>(entity) {
        Some(set) => set.into_inner().restore(type_id, component).err(),
        None => Some(component),
    };
    if let Some(mut orphan) = orphan {
        warn!("Component on {:?} was removed during its own hook", entity);
        orphan.on_remove(&mut GameObjectMut::new(world, entity));
    }
    result
}

/// Mark a subtree as registered and record the start transform of every game
/// object entering the scene.
pub fn register_subtree(world: &mut World, entity: Entity) {
    if world.get::<InScene>(entity).is_none() {
        if let Some(transform) = world.get::<Transform>(entity).copied() {
            world
                .entity_mut(entity)
                .insert((InScene, StartTransform(transform)));
        }
        debug!("Registered {:?}", entity);
    }
    for child in children_of(world, entity) {
        register_subtree(world, child);
    }
}

/// Clear the scene marker on a whole subtree.
pub fn unregister_subtree(world: &mut World, entity: Entity) {
    if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
        entity_mut.remove::<InScene>();
    }
    for child in children_of(world, entity) {
        unregister_subtree(world, child);
    }
}

/// Run `f` on the `T` component of `entity` with the same detach-and-restore
/// rules as a lifecycle hook. Returns `None` if no `T` is attached.
pub fn with_component<T: Behaviour, R>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut T, &mut GameObjectMut<'_>) -> Result<R>,
) -> Option<Result<R>> {
    let mut out = None;
    let result = run_hook(world, entity, TypeId::of::<T>(), |component, obj| {
        let Some(component) = component.as_any_mut().downcast_mut::<T>() else {
            return Ok(());
        };
        out = Some(f(component, obj));
        Ok(())
    });
    result.err().map(Err).or(out)
}

/// Start one component unless it has already been started.
pub fn start_component(world: &mut World, entity: Entity, type_id: TypeId) -> Result<()> {
    let first_start = world
        .get_mut::<ComponentSet>(entity)
        .is_some_and(|set| set.into_inner().mark_started(type_id));
    if !first_start {
        return Ok(());
    }
    run_hook(world, entity, type_id, |component, obj| component.start(obj))
}

/// Start every unstarted component of the subtree. Runs regardless of the
/// active flags; safe to call repeatedly.
pub fn start_subtree(world: &mut World, entity: Entity) -> Result<()> {
    for type_id in types_of(world, entity) {
        start_component(world, entity, type_id)?;
    }
    for child in children_of(world, entity) {
        start_subtree(world, child)?;
    }
    Ok(())
}

/// Variable-rate pass. Inactive game objects skip their whole subtree;
/// inactive or unstarted components are skipped.
pub fn update_subtree(world: &mut World, entity: Entity, frame: &FrameContext<'_>) -> Result<()> {
    if !object_active(world, entity) {
        return Ok(());
    }
    for type_id in types_of(world, entity) {
        if !runnable(world, entity, type_id) {
            continue;
        }
        run_hook(world, entity, type_id, |component, obj| {
            component.update(obj, frame)
        })?;
    }
    for child in children_of(world, entity) {
        update_subtree(world, child, frame)?;
    }
    Ok(())
}

/// Fixed-rate pass, same visiting rules as [`update_subtree`].
pub fn fixed_update_subtree(world: &mut World, entity: Entity, dt: f32) -> Result<()> {
    if !object_active(world, entity) {
        return Ok(());
    }
    for type_id in types_of(world, entity) {
        if !runnable(world, entity, type_id) {
            continue;
        }
        run_hook(world, entity, type_id, |component, obj| {
            component.fixed_update(obj, dt)
        })?;
    }
    for child in children_of(world, entity) {
        fixed_update_subtree(world, child, dt)?;
    }
    Ok(())
}

fn runnable(world: &World, entity: Entity, type_id: TypeId) -> bool {
    world
        .get::<ComponentSet>(entity)
        .is_some_and(|set| set.is_active(type_id) && set.is_started(type_id))
}

/// Draw pass. Read-only, so no component is detached while drawing.
pub fn render_subtree(world: &World, entity: Entity, canvas: &mut Canvas<'_>) {
    if !object_active(world, entity) {
        return;
    }
    let obj = GameObjectRef::new(world, entity);
    if let Some(set) = world.get::<ComponentSet>(entity) {
        for (active, component) in set.iter_attached() {
            if active {
                component.render(&obj, canvas);
            }
        }
    }
    for child in children_of(world, entity) {
        render_subtree(world, child, canvas);
    }
}

/// Run `on_remove` on every component of the subtree, leaving the slots
/// empty. The caller despawns the subtree afterwards.
pub fn teardown_subtree(world: &mut World, entity: Entity) {
    for type_id in types_of(world, entity) {
        let taken = world
            .get_mut::<ComponentSet>(entity)
            .and_then(|set| set.into_inner().take(type_id));
        if let Some(mut component) = taken {
            component.on_remove(&mut GameObjectMut::new(world, entity));
        }
    }
    for child in children_of(world, entity) {
        teardown_subtree(world, child);
    }
}

/// Restore recorded start transforms, then call every component's
/// `reset_to_start` hook.
pub fn reset_subtree(world: &mut World, entity: Entity) -> Result<()> {
    let start = world.get::<StartTransform>(entity).map(|start| start.0);
    if let (Some(start), Some(mut transform)) = (start, world.get_mut::<Transform>(entity)) {
        let body = transform.physics_body();
        *transform = start;
        transform.set_physics_body(body);
    }
    for type_id in types_of(world, entity) {
        run_hook(world, entity, type_id, |component, obj| {
            component.reset_to_start(obj)
        })?;
    }
    for child in children_of(world, entity) {
        reset_subtree(world, child)?;
    }
    Ok(())
}
