//! Serializable debug view of a scene tree.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::transform::Transform;
use crate::gameobject::{GameObject, GameObjectRef, children_of};
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub local_position: [f32; 2],
    pub local_rotation: f32,
    pub local_scale: [f32; 2],
    pub world_position: [f32; 2],
    pub world_rotation: f32,
    pub has_body: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObjectSnapshot {
    pub id: u64,
    /// Hex encoded, JSON numbers cannot hold 128 bits.
    pub uid: String,
    pub name: String,
    pub active: bool,
    pub transform: TransformSnapshot,
    pub components: Vec<String>,
    pub children: Vec<GameObjectSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub name: String,
    pub physics_steps: u64,
    pub roots: Vec<GameObjectSnapshot>,
}

fn capture_object(world: &World, entity: Entity) -> Option<GameObjectSnapshot> {
    let info = world.get::<GameObject>(entity)?;
    let transform = world.get::<Transform>(entity)?;
    let obj = GameObjectRef::new(world, entity);
    let world_position = obj.world_position();
    Some(GameObjectSnapshot {
        id: info.id(),
        uid: format!("{:032x}", info.uid()),
        name: info.name.clone(),
        active: info.active,
        transform: TransformSnapshot {
            local_position: transform.local_position().into(),
            local_rotation: transform.local_rotation(),
            local_scale: transform.local_scale().into(),
            world_position: world_position.into(),
            world_rotation: obj.world_rotation(),
            has_body: transform.physics_body().is_some(),
        },
        components: obj
            .component_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        children: children_of(world, entity)
            .into_iter()
            .filter_map(|child| capture_object(world, child))
            .collect(),
    })
}

pub fn capture(scene: &Scene) -> SceneSnapshot {
    SceneSnapshot {
        name: scene.name().to_string(),
        physics_steps: scene.physics().steps(),
        roots: scene
            .roots()
            .iter()
            .filter_map(|root| capture_object(scene.world(), *root))
            .collect(),
    }
}
