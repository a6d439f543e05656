//! Keeps the scene camera centred on a target game object.
use bevy_ecs::entity::Entity;

use crate::component::{Component, FrameContext};
use crate::components::camera::Camera;
use crate::error::Result;
use crate::gameobject::{self, GameObjectMut};
use crate::scene::SceneCamera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraController {
    pub target: Entity,
}

impl CameraController {
    pub fn new(target: Entity) -> Self {
        Self { target }
    }
}

impl Component for CameraController {
    fn update(&mut self, obj: &mut GameObjectMut<'_>, _frame: &FrameContext<'_>) -> Result<()> {
        // target may have been removed from the scene
        if !gameobject::exists(obj.world(), self.target) {
            return Ok(());
        }
        let Some(camera) = obj.world().get_resource::<SceneCamera>().map(|c| c.0) else {
            return Ok(());
        };
        let target = crate::components::transform::world_position(obj.world(), self.target);
        if let Some(cam) = gameobject::component_mut::<Camera>(obj.world_mut(), camera) {
            cam.center_on(target);
        }
        Ok(())
    }
}
