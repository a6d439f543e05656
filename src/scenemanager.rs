//! Registry of named scenes with a single active one.
//!
//! Only the active scene receives frame-loop calls. Inactive scenes are
//! frozen: no updates, no physics steps, no rendering.

use log::info;
use rustc_hash::FxHashMap;

use crate::component::FrameContext;
use crate::error::{EngineError, Result};
use crate::render::Surface;
use crate::scene::Scene;

#[derive(Default)]
pub struct SceneManager {
    scenes: FxHashMap<String, Scene>,
    active: Option<String>,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scene` under its name, replacing any scene of the same
    /// name. The first registered scene becomes active.
    pub fn add_scene(&mut self, scene: Scene) {
        let name = scene.name().to_string();
        info!("Registered scene '{}'", name);
        self.scenes.insert(name.clone(), scene);
        if self.active.is_none() {
            self.active = Some(name);
        }
    }

    pub fn remove_scene(&mut self, name: &str) -> Option<Scene> {
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        self.scenes.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    pub fn scene_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scenes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn set_active_scene(&mut self, name: &str) -> Result<()> {
        if !self.scenes.contains_key(name) {
            return Err(EngineError::SceneNotFound(name.to_string()));
        }
        info!("Activating scene '{}'", name);
        self.active = Some(name.to_string());
        Ok(())
    }

    pub fn active_scene_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.active.as_deref()?)
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.get_mut(self.active.as_deref()?)
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    pub fn update(&mut self, frame: &FrameContext<'_>) -> Result<()> {
        match self.active_scene_mut() {
            Some(scene) => scene.update(frame),
            None => Ok(()),
        }
    }

    pub fn fixed_update(&mut self, dt: f32) -> Result<()> {
        match self.active_scene_mut() {
            Some(scene) => scene.fixed_update(dt),
            None => Ok(()),
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if let Some(scene) = self.active_scene() {
            scene.render(surface);
        }
    }
}
