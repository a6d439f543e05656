//! Requests from gameplay code to the engine loop.
//!
//! Components cannot reach the [`SceneManager`](crate::scenemanager::SceneManager)
//! from inside a hook, so they record their intent in the scene's
//! [`EngineSignals`] resource. The engine drains it once the frame's passes
//! have completed.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineSignals {
    next_scene: Option<String>,
    quit: bool,
}

impl EngineSignals {
    /// Ask for `name` to become the active scene after this frame. A later
    /// request in the same frame replaces an earlier one.
    pub fn request_scene(&mut self, name: impl Into<String>) {
        self.next_scene = Some(name.into());
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn pending_scene(&self) -> Option<&str> {
        self.next_scene.as_deref()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Take every pending request, leaving the signals empty.
    pub fn take(&mut self) -> EngineSignals {
        std::mem::take(self)
    }
}
