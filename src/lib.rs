//! Cogworks: a small 2D scene-graph engine core.
//!
//! Game objects live in a bevy [`World`](bevy_ecs::world::World) per scene,
//! arranged in a parent/child tree whose transforms compose additively.
//! Behaviour is attached as boxed [`component::Component`]s that receive
//! start, update, fixed update and render hooks in a deterministic
//! depth-first order. Rigidbodies keep a simulator body in sync with their
//! owner's transform on every fixed step.

pub mod component;
pub mod components;
pub mod engine;
pub mod error;
pub mod gameobject;
pub mod math;
pub mod platform;
pub mod render;
pub mod resources;
pub mod scene;
pub mod scenemanager;
pub mod snapshot;
pub mod systems;

pub use error::{EngineError, Result};
