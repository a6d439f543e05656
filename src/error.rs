//! Engine error type.
//!
//! Structural violations (duplicate components, rigidbodies on children,
//! hierarchy cycles) and missing-dependency failures are reported through
//! [`EngineError`]. Lookup misses are never errors: they come back as
//! `Option`/`bool` from the query APIs.

use bevy_ecs::entity::Entity;
use thiserror::Error;

use crate::resources::physics::{BodyHandle, ShapeHandle};

/// Errors raised by scene construction, lifecycle passes and the frame loop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("game object already has a component of type {component}")]
    DuplicateComponent { component: &'static str },

    #[error("cannot attach {component}: {reason}")]
    InvalidAttachment {
        component: &'static str,
        reason: &'static str,
    },

    #[error("{component} requires a {requires} component on the same game object")]
    MissingDependency {
        component: &'static str,
        requires: &'static str,
    },

    #[error("game object {0:?} does not exist")]
    NoSuchGameObject(Entity),

    #[error("cannot make {child:?} a child of {parent:?}: the hierarchy would contain a cycle")]
    HierarchyCycle { parent: Entity, child: Entity },

    #[error("scene '{0}' not found in scene manager")]
    SceneNotFound(String),

    #[error("zoom must be greater than 0 (got {0})")]
    InvalidZoom(f32),

    #[error("game object {0:?} has no physics body")]
    NoPhysicsBody(Entity),

    #[error("the scene has no physics world")]
    NoPhysicsWorld,

    #[error("physics body {0:?} is not known to the simulator")]
    UnknownBody(BodyHandle),

    #[error("physics shape {0:?} is not known to the simulator")]
    UnknownShape(ShapeHandle),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to serialize scene snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
