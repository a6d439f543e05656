//! Attachable behaviour units.
//!
//! A [`Component`] is a boxed, type-erased unit of behaviour stored inside a
//! game object's [`ComponentSet`](crate::gameobject::ComponentSet). Every hook
//! has a no-op default, so a component only implements the phases it cares
//! about.
//!
//! Hooks receive a [`GameObjectMut`] for the owning game object. While a hook
//! runs, the component itself is temporarily detached from its set, so
//! `get_component::<Self>()` from inside its own hook returns `None`; every
//! sibling stays reachable.

use std::any::Any;

use crate::error::Result;
use crate::gameobject::{GameObjectMut, GameObjectRef};
use crate::render::Canvas;
use crate::resources::input::InputState;

/// Upcast helper so boxed components can be downcast to their concrete type.
///
/// Implemented for every `'static` sized type; never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-frame data handed to the variable-rate `update` pass.
///
/// The input snapshot is passed explicitly instead of being read from a
/// global, so a test can drive any component with a hand-built
/// [`InputState`].
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Elapsed seconds for this frame (already capped by the frame clock).
    pub dt: f32,
    /// Input state sampled once before the update pass.
    pub input: &'a InputState,
}

impl<'a> FrameContext<'a> {
    pub fn new(dt: f32, input: &'a InputState) -> Self {
        Self { dt, input }
    }
}

/// Polymorphic behaviour attached to exactly one game object.
///
/// At most one instance of each concrete type may be attached to a game
/// object. Hooks run in attachment order, depth-first through the hierarchy.
pub trait Component: AsAny + Send + Sync {
    /// Called once, after attachment, when the owner is registered in a scene.
    fn start(&mut self, _obj: &mut GameObjectMut<'_>) -> Result<()> {
        Ok(())
    }

    /// Variable-rate logic: input-driven movement, animation, cameras.
    fn update(&mut self, _obj: &mut GameObjectMut<'_>, _frame: &FrameContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Fixed-rate logic, called after the physics world has been stepped.
    fn fixed_update(&mut self, _obj: &mut GameObjectMut<'_>, _dt: f32) -> Result<()> {
        Ok(())
    }

    /// Issue draw calls. Coordinates go through the canvas camera.
    fn render(&self, _obj: &GameObjectRef<'_>, _canvas: &mut Canvas<'_>) {}

    /// Teardown, called when detached or when the owner is removed.
    fn on_remove(&mut self, _obj: &mut GameObjectMut<'_>) {}

    /// Called by [`Scene::reset_to_start`](crate::scene::Scene::reset_to_start)
    /// after the owner's transform has been restored.
    fn reset_to_start(&mut self, _obj: &mut GameObjectMut<'_>) -> Result<()> {
        Ok(())
    }

    /// Rigidbody-family components return `true`: they may only be attached to
    /// root-level game objects.
    fn requires_root(&self) -> bool {
        false
    }
}

/// Short type name used in error messages and snapshots (`Rigidbody2D`, not
/// `cogworks::components::rigidbody::Rigidbody2D`).
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn short_type_name_strips_module_path() {
        assert_eq!(short_type_name::<Marker>(), "Marker");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn short_type_name_keeps_generic_arguments() {
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec<u8>");
    }

    #[test]
    fn as_any_downcasts_to_concrete_type() {
        let value = 7_u32;
        let any = value.as_any();
        assert_eq!(any.downcast_ref::<u32>(), Some(&7));
        assert!(any.downcast_ref::<i32>().is_none());
    }
}
