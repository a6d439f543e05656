//! Built-in components.
//!
//! [`transform`] is the one component every game object carries; it is stored
//! as a bevy component so hierarchy composition can read it without going
//! through the boxed behaviour set. Everything else implements
//! [`crate::component::Component`].
//!
//! Submodules overview:
//! - [`transform`] – local transform and world-space composition
//! - [`camera`] – per-scene view offset and zoom
//! - [`cameracontroller`] – keeps the camera centred on a target
//! - [`collider`] – rotated overlap rectangle with a separating-axis test
//! - [`platformermovement`] – run and jump on a sibling rigidbody
//! - [`rigidbody`] – keeps a simulator body in sync with the transform
//! - [`shaperenderer`] – flat-colour primitives
//! - [`sprite`] – textured quads
//! - [`topdownmovement`] – eight-way movement on a sibling rigidbody

pub mod camera;
pub mod cameracontroller;
pub mod collider;
pub mod platformermovement;
pub mod rigidbody;
pub mod shaperenderer;
pub mod sprite;
pub mod topdownmovement;
pub mod transform;
