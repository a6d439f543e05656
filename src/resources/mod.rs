//! World resources.
//!
//! Long-lived data inserted into each scene's world or owned by the engine.
//!
//! Overview
//! - `engineconfig` – window, timing and physics settings loaded from an INI file
//! - `input` – key bindings and per-frame pressed/released state
//! - `physics` – simulator boundary and the per-scene physics world
//! - `signals` – scene-switch and quit requests raised by components

pub mod engineconfig;
pub mod input;
pub mod physics;
pub mod signals;
