//! Per-frame passes.
//!
//! Submodules overview
//! - [`lifecycle`] – registration and depth-first start/update/fixed/render passes
//! - [`time`] – fixed-step accumulator driving the frame loop

pub mod lifecycle;
pub mod time;
