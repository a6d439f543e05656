//! 2D math types shared by the scene and the physics boundary.
//!
//! The vector type is nalgebra's, taken from rapier's re-export so both sides
//! of the simulator boundary always agree on the nalgebra version.

pub use rapier2d::na;

/// 2D vector in world units.
pub type Vec2 = na::Vector2<f32>;

/// Rotate `v` by `radians` around the origin.
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotate `point` by `radians` around `pivot`.
pub fn rotate_around(point: Vec2, pivot: Vec2, radians: f32) -> Vec2 {
    rotate(point - pivot, radians) + pivot
}
