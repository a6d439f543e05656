//! Eight-way movement for top-down games.
use std::f32::consts::FRAC_1_SQRT_2;

use crate::component::{Component, FrameContext};
use crate::components::platformermovement::require_rigidbody;
use crate::components::rigidbody::Rigidbody2D;
use crate::error::Result;
use crate::gameobject::GameObjectMut;
use crate::math::Vec2;
use crate::resources::input::InputState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopDownMovement {
    pub speed: f32,
}

impl Default for TopDownMovement {
    fn default() -> Self {
        Self { speed: 200.0 }
    }
}

impl TopDownMovement {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Target velocity for the current input; diagonals keep the same speed.
    pub fn velocity_for(&self, input: &InputState) -> Vec2 {
        let (x, y) = (input.horizontal(), input.vertical());
        let scale = if x != 0.0 && y != 0.0 {
            FRAC_1_SQRT_2
        } else {
            1.0
        };
        Vec2::new(x, y) * (self.speed * scale)
    }
}

impl Component for TopDownMovement {
    fn start(&mut self, obj: &mut GameObjectMut<'_>) -> Result<()> {
        require_rigidbody::<Self>(obj)
    }

    fn update(&mut self, obj: &mut GameObjectMut<'_>, frame: &FrameContext<'_>) -> Result<()> {
        let v = self.velocity_for(frame.input);
        Rigidbody2D::set_velocity(obj, v.x, v.y)
    }
}
