//! Side-on movement: horizontal run plus a grounded jump.
use crate::component::{Component, FrameContext, short_type_name};
use crate::components::rigidbody::Rigidbody2D;
use crate::error::{EngineError, Result};
use crate::gameobject::GameObjectMut;

/// Vertical speed under which the body counts as standing on something.
pub const GROUNDED_THRESHOLD: f32 = 0.1;

pub fn is_grounded(vertical_velocity: f32) -> bool {
    vertical_velocity.abs() < GROUNDED_THRESHOLD
}

/// Drives the sibling [`Rigidbody2D`] from the main and secondary direction
/// bindings. Jumps on `action_1` or either "up" binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformerMovement {
    pub speed: f32,
    pub jump_force: f32,
}

impl Default for PlatformerMovement {
    fn default() -> Self {
        Self {
            speed: 200.0,
            jump_force: 500.0,
        }
    }
}

impl PlatformerMovement {
    pub fn new(speed: f32, jump_force: f32) -> Self {
        Self { speed, jump_force }
    }
}

pub(crate) fn require_rigidbody<T>(obj: &GameObjectMut<'_>) -> Result<()> {
    if obj.get_component::<Rigidbody2D>().is_none() {
        return Err(EngineError::MissingDependency {
            component: short_type_name::<T>(),
            requires: short_type_name::<Rigidbody2D>(),
        });
    }
    Ok(())
}

impl Component for PlatformerMovement {
    fn start(&mut self, obj: &mut GameObjectMut<'_>) -> Result<()> {
        require_rigidbody::<Self>(obj)
    }

    fn update(&mut self, obj: &mut GameObjectMut<'_>, frame: &FrameContext<'_>) -> Result<()> {
        let velocity = Rigidbody2D::velocity(&obj.as_readonly())?;
        let input = frame.input;
        Rigidbody2D::set_velocity(obj, input.horizontal() * self.speed, velocity.y)?;

        let jump = input.action_1.active
            || input.maindirection_up.active
            || input.secondarydirection_up.active;
        if jump && is_grounded(velocity.y) {
            let mass = Rigidbody2D::mass(&obj.as_readonly())?;
            Rigidbody2D::apply_impulse(obj, 0.0, -self.jump_force * mass)?;
        }
        Ok(())
    }
}
