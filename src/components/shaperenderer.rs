//! Flat-colour primitive drawn at the owner's world position.
use crate::component::Component;
use crate::gameobject::GameObjectRef;
use crate::math::Vec2;
use crate::render::{Canvas, Color};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Rect { width: f32, height: f32 },
    Circle { radius: f32 },
    /// Segment between two points relative to the world position.
    Line { a: Vec2, b: Vec2, thickness: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRenderer {
    pub primitive: Primitive,
    pub color: Color,
    pub filled: bool,
}

impl ShapeRenderer {
    pub fn new(primitive: Primitive, color: Color) -> Self {
        Self {
            primitive,
            color,
            filled: true,
        }
    }

    pub fn outline(mut self) -> Self {
        self.filled = false;
        self
    }
}

impl Component for ShapeRenderer {
    fn render(&self, obj: &GameObjectRef<'_>, canvas: &mut Canvas<'_>) {
        let pos = obj.world_position();
        let scale = obj.world_scale();
        match self.primitive {
            Primitive::Rect { width, height } => canvas.rect(
                pos,
                Vec2::new(width * scale.x, height * scale.y),
                obj.world_rotation(),
                self.color,
                self.filled,
            ),
            Primitive::Circle { radius } => {
                canvas.circle(pos, radius * scale.x.max(scale.y), self.color, self.filled)
            }
            Primitive::Line { a, b, thickness } => {
                canvas.line(pos + a, pos + b, thickness, self.color)
            }
        }
    }
}
