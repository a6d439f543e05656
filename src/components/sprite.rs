//! Textured quad drawn at the owner's world position.
//!
//! The texture itself is owned by the host: a [`Sprite`] only carries the
//! [`TextureId`] the host handed out and the unscaled size in world units.
use crate::component::Component;
use crate::gameobject::GameObjectRef;
use crate::math::Vec2;
use crate::render::{Canvas, Color, TextureId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    pub width: f32,
    pub height: f32,
    pub tint: Color,
}

impl Sprite {
    pub fn new(texture: TextureId, width: f32, height: f32) -> Self {
        Self {
            texture,
            width,
            height,
            tint: Color::WHITE,
        }
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Swap the texture at runtime, keeping size and tint.
    pub fn change_texture(&mut self, texture: TextureId) {
        self.texture = texture;
    }

    /// Size after applying `scale`.
    pub fn scaled_size(&self, scale: Vec2) -> Vec2 {
        Vec2::new(self.width * scale.x, self.height * scale.y)
    }
}

impl Component for Sprite {
    fn render(&self, obj: &GameObjectRef<'_>, canvas: &mut Canvas<'_>) {
        canvas.blit(
            self.texture,
            obj.world_position(),
            self.scaled_size(obj.world_scale()),
            obj.world_rotation(),
            self.tint,
        );
    }
}
