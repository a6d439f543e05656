//! raylib window backend.
use ::raylib::prelude::{
    Color as RlColor, KeyboardKey, RaylibDraw, RaylibDrawHandle, RaylibHandle, RaylibThread,
    Rectangle, Texture2D, Vector2,
};

use crate::error::{EngineError, Result};
use crate::math::{Vec2, rotate};
use crate::platform::Platform;
use crate::render::{Color, Surface, TextureId};
use crate::resources::engineconfig::EngineConfig;
use crate::resources::input::{InputState, Key};

fn key_code(key: Key) -> KeyboardKey {
    match key {
        Key::Null => KeyboardKey::KEY_NULL,
        Key::W => KeyboardKey::KEY_W,
        Key::A => KeyboardKey::KEY_A,
        Key::S => KeyboardKey::KEY_S,
        Key::D => KeyboardKey::KEY_D,
        Key::Up => KeyboardKey::KEY_UP,
        Key::Down => KeyboardKey::KEY_DOWN,
        Key::Left => KeyboardKey::KEY_LEFT,
        Key::Right => KeyboardKey::KEY_RIGHT,
        Key::Space => KeyboardKey::KEY_SPACE,
        Key::Enter => KeyboardKey::KEY_ENTER,
        Key::Escape => KeyboardKey::KEY_ESCAPE,
        Key::F11 => KeyboardKey::KEY_F11,
    }
}

fn rl_color(c: Color) -> RlColor {
    RlColor::new(c.r, c.g, c.b, c.a)
}

fn rl_vec(v: Vec2) -> Vector2 {
    Vector2::new(v.x, v.y)
}

pub struct RaylibPlatform {
    rl: RaylibHandle,
    thread: RaylibThread,
    textures: Vec<Texture2D>,
    size: (u32, u32),
}

impl RaylibPlatform {
    pub fn new(config: &EngineConfig) -> Self {
        let (mut rl, thread) = ::raylib::init()
            .size(config.window_width as i32, config.window_height as i32)
            .title(&config.title)
            .build();
        rl.set_target_fps(config.target_fps);
        // ESC is a gameplay binding, not a window close key
        rl.set_exit_key(None);
        Self {
            rl,
            thread,
            textures: Vec::new(),
            size: (config.window_width, config.window_height),
        }
    }

    /// Load a texture file and return the id sprites refer to it by.
    pub fn load_texture(&mut self, path: &str) -> Result<TextureId> {
        let texture = self
            .rl
            .load_texture(&self.thread, path)
            .map_err(|e| EngineError::Platform(format!("failed to load {path}: {e}")))?;
        self.textures.push(texture);
        Ok(TextureId(self.textures.len() as u32 - 1))
    }
}

impl Platform for RaylibPlatform {
    fn should_close(&self) -> bool {
        self.rl.window_should_close()
    }

    fn frame_time(&mut self) -> f32 {
        self.rl.get_frame_time()
    }

    fn poll_input(&mut self, input: &mut InputState) {
        let rl = &self.rl;
        input.refresh(|key| rl.is_key_down(key_code(key)));
    }

    fn draw(&mut self, frame: &mut dyn FnMut(&mut dyn Surface)) -> Result<()> {
        let d = self.rl.begin_drawing(&self.thread);
        let mut surface = RaylibSurface {
            d,
            textures: &self.textures,
            size: self.size,
        };
        frame(&mut surface);
        Ok(())
    }
}

struct RaylibSurface<'a> {
    d: RaylibDrawHandle<'a>,
    textures: &'a [Texture2D],
    size: (u32, u32),
}

impl Surface for RaylibSurface<'_> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.d.clear_background(rl_color(color));
    }

    fn draw_line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Color) {
        self.d
            .draw_line_ex(rl_vec(a), rl_vec(b), thickness, rl_color(color));
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, filled: bool) {
        if filled {
            self.d.draw_circle_v(rl_vec(center), radius, rl_color(color));
        } else {
            self.d
                .draw_circle_lines(center.x as i32, center.y as i32, radius, rl_color(color));
        }
    }

    fn draw_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color, filled: bool) {
        if filled {
            let rec = Rectangle::new(center.x, center.y, size.x, size.y);
            let origin = Vector2::new(size.x / 2.0, size.y / 2.0);
            self.d
                .draw_rectangle_pro(rec, origin, rotation, rl_color(color));
            return;
        }
        let half = size / 2.0;
        let theta = rotation.to_radians();
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
        .map(|c| center + rotate(c, theta));
        for i in 0..corners.len() {
            let next = corners[(i + 1) % corners.len()];
            self.draw_line(corners[i], next, 1.0, color);
        }
    }

    fn blit(&mut self, texture: TextureId, center: Vec2, size: Vec2, rotation: f32, tint: Color) {
        let Some(tex) = self.textures.get(texture.0 as usize) else {
            return;
        };
        let source = Rectangle::new(0.0, 0.0, tex.width as f32, tex.height as f32);
        let dest = Rectangle::new(center.x, center.y, size.x, size.y);
        let origin = Vector2::new(size.x / 2.0, size.y / 2.0);
        self.d
            .draw_texture_pro(tex, source, dest, origin, rotation, rl_color(tint));
    }
}
