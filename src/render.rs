//! Rendering boundary.
//!
//! Components never talk to a graphics backend directly. They draw through a
//! [`Canvas`], which resolves world coordinates with the scene camera's
//! [`CameraView`] (`screen = (world - offset) * zoom`) and forwards screen
//! space primitives to the host's [`Surface`].

use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(230, 41, 55);
    pub const GREEN: Color = Color::rgb(0, 228, 48);
    pub const BLUE: Color = Color::rgb(0, 121, 241);
    pub const YELLOW: Color = Color::rgb(253, 249, 0);
    pub const GRAY: Color = Color::rgb(130, 130, 130);
    pub const DARKGRAY: Color = Color::rgb(80, 80, 80);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Host-assigned texture identifier. Loading and decoding images is the
/// host's business; components only carry the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Drawable target provided by the host. All coordinates are screen pixels.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: Color);
    fn draw_line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Color);
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, filled: bool);
    /// Rectangle of `size` centred on `center`, rotated clockwise by
    /// `rotation` degrees (y grows downwards).
    fn draw_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color, filled: bool);
    fn blit(&mut self, texture: TextureId, center: Vec2, size: Vec2, rotation: f32, tint: Color);
}

/// World-to-screen mapping resolved from the scene camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub offset: Vec2,
    pub zoom: f32,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.0, 0.0),
            zoom: 1.0,
        }
    }
}

impl CameraView {
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.offset) * self.zoom
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.zoom + self.offset
    }

    pub fn scale_length(&self, length: f32) -> f32 {
        length * self.zoom
    }
}

/// Camera-aware drawing handle passed to
/// [`Component::render`](crate::component::Component::render).
pub struct Canvas<'a> {
    surface: &'a mut dyn Surface,
    view: CameraView,
}

impl<'a> Canvas<'a> {
    pub fn new(surface: &'a mut dyn Surface, view: CameraView) -> Self {
        Self { surface, view }
    }

    pub fn view(&self) -> CameraView {
        self.view
    }

    /// Raw surface access for screen-space drawing (HUDs and overlays).
    pub fn surface_mut(&mut self) -> &mut dyn Surface {
        self.surface
    }

    pub fn line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Color) {
        let view = self.view;
        self.surface.draw_line(
            view.world_to_screen(a),
            view.world_to_screen(b),
            view.scale_length(thickness).max(1.0),
            color,
        );
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color, filled: bool) {
        let view = self.view;
        self.surface.draw_circle(
            view.world_to_screen(center),
            view.scale_length(radius),
            color,
            filled,
        );
    }

    pub fn rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color, filled: bool) {
        let view = self.view;
        self.surface.draw_rect(
            view.world_to_screen(center),
            size * view.zoom,
            rotation,
            color,
            filled,
        );
    }

    /// Closed outline through `points`, in world coordinates.
    pub fn polygon(&mut self, points: &[Vec2], thickness: f32, color: Color) {
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.line(*a, b, thickness, color);
        }
    }

    pub fn blit(&mut self, texture: TextureId, center: Vec2, size: Vec2, rotation: f32, tint: Color) {
        let view = self.view;
        self.surface.blit(
            texture,
            view.world_to_screen(center),
            size * view.zoom,
            rotation,
            tint,
        );
    }
}

/// One primitive recorded by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line { a: Vec2, b: Vec2, thickness: f32, color: Color },
    Circle { center: Vec2, radius: f32, color: Color, filled: bool },
    Rect { center: Vec2, size: Vec2, rotation: f32, color: Color, filled: bool },
    Blit { texture: TextureId, center: Vec2, size: Vec2, rotation: f32, tint: Color },
}

/// Surface that keeps the draw calls of the current frame in memory. Used
/// by the headless platform and by tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Draw calls since the last clear, excluding the clear itself.
    pub fn draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| !matches!(cmd, DrawCommand::Clear(_)))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Color) {
        self.commands.push(DrawCommand::Line { a, b, thickness, color });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, filled: bool) {
        self.commands.push(DrawCommand::Circle { center, radius, color, filled });
    }

    fn draw_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color, filled: bool) {
        self.commands.push(DrawCommand::Rect { center, size, rotation, color, filled });
    }

    fn blit(&mut self, texture: TextureId, center: Vec2, size: Vec2, rotation: f32, tint: Color) {
        self.commands.push(DrawCommand::Blit { texture, center, size, rotation, tint });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_resolves_world_coordinates() {
        let mut surface = RecordingSurface::new(800, 600);
        let view = CameraView {
            offset: Vec2::new(100.0, 50.0),
            zoom: 2.0,
        };
        let mut canvas = Canvas::new(&mut surface, view);
        canvas.circle(Vec2::new(110.0, 60.0), 5.0, Color::RED, true);

        assert_eq!(
            surface.commands,
            vec![DrawCommand::Circle {
                center: Vec2::new(20.0, 20.0),
                radius: 10.0,
                color: Color::RED,
                filled: true,
            }]
        );
    }

    #[test]
    fn view_round_trip() {
        let view = CameraView {
            offset: Vec2::new(-30.0, 12.0),
            zoom: 0.5,
        };
        let p = Vec2::new(7.0, -3.0);
        let back = view.screen_to_world(view.world_to_screen(p));
        assert!((back - p).norm() < 1e-4);
    }

    #[test]
    fn polygon_closes_outline() {
        let mut surface = RecordingSurface::new(10, 10);
        let mut canvas = Canvas::new(&mut surface, CameraView::default());
        canvas.polygon(
            &[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)],
            1.0,
            Color::WHITE,
        );
        assert_eq!(surface.draw_calls(), 3);
    }

    #[test]
    fn clear_starts_a_new_frame() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.draw_line(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 1.0, Color::WHITE);
        surface.clear(Color::BLACK);
        assert_eq!(surface.commands, vec![DrawCommand::Clear(Color::BLACK)]);
        assert_eq!(surface.draw_calls(), 0);
    }
}
