//! Scene camera.
//!
//! Maps world coordinates to screen coordinates with an offset and a zoom:
//! `screen = (world - offset) * zoom`. Every scene owns one camera game
//! object; its [`CameraView`] is resolved once per render pass.
use crate::component::Component;
use crate::error::{EngineError, Result};
use crate::math::Vec2;
use crate::render::CameraView;

/// Pixels of slack used by [`Camera::is_visible`].
pub const VISIBILITY_TOLERANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    offset: Vec2,
    zoom: f32,
    viewport: (u32, u32),
}

impl Camera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            offset: Vec2::new(0.0, 0.0),
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, x: f32, y: f32) {
        self.offset = Vec2::new(x, y);
    }

    /// Pan by a delta in world units.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.offset += Vec2::new(dx, dy);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// 1.0 is normal size, below zooms out, above zooms in.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        if zoom <= 0.0 || zoom.is_nan() {
            return Err(EngineError::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        Ok(())
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            offset: self.offset,
            zoom: self.zoom,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.view().world_to_screen(world)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.view().screen_to_world(screen)
    }

    pub fn scale_length(&self, length: f32) -> f32 {
        self.view().scale_length(length)
    }

    /// Place `target` at the centre of the viewport.
    pub fn center_on(&mut self, target: Vec2) {
        let (w, h) = self.viewport;
        self.offset = Vec2::new(
            target.x - (w as f32 / 2.0) / self.zoom,
            target.y - (h as f32 / 2.0) / self.zoom,
        );
    }

    /// Whether a `width` x `height` box centred on `center` overlaps the
    /// viewport, with [`VISIBILITY_TOLERANCE`] pixels of slack.
    pub fn is_visible(&self, center: Vec2, width: f32, height: f32) -> bool {
        let half = Vec2::new(width / 2.0, height / 2.0);
        let top_left = self.world_to_screen(center - half);
        let bottom_right = self.world_to_screen(center + half);
        let (w, h) = (self.viewport.0 as f32, self.viewport.1 as f32);
        let tol = VISIBILITY_TOLERANCE;
        !(bottom_right.x < -tol
            || top_left.x > w + tol
            || bottom_right.y < -tol
            || top_left.y > h + tol)
    }
}

impl Component for Camera {}
