//! Host platforms: window, clock, input and the frame's drawing surface.
//!
//! The engine only needs four things from a host, captured by [`Platform`].
//! [`HeadlessPlatform`] drives the loop without a window (used by the binary
//! by default and by tests); the raylib window lives behind the `raylib`
//! cargo feature.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::render::{RecordingSurface, Surface};
use crate::resources::input::{InputState, Key};

#[cfg(feature = "raylib")]
pub mod raylib;

pub trait Platform {
    fn should_close(&self) -> bool;
    /// Seconds since the previous frame.
    fn frame_time(&mut self) -> f32;
    /// Refresh `input` from the current key states.
    fn poll_input(&mut self, input: &mut InputState);
    /// Hand the frame's surface to `frame`, then present it.
    fn draw(&mut self, frame: &mut dyn FnMut(&mut dyn Surface)) -> Result<()>;
}

/// Windowless platform with a scripted clock.
///
/// Every frame reports the same `dt` unless `realtime` is enabled, in which
/// case frame times are measured and the loop sleeps to the target rate.
pub struct HeadlessPlatform {
    surface: RecordingSurface,
    dt: f32,
    max_frames: Option<u64>,
    frames: u64,
    realtime: Option<Duration>,
    last_frame: Option<Instant>,
    held: Vec<Key>,
}

impl HeadlessPlatform {
    pub fn new(width: u32, height: u32, dt: f32) -> Self {
        Self {
            surface: RecordingSurface::new(width, height),
            dt,
            max_frames: None,
            frames: 0,
            realtime: None,
            last_frame: None,
            held: Vec::new(),
        }
    }

    /// Close after `frames` presented frames.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Measure real frame times and cap the loop at `target_fps`.
    pub fn realtime(mut self, target_fps: u32) -> Self {
        self.realtime = Some(Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))));
        self
    }

    /// Keys reported as held on every frame.
    pub fn hold_keys(&mut self, keys: &[Key]) {
        self.held = keys.to_vec();
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The last presented frame.
    pub fn surface(&self) -> &RecordingSurface {
        &self.surface
    }
}

impl Platform for HeadlessPlatform {
    fn should_close(&self) -> bool {
        self.max_frames.is_some_and(|max| self.frames >= max)
    }

    fn frame_time(&mut self) -> f32 {
        let Some(target) = self.realtime else {
            return self.dt;
        };
        let now = Instant::now();
        let elapsed = match self.last_frame {
            Some(last) => {
                let spent = now.duration_since(last);
                if spent < target {
                    std::thread::sleep(target - spent);
                }
                Instant::now().duration_since(last)
            }
            None => target,
        };
        self.last_frame = Some(Instant::now());
        elapsed.as_secs_f32()
    }

    fn poll_input(&mut self, input: &mut InputState) {
        let held = &self.held;
        input.refresh(|key| held.contains(&key));
    }

    fn draw(&mut self, frame: &mut dyn FnMut(&mut dyn Surface)) -> Result<()> {
        frame(&mut self.surface);
        self.frames += 1;
        Ok(())
    }
}
