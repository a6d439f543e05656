//! Engine configuration.
//!
//! Settings are read from an INI file. Defaults are safe for startup and any
//! key missing from the file keeps its default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 800
//! height = 600
//! title = cogworks
//! target_fps = 60
//!
//! [physics]
//! fixed_hz = 60
//! max_frame_time = 0.25
//! gravity_x = 0
//! gravity_y = 900
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::{EngineError, Result};
use crate::math::Vec2;

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 800;
const DEFAULT_WINDOW_HEIGHT: u32 = 600;
const DEFAULT_TITLE: &str = "cogworks";
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_FIXED_HZ: u32 = 60;
const DEFAULT_MAX_FRAME_TIME: f32 = 0.25;
const DEFAULT_GRAVITY_X: f32 = 0.0;
const DEFAULT_GRAVITY_Y: f32 = 900.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,
    /// Frame-rate limiter target. Zero disables limiting.
    pub target_fps: u32,
    /// Fixed physics steps per second.
    pub fixed_hz: u32,
    /// Upper bound on the elapsed time fed to one frame, in seconds.
    pub max_frame_time: f32,
    /// Gravity for newly created scenes, world units per second squared.
    pub gravity: Vec2,
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            title: DEFAULT_TITLE.to_string(),
            target_fps: DEFAULT_TARGET_FPS,
            fixed_hz: DEFAULT_FIXED_HZ,
            max_frame_time: DEFAULT_MAX_FRAME_TIME,
            gravity: Vec2::new(DEFAULT_GRAVITY_X, DEFAULT_GRAVITY_Y),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Seconds per fixed step.
    pub fn fixed_step(&self) -> f32 {
        1.0 / self.fixed_hz.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    pub fn load_from_file(&mut self) -> Result<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to load config file: {}", e)))?;

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(title) = config.get("window", "title") {
            self.title = title;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }

        // [physics] section
        if let Some(hz) = config.getuint("physics", "fixed_hz").ok().flatten() {
            if hz == 0 {
                return Err(EngineError::Config("physics.fixed_hz must be positive".into()));
            }
            self.fixed_hz = hz as u32;
        }
        if let Some(max) = config.getfloat("physics", "max_frame_time").ok().flatten() {
            self.max_frame_time = max as f32;
        }
        if let Some(gx) = config.getfloat("physics", "gravity_x").ok().flatten() {
            self.gravity.x = gx as f32;
        }
        if let Some(gy) = config.getfloat("physics", "gravity_y").ok().flatten() {
            self.gravity.y = gy as f32;
        }

        info!(
            "Loaded config: {}x{} window, fps={}, fixed_hz={}, gravity=({}, {})",
            self.window_width,
            self.window_height,
            self.target_fps,
            self.fixed_hz,
            self.gravity.x,
            self.gravity.y
        );

        Ok(())
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> Result<()> {
        let mut config = Ini::new();

        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "title", Some(self.title.clone()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        config.set("physics", "fixed_hz", Some(self.fixed_hz.to_string()));
        config.set("physics", "max_frame_time", Some(self.max_frame_time.to_string()));
        config.set("physics", "gravity_x", Some(self.gravity.x.to_string()));
        config.set("physics", "gravity_y", Some(self.gravity.y.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
