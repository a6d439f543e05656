//! Frame loop.
//!
//! [`Engine::tick`] advances the active scene by one rendered frame:
//!
//! 1. the elapsed wall time is capped and added to the fixed-step accumulator,
//! 2. zero or more `fixed_update` passes run at the constant step (each one
//!    steps physics first),
//! 3. exactly one `update` pass runs with the capped elapsed time,
//! 4. requests raised through [`EngineSignals`](crate::resources::signals::EngineSignals)
//!    are applied.
//!
//! Rendering is separate ([`Engine::render`]) so the host decides where
//! frames go. [`Engine::run`] drives both against a [`Platform`].

use log::{debug, info, trace, warn};

use crate::component::FrameContext;
use crate::error::Result;
use crate::platform::Platform;
use crate::render::Surface;
use crate::resources::engineconfig::EngineConfig;
use crate::resources::input::InputState;
use crate::scene::Scene;
use crate::scenemanager::SceneManager;
use crate::systems::time::FixedStepClock;

/// What happened during one [`Engine::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub fixed_steps: u32,
    /// Capped elapsed time handed to the update pass.
    pub dt: f32,
}

pub struct Engine {
    config: EngineConfig,
    scenes: SceneManager,
    clock: FixedStepClock,
    input: InputState,
    running: bool,
    frames: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let clock = FixedStepClock::new(config.fixed_step(), config.max_frame_time);
        Self {
            config,
            scenes: SceneManager::new(),
            clock,
            input: InputState::default(),
            running: true,
            frames: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A new scene using the configured gravity and window size.
    pub fn create_scene(&self, name: impl Into<String>) -> Scene {
        Scene::with_settings(
            name,
            self.config.gravity,
            (self.config.window_width, self.config.window_height),
        )
    }

    pub fn add_scene(&mut self, scene: Scene) {
        self.scenes.add_scene(scene);
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Frames completed by [`Engine::tick`].
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one frame. Any error from a pass aborts the frame.
    pub fn tick(&mut self, elapsed: f32) -> Result<FrameStats> {
        let timing = self.clock.advance(elapsed);
        let step = self.clock.step();
        for _ in 0..timing.fixed_steps {
            self.scenes.fixed_update(step)?;
        }
        trace!("frame {}: {} fixed steps", self.frames, timing.fixed_steps);

        let frame = FrameContext::new(timing.dt, &self.input);
        self.scenes.update(&frame)?;
        self.apply_signals();
        self.frames += 1;

        Ok(FrameStats {
            fixed_steps: timing.fixed_steps,
            dt: timing.dt,
        })
    }

    fn apply_signals(&mut self) {
        let Some(scene) = self.scenes.active_scene_mut() else {
            return;
        };
        let signals = scene.take_signals();
        if let Some(next) = signals.pending_scene() {
            debug!("Scene switch requested: '{next}'");
            if let Err(err) = self.scenes.set_active_scene(next) {
                warn!("Ignoring scene switch: {err}");
            }
        }
        if signals.quit_requested() {
            info!("Quit requested");
            self.running = false;
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        self.scenes.render(surface);
    }

    /// Run until the platform closes or a component requests quit. Returns
    /// the number of frames run.
    pub fn run(&mut self, platform: &mut dyn Platform) -> Result<u64> {
        info!(
            "Engine starting: {}x{}, fixed step {:.4}s, scene {:?}",
            self.config.window_width,
            self.config.window_height,
            self.clock.step(),
            self.scenes.active_scene_name()
        );
        self.running = true;
        let start = self.frames;
        while self.running && !platform.should_close() {
            let elapsed = platform.frame_time();
            platform.poll_input(&mut self.input);
            self.tick(elapsed)?;
            let scenes = &self.scenes;
            platform.draw(&mut |surface| scenes.render(surface))?;
        }
        let frames = self.frames - start;
        info!("Engine stopped after {frames} frames");
        Ok(frames)
    }
}
