//! Fixed-step accumulator for the frame loop.
//!
//! Each frame the measured elapsed time is capped at `max_frame_time`, added
//! to an accumulator, and whole fixed steps are drained from it. Frame times
//! within [`VSYNC_SNAP`] seconds of a whole number of steps are snapped to it,
//! so a 33 ms frame at 60 Hz yields exactly two steps instead of one step and
//! a 16.3 ms remainder.

use log::warn;

/// Snapping tolerance, in seconds.
pub const VSYNC_SNAP: f64 = 0.0005;

const EPSILON: f64 = 1e-9;

/// Shortest fixed step accepted, in seconds.
pub const MIN_STEP: f32 = 0.001;

/// What the clock decided for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Number of fixed passes to run before the variable update.
    pub fixed_steps: u32,
    /// Capped elapsed seconds for the variable update.
    pub dt: f32,
}

#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f64,
    max_frame_time: f64,
    accumulator: f64,
    elapsed: f64,
}

impl FixedStepClock {
    /// Steps shorter than [`MIN_STEP`] (including zero, negative and NaN) are
    /// raised to it. A frame time cap below one step is raised to one step.
    pub fn new(step: f32, max_frame_time: f32) -> Self {
        let step = if step >= MIN_STEP {
            step
        } else {
            warn!("Fixed step {} s clamped to {} s", step, MIN_STEP);
            MIN_STEP
        };
        let max_frame_time = if max_frame_time >= step { max_frame_time } else { step };
        Self {
            step: step as f64,
            max_frame_time: max_frame_time as f64,
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step as f32
    }

    /// Time accumulated but not yet consumed by a fixed step.
    pub fn accumulator(&self) -> f32 {
        self.accumulator as f32
    }

    /// Total capped time fed to the clock.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Feed one frame's measured elapsed time.
    pub fn advance(&mut self, elapsed: f32) -> FrameTiming {
        let mut frame = (elapsed.max(0.0) as f64).min(self.max_frame_time);
        self.elapsed += frame;

        let whole = (frame / self.step).round();
        if whole >= 1.0 && (frame - whole * self.step).abs() < VSYNC_SNAP {
            frame = whole * self.step;
        }

        self.accumulator += frame;
        let mut fixed_steps = 0;
        while self.accumulator >= self.step - EPSILON {
            self.accumulator -= self.step;
            fixed_steps += 1;
        }
        if self.accumulator < 0.0 {
            self.accumulator = 0.0;
        }

        FrameTiming {
            fixed_steps,
            dt: frame as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f32 = 1.0 / 60.0;

    #[test]
    fn thirty_three_ms_yields_two_steps() {
        let mut clock = FixedStepClock::new(STEP, 0.25);
        let timing = clock.advance(0.033);
        assert_eq!(timing.fixed_steps, 2);
        assert!(clock.accumulator() < 1e-6);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut clock = FixedStepClock::new(STEP, 0.25);
        assert_eq!(clock.advance(0.010).fixed_steps, 0);
        assert_eq!(clock.advance(0.010).fixed_steps, 1);
        assert!((clock.accumulator() - (0.020 - STEP)).abs() < 1e-6);
    }

    #[test]
    fn long_frame_is_capped() {
        let mut clock = FixedStepClock::new(STEP, 0.25);
        let timing = clock.advance(5.0);
        assert_eq!(timing.fixed_steps, 15);
        assert!((timing.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn exact_step_frames_give_one_step_each() {
        let mut clock = FixedStepClock::new(STEP, 0.25);
        for _ in 0..120 {
            assert_eq!(clock.advance(STEP).fixed_steps, 1);
        }
    }

    #[test]
    fn negative_elapsed_is_ignored() {
        let mut clock = FixedStepClock::new(STEP, 0.25);
        let timing = clock.advance(-1.0);
        assert_eq!(timing.fixed_steps, 0);
        assert_eq!(timing.dt, 0.0);
    }

    #[test]
    fn degenerate_step_is_clamped_and_terminates() {
        for step in [0.0, -1.0, f32::NAN] {
            let mut clock = FixedStepClock::new(step, 0.25);
            assert_eq!(clock.step(), MIN_STEP);
            let timing = clock.advance(0.25);
            assert_eq!(timing.fixed_steps, 250);
        }
    }

    #[test]
    fn frame_cap_is_at_least_one_step() {
        let mut clock = FixedStepClock::new(STEP, 0.0);
        assert_eq!(clock.advance(1.0).fixed_steps, 1);
    }
}
