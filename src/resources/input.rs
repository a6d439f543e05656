//! Per-frame keyboard input snapshot.
//!
//! The platform samples the keys the game cares about once per frame, before
//! the update pass, and the engine hands the resulting [`InputState`] to every
//! component through [`FrameContext`](crate::component::FrameContext).
//! Defaults use WASD for primary movement and arrow keys for secondary
//! directions.

/// Platform-independent key identifiers used for bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Null,
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    F11,
}

#[derive(Debug, Clone, Copy)]
/// Boolean key state with an associated keyboard binding.
pub struct BoolState {
    /// Whether the key is currently held this frame.
    pub active: bool,
    /// Whether the key went down this frame.
    pub just_pressed: bool,
    /// Whether the key went up this frame.
    pub just_released: bool,

    /// The key bound to this action.
    pub key_binding: Key,
}

impl Default for BoolState {
    fn default() -> Self {
        Self::bound(Key::Null)
    }
}

impl BoolState {
    pub fn bound(key_binding: Key) -> Self {
        Self {
            active: false,
            just_pressed: false,
            just_released: false,
            key_binding,
        }
    }

    /// Feed the current down state, deriving the edge flags from the previous
    /// frame.
    pub fn update(&mut self, down: bool) {
        self.just_pressed = down && !self.active;
        self.just_released = !down && self.active;
        self.active = down;
    }
}

/// Keyboard state relevant to gameplay, grouped by purpose: main movement
/// (WASD), secondary movement (arrow keys) and actions.
#[derive(Debug, Clone)]
pub struct InputState {
    pub maindirection_up: BoolState,
    pub maindirection_left: BoolState,
    pub maindirection_down: BoolState,
    pub maindirection_right: BoolState,
    // Arrow keys
    pub secondarydirection_up: BoolState,
    pub secondarydirection_down: BoolState,
    pub secondarydirection_left: BoolState,
    pub secondarydirection_right: BoolState,
    // Actions
    pub action_back: BoolState,
    pub action_1: BoolState,
    pub action_2: BoolState,
    pub mode_debug: BoolState,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            maindirection_up: BoolState::bound(Key::W),
            maindirection_left: BoolState::bound(Key::A),
            maindirection_down: BoolState::bound(Key::S),
            maindirection_right: BoolState::bound(Key::D),
            secondarydirection_up: BoolState::bound(Key::Up),
            secondarydirection_down: BoolState::bound(Key::Down),
            secondarydirection_left: BoolState::bound(Key::Left),
            secondarydirection_right: BoolState::bound(Key::Right),
            action_back: BoolState::bound(Key::Escape),
            action_1: BoolState::bound(Key::Space),
            action_2: BoolState::bound(Key::Enter),
            mode_debug: BoolState::bound(Key::F11),
        }
    }
}

impl InputState {
    fn states_mut(&mut self) -> [&mut BoolState; 12] {
        [
            &mut self.maindirection_up,
            &mut self.maindirection_left,
            &mut self.maindirection_down,
            &mut self.maindirection_right,
            &mut self.secondarydirection_up,
            &mut self.secondarydirection_down,
            &mut self.secondarydirection_left,
            &mut self.secondarydirection_right,
            &mut self.action_back,
            &mut self.action_1,
            &mut self.action_2,
            &mut self.mode_debug,
        ]
    }

    /// Refresh every binding from `is_down`, which answers whether a key is
    /// currently held.
    pub fn refresh(&mut self, mut is_down: impl FnMut(Key) -> bool) {
        for state in self.states_mut() {
            let down = is_down(state.key_binding);
            state.update(down);
        }
    }

    /// Horizontal axis from either direction set: -1 left, 1 right.
    pub fn horizontal(&self) -> f32 {
        let left = self.maindirection_left.active || self.secondarydirection_left.active;
        let right = self.maindirection_right.active || self.secondarydirection_right.active;
        (right as i32 - left as i32) as f32
    }

    /// Vertical axis from either direction set: -1 up, 1 down (screen space).
    pub fn vertical(&self) -> f32 {
        let up = self.maindirection_up.active || self.secondarydirection_up.active;
        let down = self.maindirection_down.active || self.secondarydirection_down.active;
        (down as i32 - up as i32) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolstate_default() {
        let bs = BoolState::default();
        assert!(!bs.active);
        assert!(!bs.just_pressed);
        assert!(!bs.just_released);
        assert_eq!(bs.key_binding, Key::Null);
    }

    #[test]
    fn test_inputstate_default_key_bindings() {
        let input = InputState::default();
        assert_eq!(input.maindirection_up.key_binding, Key::W);
        assert_eq!(input.maindirection_left.key_binding, Key::A);
        assert_eq!(input.secondarydirection_right.key_binding, Key::Right);
        assert_eq!(input.action_1.key_binding, Key::Space);
        assert_eq!(input.action_back.key_binding, Key::Escape);
    }

    #[test]
    fn test_boolstate_edges() {
        let mut bs = BoolState::bound(Key::Space);
        bs.update(true);
        assert!(bs.active && bs.just_pressed && !bs.just_released);
        bs.update(true);
        assert!(bs.active && !bs.just_pressed);
        bs.update(false);
        assert!(!bs.active && bs.just_released);
        bs.update(false);
        assert!(!bs.just_released);
    }

    #[test]
    fn test_refresh_and_axes() {
        let mut input = InputState::default();
        input.refresh(|key| matches!(key, Key::A | Key::Down));
        assert!(input.maindirection_left.just_pressed);
        assert_eq!(input.horizontal(), -1.0);
        assert_eq!(input.vertical(), 1.0);

        input.refresh(|key| matches!(key, Key::A | Key::Right));
        assert_eq!(input.horizontal(), 0.0);
        assert_eq!(input.vertical(), 0.0);
        assert!(input.secondarydirection_down.just_released);
    }
}
