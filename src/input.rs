//! Platform-neutral input
//!
//! The frontend records raw key/mouse events into an [`InputState`]; every
//! simulation tick receives an immutable [`InputFrame`] snapshot.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical keys used by the games
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Y,
    G,
    H,
    J,
    Space,
    Enter,
    Escape,
    P,
    Q,
    R,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    RightCtrl,
    F1,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code` to a logical key
    pub fn from_code(code: &str) -> Option<Self> {
        let key = match code {
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "KeyW" => Key::W,
            "KeyA" => Key::A,
            "KeyS" => Key::S,
            "KeyD" => Key::D,
            "KeyY" => Key::Y,
            "KeyG" => Key::G,
            "KeyH" => Key::H,
            "KeyJ" => Key::J,
            "Space" => Key::Space,
            "Enter" | "NumpadEnter" => Key::Enter,
            "Escape" => Key::Escape,
            "KeyP" => Key::P,
            "KeyQ" => Key::Q,
            "KeyR" => Key::R,
            "Digit0" | "Numpad0" => Key::Digit0,
            "Digit1" | "Numpad1" => Key::Digit1,
            "Digit2" | "Numpad2" => Key::Digit2,
            "Digit3" | "Numpad3" => Key::Digit3,
            "Digit4" | "Numpad4" => Key::Digit4,
            "ControlRight" => Key::RightCtrl,
            "F1" => Key::F1,
            _ => return None,
        };
        Some(key)
    }
}

/// Input snapshot for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    /// Keys currently held down
    pub held: BTreeSet<Key>,
    /// Keys that went down since the previous tick
    pub pressed: BTreeSet<Key>,
    /// Mouse position in game pixels
    pub mouse: Option<Vec2>,
    /// Primary button clicked since the previous tick
    pub clicked: bool,
}

impl InputFrame {
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Any of the given keys went down this tick
    pub fn any_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.pressed.contains(k))
    }

    /// Build a frame where the given keys were just pressed (and are held)
    pub fn with_pressed(keys: &[Key]) -> Self {
        let set: BTreeSet<Key> = keys.iter().copied().collect();
        Self {
            held: set.clone(),
            pressed: set,
            ..Default::default()
        }
    }

    /// Build a frame where the given keys are held
    pub fn with_held(keys: &[Key]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
            ..Default::default()
        }
    }
}

/// Accumulates raw platform events between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    frame: InputFrame,
}

impl InputState {
    pub fn key_down(&mut self, key: Key) {
        // Browsers repeat keydown while held; only the first counts as a press
        if self.frame.held.insert(key) {
            self.frame.pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.frame.held.remove(&key);
    }

    pub fn mouse_move(&mut self, pos: Vec2) {
        self.frame.mouse = Some(pos);
    }

    pub fn mouse_down(&mut self, pos: Vec2) {
        self.frame.mouse = Some(pos);
        self.frame.clicked = true;
    }

    /// Release everything (e.g. on window blur)
    pub fn release_all(&mut self) {
        self.frame.held.clear();
        self.frame.pressed.clear();
        self.frame.clicked = false;
    }

    /// Snapshot for the next tick
    pub fn frame(&self) -> InputFrame {
        self.frame.clone()
    }

    /// Clear one-shot inputs after a tick has consumed them
    pub fn clear_one_shots(&mut self) {
        self.frame.pressed.clear();
        self.frame.clicked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_repeat_is_single_press() {
        let mut input = InputState::default();
        input.key_down(Key::Space);
        input.key_down(Key::Space);
        assert!(input.frame().was_pressed(Key::Space));
        input.clear_one_shots();
        input.key_down(Key::Space);
        let frame = input.frame();
        assert!(frame.is_held(Key::Space));
        assert!(!frame.was_pressed(Key::Space));
    }

    #[test]
    fn test_release_clears_held() {
        let mut input = InputState::default();
        input.key_down(Key::W);
        input.key_up(Key::W);
        assert!(!input.frame().is_held(Key::W));
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Key::from_code("ArrowUp"), Some(Key::Up));
        assert_eq!(Key::from_code("ControlRight"), Some(Key::RightCtrl));
        assert_eq!(Key::from_code("KeyZ"), None);
    }
}
