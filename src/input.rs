use std::collections::HashSet;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(char);

impl KeyCode {
    pub const W: Self = Self('W');
    pub const A: Self = Self('A');
    pub const S: Self = Self('S');
    pub const D: Self = Self('D');

    /// Parses a single-letter key name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let ch = chars.next()?;
        if chars.next().is_some() || !ch.is_ascii_alphabetic() {
            return None;
        }
        Some(Self(ch.to_ascii_uppercase()))
    }
}

/// Thread-safe pressed-key set fed by window events.
///
/// Keys are inserted on press and removed on release; there is no
/// debounce window.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    /// Snapshots the four movement flags consumed by the frame update.
    ///
    /// The update function never touches `InputState` directly; it only
    /// sees this value, taken once at the start of the frame.
    pub fn movement_flags(&self) -> MovementFlags {
        let keys = self.keys.read();
        MovementFlags {
            cube_up: keys.contains(&KeyCode::W),
            cube_down: keys.contains(&KeyCode::S),
            camera_left: keys.contains(&KeyCode::A),
            camera_right: keys.contains(&KeyCode::D),
        }
    }
}

/// Per-frame movement input: W/S move the light cube along Y, A/D move
/// the camera along X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementFlags {
    pub cube_up: bool,
    pub cube_down: bool,
    pub camera_left: bool,
    pub camera_right: bool,
}

impl MovementFlags {
    /// Builds flags from a list of held key names, ignoring keys that do
    /// not map to a movement control. Used by the headless simulation.
    pub fn from_held_keys<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut flags = Self::default();
        for name in names {
            match KeyCode::from_name(name) {
                Some(KeyCode::W) => flags.cube_up = true,
                Some(KeyCode::S) => flags.cube_down = true,
                Some(KeyCode::A) => flags.camera_left = true,
                Some(KeyCode::D) => flags.camera_right = true,
                _ => {}
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_are_case_insensitive() {
        assert_eq!(KeyCode::from_name("w"), Some(KeyCode::W));
        assert_eq!(KeyCode::from_name("W"), Some(KeyCode::W));
        assert_eq!(KeyCode::from_name("ws"), None);
        assert_eq!(KeyCode::from_name("1"), None);
    }

    #[test]
    fn press_and_release_toggle_flags() {
        let input = InputState::new();
        input.set_key_down(KeyCode::W);
        input.set_key_down(KeyCode::A);
        let flags = input.movement_flags();
        assert!(flags.cube_up);
        assert!(flags.camera_left);
        assert!(!flags.cube_down);

        input.set_key_up(KeyCode::W);
        assert!(!input.movement_flags().cube_up);
        assert!(input.movement_flags().camera_left);
    }

    #[test]
    fn held_key_list_maps_to_flags() {
        let flags = MovementFlags::from_held_keys(["s", "d", "x"]);
        assert!(flags.cube_down);
        assert!(flags.camera_right);
        assert!(!flags.cube_up);
        assert!(!flags.camera_left);
    }
}
