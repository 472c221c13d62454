//! Logical keys and the held-key snapshot

use std::collections::BTreeSet;

/// Keys the arcade understands. Anything else never reaches a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Space,
    Enter,
    /// Pointer click or tap on the canvas
    Click,
    KeyR,
    ArrowLeft,
    ArrowRight,
    KeyA,
    KeyD,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Click" => Some(Key::Click),
            "KeyR" => Some(Key::KeyR),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "KeyA" => Some(Key::KeyA),
            "KeyD" => Some(Key::KeyD),
            _ => None,
        }
    }

    /// Primary action: jump, fire, start
    pub fn is_action(&self) -> bool {
        matches!(self, Key::Space | Key::Click)
    }
}

/// Set of keys currently held down
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: BTreeSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn left(&self) -> bool {
        self.contains(Key::ArrowLeft) || self.contains(Key::KeyA)
    }

    pub fn right(&self) -> bool {
        self.contains(Key::ArrowRight) || self.contains(Key::KeyD)
    }

    pub fn fire(&self) -> bool {
        self.contains(Key::Space)
    }
}

impl FromIterator<Key> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
