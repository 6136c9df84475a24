//! Keyboard sampling
//!
//! Key events arrive whenever the host delivers them; the simulation reads a
//! snapshot once per tick. Each key is an independent atomic flag, so a writer
//! never blocks a reader and a torn read across keys costs at most one frame.

use std::sync::atomic::{AtomicBool, Ordering};

/// Physical keys bound to driving controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
}

impl KeyCode {
    pub const ALL: [KeyCode; 9] = [
        KeyCode::W,
        KeyCode::A,
        KeyCode::S,
        KeyCode::D,
        KeyCode::ArrowUp,
        KeyCode::ArrowDown,
        KeyCode::ArrowLeft,
        KeyCode::ArrowRight,
        KeyCode::Space,
    ];

    /// Map a host key name (e.g. `KeyboardEvent.key`) to a bound key
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "w" => Some(KeyCode::W),
            "a" => Some(KeyCode::A),
            "s" => Some(KeyCode::S),
            "d" => Some(KeyCode::D),
            "arrowup" => Some(KeyCode::ArrowUp),
            "arrowdown" => Some(KeyCode::ArrowDown),
            "arrowleft" => Some(KeyCode::ArrowLeft),
            "arrowright" => Some(KeyCode::ArrowRight),
            " " | "space" | "spacebar" => Some(KeyCode::Space),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Logical controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub forward: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
    pub handbrake: bool,
}

impl InputSnapshot {
    /// Net steering direction: -1 left, +1 right, 0 for neither or both
    pub fn steer_sign(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Held-key table shared between the key-event source and the tick loop
#[derive(Debug, Default)]
pub struct InputSampler {
    held: [AtomicBool; KeyCode::ALL.len()],
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current hold state for one key
    pub fn set_key(&self, key: KeyCode, pressed: bool) {
        self.held[key.slot()].store(pressed, Ordering::Relaxed);
    }

    /// Record a key by host name; unbound names are ignored
    pub fn set_key_name(&self, name: &str, pressed: bool) {
        if let Some(key) = KeyCode::from_key_name(name) {
            self.set_key(key, pressed);
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held[key.slot()].load(Ordering::Relaxed)
    }

    /// Held state by host name; unbound names are never held
    pub fn is_held_name(&self, name: &str) -> bool {
        KeyCode::from_key_name(name).is_some_and(|key| self.is_held(key))
    }

    /// Forget every held key (focus loss, run start)
    pub fn release_all(&self) {
        for flag in &self.held {
            flag.store(false, Ordering::Relaxed);
        }
    }

    /// Fold physical keys into logical controls
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            forward: self.is_held(KeyCode::W) || self.is_held(KeyCode::ArrowUp),
            reverse: self.is_held(KeyCode::S) || self.is_held(KeyCode::ArrowDown),
            left: self.is_held(KeyCode::A) || self.is_held(KeyCode::ArrowLeft),
            right: self.is_held(KeyCode::D) || self.is_held(KeyCode::ArrowRight),
            handbrake: self.is_held(KeyCode::Space),
        }
    }
}
