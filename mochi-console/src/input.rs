//! Keyboard state tracking
//!
//! Keys are named after their logical key, lowercased: `a`, `escape`,
//! `arrowup`, `space`. A key stays held from its press to its release, so the
//! snapshot handed to the frame callback is level-triggered.

use std::collections::HashMap;

use winit::event::ElementState;
use winit::keyboard::{Key, PhysicalKey};

use console_core::KeyState;

/// Lowercased name of a logical key, if it has one
pub fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_lowercase()),
        Key::Named(named) => Some(format!("{:?}", named).to_lowercase()),
        _ => None,
    }
}

/// Held keys indexed by physical key
///
/// The name is remembered at press time so the release matches even if
/// modifiers changed the logical key in between.
#[derive(Debug, Default)]
pub struct HeldKeys {
    held: HashMap<PhysicalKey, String>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, physical: PhysicalKey, logical: &Key, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if let Some(name) = key_name(logical) {
                    self.held.insert(physical, name);
                }
            }
            ElementState::Released => {
                self.held.remove(&physical);
            }
        }
    }

    /// Forget every key, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn snapshot(&self) -> KeyState {
        KeyState::from_names(self.held.values())
    }
}
