/// Keyboard state.
///
/// Key events only flip entries in a pressed-state map; the simulation samples
/// the map once per frame through [`InputState::snapshot`], so movement speed
/// does not depend on how often the host delivers key events.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A logical game action a key can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Shield,
    Dash,
    Pause,
}

/// Key identifiers bound to each action.  Identifiers are compared
/// case-insensitively; `" "` is the space bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub fire: Vec<String>,
    pub shield: Vec<String>,
    pub dash: Vec<String>,
    pub pause: Vec<String>,
}

fn keys(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: keys(&["w", "arrowup"]),
            down: keys(&["s", "arrowdown"]),
            left: keys(&["a", "arrowleft"]),
            right: keys(&["d", "arrowright"]),
            fire: keys(&[" "]),
            shield: keys(&["q"]),
            dash: keys(&["e"]),
            pause: keys(&["p"]),
        }
    }
}

impl KeyBindings {
    /// Resolve a key identifier to its action, if it is bound.
    pub fn resolve(&self, key: &str) -> Option<Action> {
        let key = key.to_lowercase();
        let table: [(&[String], Action); 8] = [
            (&self.up, Action::Up),
            (&self.down, Action::Down),
            (&self.left, Action::Left),
            (&self.right, Action::Right),
            (&self.fire, Action::Fire),
            (&self.shield, Action::Shield),
            (&self.dash, Action::Dash),
            (&self.pause, Action::Pause),
        ];
        table
            .iter()
            .find(|(ids, _)| ids.iter().any(|id| id.to_lowercase() == key))
            .map(|(_, action)| *action)
    }
}

/// The held actions for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub shield: bool,
    pub dash: bool,
}

#[derive(Debug, Default, Clone)]
pub struct InputState {
    pressed: HashMap<Action, bool>,
}

impl InputState {
    pub fn press(&mut self, action: Action) {
        self.pressed.insert(action, true);
    }

    pub fn release(&mut self, action: Action) {
        self.pressed.insert(action, false);
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.get(&action).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn snapshot(&self) -> Controls {
        Controls {
            up: self.is_pressed(Action::Up),
            down: self.is_pressed(Action::Down),
            left: self.is_pressed(Action::Left),
            right: self.is_pressed(Action::Right),
            fire: self.is_pressed(Action::Fire),
            shield: self.is_pressed(Action::Shield),
            dash: self.is_pressed(Action::Dash),
        }
    }
}
