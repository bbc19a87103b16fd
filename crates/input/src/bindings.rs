use std::collections::{BTreeMap, BTreeSet};

use cubeview_camera::FirstPersonCamera;
use cubeview_common::{ControlSettings, Key, MoveDirection};

use crate::Action;

/// Keys currently held down, updated from press/release events and queried per frame.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: BTreeSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Returns `false` for auto-repeat of an already held key.
    pub fn press(&mut self, key: Key) -> bool {
        self.keys.insert(key)
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Drop every held key, e.g. when the window loses focus and releases go unseen.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Key → action map.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: BTreeMap<Key, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&ControlSettings::default())
    }
}

impl KeyBindings {
    /// Build bindings from config. If two actions share a key the later one wins.
    pub fn from_settings(controls: &ControlSettings) -> Self {
        let mut bindings = Self {
            map: BTreeMap::new(),
        };
        bindings.bind(controls.forward, Action::Move(MoveDirection::Forward));
        bindings.bind(controls.backward, Action::Move(MoveDirection::Backward));
        bindings.bind(controls.left, Action::Move(MoveDirection::Left));
        bindings.bind(controls.right, Action::Move(MoveDirection::Right));
        bindings.bind(controls.quit, Action::Quit);
        bindings.bind(controls.toggle_hud, Action::ToggleHud);
        bindings
    }

    pub fn bind(&mut self, key: Key, action: Action) {
        if let Some(previous) = self.map.insert(key, action) {
            tracing::warn!(?key, ?previous, ?action, "key rebound");
        }
    }

    pub fn action(&self, key: Key) -> Option<Action> {
        self.map.get(&key).copied()
    }

    /// Movement directions whose keys are currently held, without duplicates.
    pub fn held_directions(&self, held: &HeldKeys) -> BTreeSet<MoveDirection> {
        self.map
            .iter()
            .filter(|(key, _)| held.is_held(**key))
            .filter_map(|(_, action)| match action {
                Action::Move(dir) => Some(*dir),
                _ => None,
            })
            .collect()
    }
}

/// Translate the camera once for every held movement direction.
///
/// Opposing directions are both applied and cancel out.
pub fn apply_movement(
    held: &HeldKeys,
    bindings: &KeyBindings,
    camera: &mut FirstPersonCamera,
    dt: f32,
) {
    for dir in bindings.held_directions(held) {
        camera.translate(dir, dt);
    }
}
