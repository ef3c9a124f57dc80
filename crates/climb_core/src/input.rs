//! Input state tracking plus the logical action layer the simulation consumes.
//!
//! - **Raw keys:** `InputState` records which engine keys are held, with
//!   edge-triggered `just_pressed` / `just_released` sets that live until
//!   `end_frame()`. The main loop only clears them after at least one fixed
//!   step has run, so a press on a zero-step frame is not lost.
//!
//! - **Actions:** movement code never looks at keys. Each controlled body owns
//!   a `ControlBindings` table that maps the four logical actions to keys and
//!   produces an `ActionSet` snapshot per tick. Unbound actions read as "not
//!   held", which lets one keyboard drive two players with disjoint tables.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Period,
    W,
    A,
    S,
    D,
    R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    ZoomOut,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::ZoomOut,
    ];
}

/// Per-tick snapshot of the logical actions for one body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub zoom_out: bool,
}

impl ActionSet {
    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::MoveLeft => self.move_left = held,
            Action::MoveRight => self.move_right = held,
            Action::Jump => self.jump = held,
            Action::ZoomOut => self.zoom_out = held,
        }
    }
}

/// Binding table from logical actions to physical keys.
///
/// Deserializes from a JSON object such as
/// `{"move_left": "A", "move_right": "D", "jump": "W", "zoom_out": "R"}`.
/// Missing entries leave the action unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ControlBindings {
    table: BTreeMap<Action, Key>,
}

impl ControlBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: Action, key: Key) -> Self {
        self.bind(action, key);
        self
    }

    pub fn bind(&mut self, action: Action, key: Key) {
        self.table.insert(action, key);
    }

    pub fn unbind(&mut self, action: Action) {
        self.table.remove(&action);
    }

    pub fn key_for(&self, action: Action) -> Option<Key> {
        self.table.get(&action).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// WASD-style table used by player one.
    pub fn player_one() -> Self {
        Self::new()
            .with(Action::MoveLeft, Key::A)
            .with(Action::MoveRight, Key::D)
            .with(Action::Jump, Key::W)
            .with(Action::ZoomOut, Key::R)
    }

    /// Arrow-key table used by player two.
    pub fn player_two() -> Self {
        Self::new()
            .with(Action::MoveLeft, Key::Left)
            .with(Action::MoveRight, Key::Right)
            .with(Action::Jump, Key::Up)
            .with(Action::ZoomOut, Key::Period)
    }

    /// Level-triggered action snapshot for this tick.
    pub fn actions(&self, input: &InputState) -> ActionSet {
        let mut set = ActionSet::default();
        for &action in Action::ALL {
            let held = self.key_for(action).is_some_and(|key| input.is_held(key));
            set.set(action, held);
        }
        set
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Bring the held set in line with `keys`, emitting the matching
    /// press/release edges. Used when replaying recorded key sets.
    pub fn sync_held(&mut self, keys: &HashSet<Key>) {
        let released: Vec<Key> = self.held.difference(keys).copied().collect();
        for key in released {
            self.key_up(key);
        }
        for &key in keys {
            self.key_down(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        assert!(input.is_held(Key::A));
        assert!(input.is_just_pressed(Key::A));
    }

    #[test]
    fn test_key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_up(Key::A);
        assert!(!input.is_held(Key::A));
        assert!(input.is_just_released(Key::A));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::W);
        assert!(!input.is_just_released(Key::W));
        assert!(!input.is_held(Key::W));
    }

    #[test]
    fn test_end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::A));
        assert!(!input.is_just_pressed(Key::Space));
        // Held state survives the frame boundary.
        assert!(input.is_held(Key::A));
        assert!(input.is_held(Key::Space));
    }

    #[test]
    fn test_sync_held_emits_edges() {
        let mut input = InputState::new();
        input.sync_held(&HashSet::from([Key::A, Key::W]));
        input.end_frame();

        input.sync_held(&HashSet::from([Key::W, Key::D]));
        assert!(input.is_just_released(Key::A));
        assert!(input.is_just_pressed(Key::D));
        assert!(!input.is_just_pressed(Key::W));
        assert!(input.is_held(Key::W));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn test_bindings_map_held_keys_to_actions() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_down(Key::W);

        let p1 = ControlBindings::player_one().actions(&input);
        assert!(p1.move_left);
        assert!(p1.jump);
        assert!(!p1.move_right);
        assert!(!p1.zoom_out);

        // Player two's table shares no keys with player one's.
        let p2 = ControlBindings::player_two().actions(&input);
        assert_eq!(p2, ActionSet::default());
    }

    #[test]
    fn test_unbound_action_reads_not_held() {
        let mut bindings = ControlBindings::player_one();
        bindings.unbind(Action::Jump);

        let mut input = InputState::new();
        input.key_down(Key::W);
        assert!(!bindings.actions(&input).jump);
        assert_eq!(bindings.key_for(Action::Jump), None);
    }

    #[test]
    fn test_bindings_deserialize_from_json() {
        let bindings: ControlBindings =
            serde_json::from_str(r#"{"move_left":"Left","jump":"Space"}"#)
                .expect("bindings should parse");
        assert_eq!(bindings.key_for(Action::MoveLeft), Some(Key::Left));
        assert_eq!(bindings.key_for(Action::Jump), Some(Key::Space));
        assert_eq!(bindings.key_for(Action::MoveRight), None);
    }

    #[test]
    fn test_action_set_sets_only_the_named_action() {
        let mut set = ActionSet::default();
        set.set(Action::Jump, true);
        assert_eq!(
            set,
            ActionSet {
                jump: true,
                ..ActionSet::default()
            }
        );
        set.set(Action::ZoomOut, true);
        set.set(Action::Jump, false);
        assert_eq!(
            set,
            ActionSet {
                zoom_out: true,
                ..ActionSet::default()
            }
        );
    }
}
