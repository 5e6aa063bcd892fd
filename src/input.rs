/// Held-key state and the fixed per-player control schemes.
///
/// The driver feeds discrete press/release events in; the movement and
/// firing steps read the set as an explicit parameter.

use std::collections::HashSet;

use crate::entities::{Direction, PlayerId};

/// Every physical key the game listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    Q,
    E,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Slash,
    Period,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlScheme {
    pub up: Key,
    pub down: Key,
    pub left: Key,
    pub right: Key,
    pub fire: Key,
    pub swap: Key,
}

pub const PLAYER_ONE_CONTROLS: ControlScheme = ControlScheme {
    up: Key::W,
    down: Key::S,
    left: Key::A,
    right: Key::D,
    fire: Key::Space,
    swap: Key::Q,
};

pub const PLAYER_TWO_CONTROLS: ControlScheme = ControlScheme {
    up: Key::ArrowUp,
    down: Key::ArrowDown,
    left: Key::ArrowLeft,
    right: Key::ArrowRight,
    fire: Key::Slash,
    swap: Key::Period,
};

/// Shared by both players in two-player mode.
pub const CONSUMABLE_KEY: Key = Key::E;
pub const PAUSE_KEY: Key = Key::Escape;

impl ControlScheme {
    pub fn for_player(id: PlayerId) -> &'static ControlScheme {
        match id {
            PlayerId::One => &PLAYER_ONE_CONTROLS,
            PlayerId::Two => &PLAYER_TWO_CONTROLS,
        }
    }

    pub fn key_for(&self, dir: Direction) -> Key {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// The direction a movement key stands for, if it is one of ours.
    pub fn direction_of(&self, key: Key) -> Option<Direction> {
        match key {
            k if k == self.up => Some(Direction::Up),
            k if k == self.down => Some(Direction::Down),
            k if k == self.left => Some(Direction::Left),
            k if k == self.right => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Keys currently held down.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Forget everything. Called on pause and when the level advances.
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}
