//! Per-frame input snapshot and the crossterm key tracker that builds it.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Neutral,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    /// Combine held axes; opposite keys cancel.
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool) -> Self {
        let dy = up as i8 - down as i8;
        let dx = right as i8 - left as i8;
        match (dx, dy) {
            (0, 1) => Direction::Up,
            (1, 1) => Direction::UpRight,
            (1, 0) => Direction::Right,
            (1, -1) => Direction::DownRight,
            (0, -1) => Direction::Down,
            (-1, -1) => Direction::DownLeft,
            (-1, 0) => Direction::Left,
            (-1, 1) => Direction::UpLeft,
            _ => Direction::Neutral,
        }
    }

    /// Unit vector in screen space (+Y down), zero when neutral.
    pub fn to_vec2(self) -> Vec2 {
        let (x, y) = match self {
            Direction::Neutral => return Vec2::ZERO,
            Direction::Up => (0.0, -1.0),
            Direction::UpRight => (1.0, -1.0),
            Direction::Right => (1.0, 0.0),
            Direction::DownRight => (1.0, 1.0),
            Direction::Down => (0.0, 1.0),
            Direction::DownLeft => (-1.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::UpLeft => (-1.0, -1.0),
        };
        Vec2::new(x, y).normalize()
    }
}

/// Everything the simulation reads from the player in one frame.
/// `direction` and `fire` are held state; the rest are one-shot presses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub direction: Direction,
    pub fire: bool,
    pub pause: bool,
    pub resume: bool,
    pub restart: bool,
    pub quit: bool,
    pub confirm: bool,
    pub cancel: bool,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }
}

/// A key counts as held if its last press/repeat arrived within this many
/// frames.  Covers terminals that never send key-release events.
pub const HOLD_WINDOW: u64 = 4;

/// Turns raw key events into [`InputFrame`]s.
///
/// Terminals with keyboard enhancement report releases and keys drop out
/// immediately; classic terminals only repeat presses, so keys expire after
/// [`HOLD_WINDOW`] frames of silence.
#[derive(Debug, Default)]
pub struct KeyTracker {
    last_seen: HashMap<KeyCode, u64>,
    pending: InputFrame,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: KeyEvent, frame: u64) {
        match event.kind {
            KeyEventKind::Press => {
                self.last_seen.insert(normalize(event.code), frame);
                self.press(event.code, event.modifiers);
            }
            KeyEventKind::Repeat => {
                self.last_seen.insert(normalize(event.code), frame);
            }
            KeyEventKind::Release => {
                self.last_seen.remove(&normalize(event.code));
            }
        }
    }

    fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let p = &mut self.pending;
        match normalize(code) {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => p.quit = true,
            KeyCode::Char('p') | KeyCode::Esc => {
                p.pause = true;
                p.cancel = true;
            }
            KeyCode::Char('r') => {
                p.resume = true;
                p.restart = true;
            }
            KeyCode::Char('q') => p.quit = true,
            KeyCode::Enter | KeyCode::Char('y') => p.confirm = true,
            KeyCode::Char('n') => p.cancel = true,
            _ => {}
        }
    }

    fn held(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|k| {
            self.last_seen
                .get(k)
                .is_some_and(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        })
    }

    /// Snapshot for `frame`; one-shot presses are consumed.
    pub fn take_frame(&mut self, frame: u64) -> InputFrame {
        let up = self.held(&[KeyCode::Up, KeyCode::Char('w')], frame);
        let down = self.held(&[KeyCode::Down, KeyCode::Char('s')], frame);
        let left = self.held(&[KeyCode::Left, KeyCode::Char('a')], frame);
        let right = self.held(&[KeyCode::Right, KeyCode::Char('d')], frame);
        InputFrame {
            direction: Direction::from_keys(up, down, left, right),
            fire: self.held(&[KeyCode::Char(' ')], frame),
            ..std::mem::take(&mut self.pending)
        }
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
