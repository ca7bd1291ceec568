//! Matcher and sequence types.

use crate::key::{KeyEvent, Modifiers};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One key pattern to match against an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMatcher {
    /// Matches the event's logical keycode.
    Keycode { code: u32, modifiers: Modifiers },
    /// Matches the event's physical scancode.
    Scancode { code: u32, modifiers: Modifiers },
}

impl KeyMatcher {
    pub fn keycode(code: u32, modifiers: Modifiers) -> Self {
        Self::Keycode { code, modifiers }
    }

    pub fn scancode(code: u32, modifiers: Modifiers) -> Self {
        Self::Scancode { code, modifiers }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Keycode { modifiers, .. } | Self::Scancode { modifiers, .. } => *modifiers,
        }
    }

    /// Strict equality on the relevant code plus the whole modifier record.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match self {
            Self::Keycode { code, modifiers } => {
                event.keycode == *code && event.modifiers == *modifiers
            }
            Self::Scancode { code, modifiers } => {
                event.scancode == *code && event.modifiers == *modifiers
            }
        }
    }
}

impl fmt::Display for KeyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers().is_none() {
            write!(f, "{}+", self.modifiers())?;
        }
        match self {
            Self::Keycode { code, .. } => write!(f, "Key({})", code),
            Self::Scancode { code, .. } => write!(f, "Scan({})", code),
        }
    }
}

/// A matcher tagged with the direction that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPress {
    Down(KeyMatcher),
    Up(KeyMatcher),
}

impl KeyPress {
    pub fn matcher(&self) -> &KeyMatcher {
        match self {
            Self::Down(m) | Self::Up(m) => m,
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Self::Down(_))
    }

    /// Whether this press consumes a buffered keydown event.
    ///
    /// The runtime buffers keydowns only, so an `Up` press never consumes
    /// one; a sequence containing it stalls there.
    pub(crate) fn matches_keydown(&self, event: &KeyEvent) -> bool {
        match self {
            Self::Down(m) => m.matches(event),
            Self::Up(_) => false,
        }
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down(m) => write!(f, "{}", m),
            Self::Up(m) => write!(f, "!{}", m),
        }
    }
}

/// How far a sequence gets when consuming a buffer of keydown events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Every press matched and none remain.
    Ready,
    /// Every buffered key matched and presses remain.
    Potential,
    /// Some buffered key failed to match.
    Dropped,
}

/// An ordered list of direction-tagged matchers.
///
/// Sequences are non-empty by the time they reach the engine; the parser and
/// the registration layer both reject empty ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeySequence {
    pub presses: Vec<KeyPress>,
}

impl KeySequence {
    pub fn new() -> Self {
        Self {
            presses: Vec::new(),
        }
    }

    pub fn single(press: KeyPress) -> Self {
        Self {
            presses: vec![press],
        }
    }

    pub fn from_presses(presses: Vec<KeyPress>) -> Self {
        Self { presses }
    }

    pub fn push(&mut self, press: KeyPress) {
        self.presses.push(press);
    }

    pub fn is_empty(&self) -> bool {
        self.presses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.presses.len()
    }

    /// Consume `keys` in arrival order against this sequence's prefix.
    pub fn progress(&self, keys: &[KeyEvent]) -> Progress {
        if keys.len() > self.presses.len() {
            return Progress::Dropped;
        }
        for (press, key) in self.presses.iter().zip(keys) {
            if !press.matches_keydown(key) {
                return Progress::Dropped;
            }
        }
        if keys.len() == self.presses.len() {
            Progress::Ready
        } else {
            Progress::Potential
        }
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.presses.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}

impl From<KeyPress> for KeySequence {
    fn from(press: KeyPress) -> Self {
        Self::single(press)
    }
}

impl From<Vec<KeyPress>> for KeySequence {
    fn from(presses: Vec<KeyPress>) -> Self {
        Self { presses }
    }
}
