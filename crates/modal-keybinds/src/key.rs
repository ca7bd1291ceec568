//! Key symbols, modifier state, and physical key events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named key, independent of keyboard layout.
///
/// This is the vocabulary the parser speaks; the runtime never sees symbols,
/// only the numeric codes a [`KeycodeResolver`](crate::KeycodeResolver)
/// produces from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySymbol {
    /// A printable character key (a single codepoint).
    Character(char),
    /// Function keys F1..F24.
    Function(u8),
    /// Numeric keypad digit 0..9.
    NumpadDigit(u8),
    Escape,
    Tab,
    Return,
    Space,
    Backspace,
    Delete,
    Insert,
    Pause,
    CapsLock,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

impl KeySymbol {
    /// Every non-parameterized symbol, in a fixed order.
    pub const NAMED: [KeySymbol; 17] = [
        KeySymbol::Escape,
        KeySymbol::Tab,
        KeySymbol::Return,
        KeySymbol::Space,
        KeySymbol::Backspace,
        KeySymbol::Delete,
        KeySymbol::Insert,
        KeySymbol::Pause,
        KeySymbol::CapsLock,
        KeySymbol::Home,
        KeySymbol::End,
        KeySymbol::PageUp,
        KeySymbol::PageDown,
        KeySymbol::Up,
        KeySymbol::Down,
        KeySymbol::Left,
        KeySymbol::Right,
    ];
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(c) => write!(f, "{}", c.to_uppercase()),
            Self::Function(n) => write!(f, "F{}", n),
            Self::NumpadDigit(d) => write!(f, "Numpad{}", d),
            Self::Escape => write!(f, "Escape"),
            Self::Tab => write!(f, "Tab"),
            Self::Return => write!(f, "Return"),
            Self::Space => write!(f, "Space"),
            Self::Backspace => write!(f, "Backspace"),
            Self::Delete => write!(f, "Delete"),
            Self::Insert => write!(f, "Insert"),
            Self::Pause => write!(f, "Pause"),
            Self::CapsLock => write!(f, "CapsLock"),
            Self::Home => write!(f, "Home"),
            Self::End => write!(f, "End"),
            Self::PageUp => write!(f, "PageUp"),
            Self::PageDown => write!(f, "PageDown"),
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
        }
    }
}

/// Modifier key state.
///
/// Matching compares the whole record field-wise, so a binding declared as
/// `Ctrl+A` does not fire for Ctrl+Shift+A.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub control: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    /// "Super" on Linux, "Command" on macOS, "Win" on Windows.
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        control: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const CONTROL: Modifiers = Modifiers {
        control: true,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        control: false,
        shift: true,
        alt: false,
        meta: false,
    };

    pub const ALT: Modifiers = Modifiers {
        control: false,
        shift: false,
        alt: true,
        meta: false,
    };

    pub const META: Modifiers = Modifiers {
        control: false,
        shift: false,
        alt: false,
        meta: true,
    };

    /// True when no modifier is held.
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.control {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            parts.push("Meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// One physical key press as delivered by the host.
///
/// The runtime matches on `keycode` or `scancode` (whichever the matcher
/// variant names) plus the modifier record. `text` is carried through for
/// hosts that want to fall back to text insertion on an unhandled key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub scancode: u32,
    pub keycode: u32,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl KeyEvent {
    pub fn new(scancode: u32, keycode: u32, modifiers: Modifiers) -> Self {
        Self {
            scancode,
            keycode,
            modifiers,
            text: None,
        }
    }

    /// Attach the text this key would insert.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_none() {
            write!(f, "{}+", self.modifiers)?;
        }
        match &self.text {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "<{}>", self.keycode),
        }
    }
}
