//! Key-to-code resolution.

use crate::key::KeySymbol;
use std::collections::HashMap;

/// Maps key symbols to the numeric codes the runtime matches on.
///
/// The engine core is agnostic of actual keyboard layouts; hosts inject an
/// implementation at parse time. The parser asks for a keycode first and
/// falls back to a scancode, and the answering side decides which matcher
/// variant a token compiles to.
pub trait KeycodeResolver {
    /// Logical keycode for a symbol, if the host keymap has one.
    fn keycode(&self, symbol: &KeySymbol) -> Option<u32>;

    /// Physical scancode fallback.
    fn scancode(&self, symbol: &KeySymbol) -> Option<u32>;
}

impl<T: KeycodeResolver + ?Sized> KeycodeResolver for &T {
    fn keycode(&self, symbol: &KeySymbol) -> Option<u32> {
        (**self).keycode(symbol)
    }

    fn scancode(&self, symbol: &KeySymbol) -> Option<u32> {
        (**self).scancode(symbol)
    }
}

/// Table-backed resolver.
#[derive(Debug, Clone, Default)]
pub struct KeycodeTable {
    keycodes: HashMap<KeySymbol, u32>,
    scancodes: HashMap<KeySymbol, u32>,
}

impl KeycodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a keycode, builder style.
    pub fn with_keycode(mut self, symbol: KeySymbol, code: u32) -> Self {
        self.keycodes.insert(symbol, code);
        self
    }

    /// Register a scancode, builder style.
    pub fn with_scancode(mut self, symbol: KeySymbol, code: u32) -> Self {
        self.scancodes.insert(symbol, code);
        self
    }

    pub fn insert_keycode(&mut self, symbol: KeySymbol, code: u32) {
        self.keycodes.insert(symbol, code);
    }

    pub fn insert_scancode(&mut self, symbol: KeySymbol, code: u32) {
        self.scancodes.insert(symbol, code);
    }

    /// A table assigning every documented symbol a distinct logical keycode.
    ///
    /// Characters use their lowercase codepoint, so the codes stay stable
    /// across releases. No scancodes; hosts with physical-key needs supply
    /// their own table.
    pub fn logical() -> Self {
        let mut table = Self::new();
        for c in ('a'..='z').chain('0'..='9') {
            table.insert_keycode(KeySymbol::Character(c), c as u32);
        }
        for n in 1..=24 {
            table.insert_keycode(KeySymbol::Function(n), 0x1000 + u32::from(n));
        }
        for d in 0..=9 {
            table.insert_keycode(KeySymbol::NumpadDigit(d), 0x2000 + u32::from(d));
        }
        for (i, symbol) in KeySymbol::NAMED.iter().enumerate() {
            table.insert_keycode(*symbol, 0x3000 + i as u32);
        }
        table
    }
}

impl KeycodeResolver for KeycodeTable {
    fn keycode(&self, symbol: &KeySymbol) -> Option<u32> {
        self.keycodes.get(symbol).copied()
    }

    fn scancode(&self, symbol: &KeySymbol) -> Option<u32> {
        self.scancodes.get(symbol).copied()
    }
}
