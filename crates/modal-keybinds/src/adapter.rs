//! Crossterm event adapter.
//!
//! Terminal hosts receive `crossterm` key events; this translates them into
//! engine [`KeyEvent`]s using the same resolver the bindings were parsed
//! with, so both sides agree on the numeric codes. Hosts route
//! `KeyEventKind::Press` events to `key_down` and everything else to
//! `key_up`.

use crate::key::{KeyEvent, KeySymbol, Modifiers};
use crate::resolver::KeycodeResolver;
use crossterm::event::{KeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers};

/// Translate a crossterm key event.
///
/// Returns `None` when the key has no [`KeySymbol`] equivalent or the
/// resolver knows neither a keycode nor a scancode for it. A code half the
/// resolver declines is filled with 0; matchers parsed through the same
/// resolver never consult that half.
pub fn from_crossterm(
    event: &CrosstermKeyEvent,
    resolver: &dyn KeycodeResolver,
) -> Option<KeyEvent> {
    let symbol = symbol_for(event.code)?;
    let keycode = resolver.keycode(&symbol);
    let scancode = resolver.scancode(&symbol);
    if keycode.is_none() && scancode.is_none() {
        return None;
    }

    let mut key = KeyEvent::new(
        scancode.unwrap_or(0),
        keycode.unwrap_or(0),
        modifiers_from(event.modifiers),
    );
    if let KeyCode::Char(c) = event.code {
        key = key.with_text(c.to_string());
    }
    Some(key)
}

fn symbol_for(code: KeyCode) -> Option<KeySymbol> {
    let symbol = match code {
        KeyCode::Char(' ') => KeySymbol::Space,
        KeyCode::Char(c) => KeySymbol::Character(c.to_ascii_lowercase()),
        KeyCode::F(n) if (1..=24).contains(&n) => KeySymbol::Function(n),
        KeyCode::Esc => KeySymbol::Escape,
        KeyCode::Tab => KeySymbol::Tab,
        KeyCode::Enter => KeySymbol::Return,
        KeyCode::Backspace => KeySymbol::Backspace,
        KeyCode::Delete => KeySymbol::Delete,
        KeyCode::Insert => KeySymbol::Insert,
        KeyCode::Pause => KeySymbol::Pause,
        KeyCode::CapsLock => KeySymbol::CapsLock,
        KeyCode::Home => KeySymbol::Home,
        KeyCode::End => KeySymbol::End,
        KeyCode::PageUp => KeySymbol::PageUp,
        KeyCode::PageDown => KeySymbol::PageDown,
        KeyCode::Up => KeySymbol::Up,
        KeyCode::Down => KeySymbol::Down,
        KeyCode::Left => KeySymbol::Left,
        KeyCode::Right => KeySymbol::Right,
        _ => return None,
    };
    Some(symbol)
}

fn modifiers_from(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        control: mods.contains(KeyModifiers::CONTROL),
        shift: mods.contains(KeyModifiers::SHIFT),
        alt: mods.contains(KeyModifiers::ALT),
        meta: mods.contains(KeyModifiers::SUPER) || mods.contains(KeyModifiers::META),
    }
}
