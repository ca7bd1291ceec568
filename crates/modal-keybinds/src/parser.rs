//! Binding-string parser.
//!
//! Recognizes two overlapping surface syntaxes and compiles both to the same
//! normalized [`KeySequence`]:
//!
//! - vim-style: `ab`, `<c-a>`, `<c-s-tab>`, `!a` (keyup)
//! - vscode-style: `Ctrl+A`, `Ctrl+Shift+Tab`
//!
//! Atoms are whitespace-separated; consecutive bare characters with no
//! separator are distinct atoms, so `ab` is a two-press sequence. Key tokens
//! are resolved to numeric codes through the injected resolver at parse
//! time, once per registration.

use crate::key::{KeySymbol, Modifiers};
use crate::matcher::{KeyMatcher, KeyPress, KeySequence};
use crate::resolver::KeycodeResolver;
use thiserror::Error;

/// Error parsing a binding string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unbalanced '<' or '>' bracket")]
    UnbalancedBracket,
    #[error("unknown modifier: {0}")]
    UnknownModifier(String),
    #[error("unknown key: {0}")]
    UnknownKey(String),
    #[error("empty key sequence")]
    EmptySequence,
    #[error("'!' with no key following it")]
    DanglingKeyup,
}

/// Parse a binding string into a matcher sequence.
///
/// Each key token is resolved through `resolver`: keycode first, scancode as
/// fallback; the answering side picks the matcher variant. Tokens neither
/// side knows fail with [`ParseError::UnknownKey`].
pub fn parse_sequence(
    input: &str,
    resolver: &dyn KeycodeResolver,
) -> Result<KeySequence, ParseError> {
    // Bracket balance is checked up front so a stray '>' reports as such
    // rather than as whatever half-read atom precedes it.
    let mut in_bracket = false;
    for c in input.chars() {
        match c {
            '<' if !in_bracket => in_bracket = true,
            '>' if in_bracket => in_bracket = false,
            '>' => return Err(ParseError::UnbalancedBracket),
            _ => {}
        }
    }
    if in_bracket {
        return Err(ParseError::UnbalancedBracket);
    }

    let mut presses = Vec::new();
    let mut chars = input.chars().peekable();
    let mut keyup = false;

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '!' {
            chars.next();
            keyup = true;
            continue;
        }

        let matchers = if c == '<' {
            chars.next();
            let mut inner = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '>' {
                    closed = true;
                    break;
                }
                inner.push(c);
            }
            if !closed {
                return Err(ParseError::UnbalancedBracket);
            }
            vec![parse_angle(&inner, resolver)?]
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '<' || c == '>' || c == '!' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            parse_word(&word, resolver)?
        };

        // '!' flips only the first atom it precedes.
        for (i, matcher) in matchers.into_iter().enumerate() {
            if keyup && i == 0 {
                presses.push(KeyPress::Up(matcher));
            } else {
                presses.push(KeyPress::Down(matcher));
            }
        }
        keyup = false;
    }

    if keyup {
        return Err(ParseError::DanglingKeyup);
    }
    if presses.is_empty() {
        return Err(ParseError::EmptySequence);
    }
    Ok(KeySequence::from_presses(presses))
}

/// A word outside brackets: plus form, a named token, a single character,
/// or a run of bare character atoms.
fn parse_word(word: &str, resolver: &dyn KeycodeResolver) -> Result<Vec<KeyMatcher>, ParseError> {
    if word.contains('+') && word.chars().count() > 1 {
        return Ok(vec![parse_plus(word, resolver)?]);
    }
    if let Some(symbol) = symbol_for_token(word) {
        return Ok(vec![resolve_symbol(symbol, Modifiers::NONE, resolver, word)?]);
    }
    word.chars()
        .map(|c| {
            let symbol = KeySymbol::Character(c.to_ascii_lowercase());
            resolve_symbol(symbol, Modifiers::NONE, resolver, &c.to_string())
        })
        .collect()
}

/// Inside of a `<...>` atom: single-letter modifier prefixes, then a key.
fn parse_angle(inner: &str, resolver: &dyn KeycodeResolver) -> Result<KeyMatcher, ParseError> {
    let segments: Vec<&str> = inner.split('-').collect();
    let mut modifiers = Modifiers::NONE;
    for segment in &segments[..segments.len() - 1] {
        match segment.to_ascii_lowercase().as_str() {
            "c" => modifiers.control = true,
            "s" => modifiers.shift = true,
            "a" => modifiers.alt = true,
            "m" | "d" => modifiers.meta = true,
            _ => return Err(ParseError::UnknownModifier((*segment).to_string())),
        }
    }

    let token = segments[segments.len() - 1];
    let symbol =
        symbol_for_token(token).ok_or_else(|| ParseError::UnknownKey(token.to_string()))?;
    resolve_symbol(symbol, modifiers, resolver, token)
}

/// A `Mod+Mod+key` atom.
fn parse_plus(word: &str, resolver: &dyn KeycodeResolver) -> Result<KeyMatcher, ParseError> {
    let parts: Vec<&str> = word.split('+').collect();
    let mut modifiers = Modifiers::NONE;
    for part in &parts[..parts.len() - 1] {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.control = true,
            "shift" => modifiers.shift = true,
            "alt" | "option" => modifiers.alt = true,
            "meta" | "cmd" | "command" | "super" | "win" => modifiers.meta = true,
            _ => return Err(ParseError::UnknownModifier((*part).to_string())),
        }
    }

    let token = parts[parts.len() - 1];
    let symbol =
        symbol_for_token(token).ok_or_else(|| ParseError::UnknownKey(token.to_string()))?;
    resolve_symbol(symbol, modifiers, resolver, token)
}

fn symbol_for_token(token: &str) -> Option<KeySymbol> {
    let lower = token.to_ascii_lowercase();
    let symbol = match lower.as_str() {
        "esc" | "escape" => KeySymbol::Escape,
        "tab" => KeySymbol::Tab,
        "return" | "enter" | "cr" => KeySymbol::Return,
        "space" => KeySymbol::Space,
        "bs" | "backspace" => KeySymbol::Backspace,
        "del" | "delete" => KeySymbol::Delete,
        "ins" | "insert" => KeySymbol::Insert,
        "pause" => KeySymbol::Pause,
        "caps" | "capslock" => KeySymbol::CapsLock,
        "home" => KeySymbol::Home,
        "end" => KeySymbol::End,
        "pageup" | "pgup" => KeySymbol::PageUp,
        "pagedown" | "pgdn" | "pgdown" => KeySymbol::PageDown,
        "up" => KeySymbol::Up,
        "down" => KeySymbol::Down,
        "left" => KeySymbol::Left,
        "right" => KeySymbol::Right,
        _ => {
            if let Some(n) = lower.strip_prefix('f').and_then(|d| d.parse::<u8>().ok()) {
                return ((1..=24).contains(&n)).then_some(KeySymbol::Function(n));
            }
            if let Some(d) = lower.strip_prefix("numpad").and_then(|d| d.parse::<u8>().ok()) {
                return (d <= 9).then_some(KeySymbol::NumpadDigit(d));
            }
            let mut cs = lower.chars();
            match (cs.next(), cs.next()) {
                (Some(c), None) => KeySymbol::Character(c),
                _ => return None,
            }
        }
    };
    Some(symbol)
}

fn resolve_symbol(
    symbol: KeySymbol,
    modifiers: Modifiers,
    resolver: &dyn KeycodeResolver,
    token: &str,
) -> Result<KeyMatcher, ParseError> {
    if let Some(code) = resolver.keycode(&symbol) {
        Ok(KeyMatcher::Keycode { code, modifiers })
    } else if let Some(code) = resolver.scancode(&symbol) {
        Ok(KeyMatcher::Scancode { code, modifiers })
    } else {
        Err(ParseError::UnknownKey(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::KeycodeTable;
    use proptest::prelude::*;

    fn table() -> KeycodeTable {
        KeycodeTable::logical()
    }

    fn down(code: u32, modifiers: Modifiers) -> KeyPress {
        KeyPress::Down(KeyMatcher::Keycode { code, modifiers })
    }

    #[test]
    fn test_bare_key_case_insensitive() {
        let table = table();
        for c in ('a'..='z').chain('0'..='9') {
            let lower = parse_sequence(&c.to_string(), &table).unwrap();
            let upper = parse_sequence(&c.to_ascii_uppercase().to_string(), &table).unwrap();
            assert_eq!(lower, upper, "case mismatch for '{c}'");
            assert_eq!(lower.len(), 1);
        }
    }

    #[test]
    fn test_ctrl_notations_equivalent() {
        let table = table();
        let angle = parse_sequence("<c-a>", &table).unwrap();

        assert_eq!(angle, parse_sequence("<C-A>", &table).unwrap());
        assert_eq!(angle, parse_sequence("Ctrl+a", &table).unwrap());
        assert_eq!(angle, parse_sequence("ctrl+a", &table).unwrap());
        assert_eq!(
            angle.presses[0],
            down('a' as u32, Modifiers::CONTROL)
        );
    }

    #[test]
    fn test_two_key_spellings_equivalent() {
        let table = table();
        let expected = parse_sequence("ab", &table).unwrap();

        assert_eq!(expected.len(), 2);
        assert_eq!(expected, parse_sequence("a b", &table).unwrap());
        assert_eq!(expected, parse_sequence("<a>b", &table).unwrap());
        assert_eq!(expected, parse_sequence("<a><b>", &table).unwrap());
    }

    #[test]
    fn test_keyup_prefix() {
        let table = table();

        let seq = parse_sequence("!a", &table).unwrap();
        assert_eq!(
            seq.presses,
            vec![KeyPress::Up(KeyMatcher::keycode('a' as u32, Modifiers::NONE))]
        );

        let seq = parse_sequence("a!a", &table).unwrap();
        assert_eq!(
            seq.presses,
            vec![
                down('a' as u32, Modifiers::NONE),
                KeyPress::Up(KeyMatcher::keycode('a' as u32, Modifiers::NONE)),
            ]
        );

        let seq = parse_sequence("a !<C-A>", &table).unwrap();
        assert_eq!(
            seq.presses,
            vec![
                down('a' as u32, Modifiers::NONE),
                KeyPress::Up(KeyMatcher::keycode('a' as u32, Modifiers::CONTROL)),
            ]
        );
    }

    #[test]
    fn test_keyup_applies_to_first_atom_only() {
        let table = table();
        let seq = parse_sequence("!ab", &table).unwrap();
        assert!(!seq.presses[0].is_down());
        assert!(seq.presses[1].is_down());
    }

    #[test]
    fn test_unresolved_key_is_error() {
        // A resolver that only knows 'a' and 'b'.
        let table = KeycodeTable::new()
            .with_keycode(KeySymbol::Character('a'), 1)
            .with_keycode(KeySymbol::Character('b'), 2);

        assert!(parse_sequence("ab", &table).is_ok());
        assert_eq!(
            parse_sequence("c", &table),
            Err(ParseError::UnknownKey("c".to_string()))
        );
    }

    #[test]
    fn test_scancode_fallback_picks_scancode_variant() {
        let table = KeycodeTable::new().with_scancode(KeySymbol::Character('a'), 4);
        let seq = parse_sequence("a", &table).unwrap();
        assert_eq!(
            seq.presses[0],
            KeyPress::Down(KeyMatcher::scancode(4, Modifiers::NONE))
        );
    }

    #[test]
    fn test_keycode_wins_over_scancode() {
        let table = KeycodeTable::new()
            .with_keycode(KeySymbol::Character('a'), 30)
            .with_scancode(KeySymbol::Character('a'), 4);
        let seq = parse_sequence("a", &table).unwrap();
        assert_eq!(
            seq.presses[0],
            KeyPress::Down(KeyMatcher::keycode(30, Modifiers::NONE))
        );
    }

    #[test]
    fn test_unbalanced_bracket() {
        let table = table();
        assert_eq!(
            parse_sequence("<c-a", &table),
            Err(ParseError::UnbalancedBracket)
        );
        assert_eq!(
            parse_sequence("c-a>", &table),
            Err(ParseError::UnbalancedBracket)
        );
    }

    #[test]
    fn test_unknown_modifier() {
        let table = table();
        assert_eq!(
            parse_sequence("<x-a>", &table),
            Err(ParseError::UnknownModifier("x".to_string()))
        );
        assert_eq!(
            parse_sequence("hyper+a", &table),
            Err(ParseError::UnknownModifier("hyper".to_string()))
        );
    }

    #[test]
    fn test_dangling_keyup() {
        let table = table();
        assert_eq!(parse_sequence("!", &table), Err(ParseError::DanglingKeyup));
        assert_eq!(parse_sequence("a!", &table), Err(ParseError::DanglingKeyup));
    }

    #[test]
    fn test_empty_input() {
        let table = table();
        assert_eq!(parse_sequence("", &table), Err(ParseError::EmptySequence));
        assert_eq!(parse_sequence("   ", &table), Err(ParseError::EmptySequence));
    }

    #[test]
    fn test_named_tokens() {
        let table = table();

        let esc = parse_sequence("esc", &table).unwrap();
        assert_eq!(esc, parse_sequence("<esc>", &table).unwrap());
        assert_eq!(esc, parse_sequence("Escape", &table).unwrap());
        assert_eq!(esc.len(), 1);

        let pgup = parse_sequence("pageup", &table).unwrap();
        assert_eq!(pgup, parse_sequence("PgUp", &table).unwrap());

        assert!(parse_sequence("f5", &table).is_ok());
        assert!(parse_sequence("f24", &table).is_ok());
        assert!(parse_sequence("numpad3", &table).is_ok());
        assert_eq!(
            parse_sequence("return", &table).unwrap(),
            parse_sequence("enter", &table).unwrap()
        );
    }

    #[test]
    fn test_combined_modifiers() {
        let table = table();
        let seq = parse_sequence("<c-s-a>", &table).unwrap();
        let mods = seq.presses[0].matcher().modifiers();
        assert!(mods.control && mods.shift);
        assert!(!mods.alt && !mods.meta);

        assert_eq!(seq, parse_sequence("Ctrl+Shift+A", &table).unwrap());
    }

    #[test]
    fn test_meta_aliases() {
        let table = table();
        let expected = parse_sequence("Meta+a", &table).unwrap();
        for spelling in ["Cmd+a", "Super+a", "Win+a", "Command+a", "<m-a>", "<d-a>"] {
            assert_eq!(expected, parse_sequence(spelling, &table).unwrap(), "{spelling}");
        }
    }

    #[test]
    fn test_multi_char_word_splits_into_bare_keys() {
        let table = table();
        let seq = parse_sequence("gg", &table).unwrap();
        assert_eq!(seq, parse_sequence("g g", &table).unwrap());
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_shift_named_key() {
        let table = table();
        let seq = parse_sequence("<s-tab>", &table).unwrap();
        assert!(seq.presses[0].matcher().modifiers().shift);
        assert_eq!(seq, parse_sequence("Shift+Tab", &table).unwrap());
    }

    proptest! {
        #[test]
        fn prop_bare_word_yields_one_press_per_char(word in "[a-z]{2,6}") {
            // Words that collide with named tokens parse as one atom instead.
            prop_assume!(symbol_for_token(&word).is_none());
            let seq = parse_sequence(&word, &table()).unwrap();
            prop_assert_eq!(seq.len(), word.chars().count());
            prop_assert!(seq.presses.iter().all(|p| p.is_down()));
        }

        #[test]
        fn prop_single_letter_case_insensitive(c in proptest::char::range('a', 'z')) {
            let table = table();
            let lower = parse_sequence(&c.to_string(), &table).unwrap();
            let upper = parse_sequence(&c.to_ascii_uppercase().to_string(), &table).unwrap();
            prop_assert_eq!(lower, upper);
        }

        #[test]
        fn prop_whitespace_between_atoms_is_insignificant(
            a in proptest::char::range('a', 'z'),
            b in proptest::char::range('a', 'z'),
            spaces in 1usize..4,
        ) {
            let table = table();
            // Letter pairs that spell a named token ("up", "bs", "cr")
            // parse as one atom when joined, so they are out of scope here.
            prop_assume!(symbol_for_token(&format!("{a}{b}")).is_none());
            let joined = parse_sequence(&format!("{a}{b}"), &table).unwrap();
            let spread = parse_sequence(
                &format!("{a}{}{b}", " ".repeat(spaces)),
                &table,
            ).unwrap();
            prop_assert_eq!(joined, spread);
        }
    }
}
