//! # modal-keybinds
//!
//! Input binding engine for modal editors.
//!
//! ## Features
//!
//! - Multi-key binding sequences (`ab`, `<c-x><c-s>`) with longest-match
//!   commit and prefix disambiguation
//! - Two surface syntaxes compiled to one matcher form: vim-style `<c-a>`
//!   and vscode-style `Ctrl+A`
//! - Keyup triggers (`!a`) in the binding grammar
//! - User remaps that re-enter the matching pipeline, with a recursion cap
//! - Context-aware bindings via per-binding predicates
//!
//! Key-symbol-to-code mapping is injected through [`KeycodeResolver`]; the
//! engine itself is agnostic of actual keyboard layouts. The engine is
//! generic over the dispatched payload and the predicate context, and it
//! keeps no timer: hosts call [`BindingEngine::flush`] when their own
//! disambiguation timeout expires.

mod adapter;
mod engine;
mod key;
mod matcher;
mod parser;
mod resolver;

pub use adapter::from_crossterm;
pub use engine::{BindError, BindingEngine, BindingId, Effect, DEFAULT_REMAP_LIMIT};
pub use key::{KeyEvent, KeySymbol, Modifiers};
pub use matcher::{KeyMatcher, KeyPress, KeySequence, Progress};
pub use parser::{parse_sequence, ParseError};
pub use resolver::{KeycodeResolver, KeycodeTable};

/// Helper to create a keydown press for a keycode with no modifiers.
pub fn key(code: u32) -> KeyPress {
    KeyPress::Down(KeyMatcher::keycode(code, Modifiers::NONE))
}

/// Helper to create a Ctrl+keycode press.
pub fn ctrl(code: u32) -> KeyPress {
    KeyPress::Down(KeyMatcher::keycode(code, Modifiers::CONTROL))
}

/// Helper to create an Alt+keycode press.
pub fn alt(code: u32) -> KeyPress {
    KeyPress::Down(KeyMatcher::keycode(code, Modifiers::ALT))
}

/// Helper to create a Shift+keycode press.
pub fn shift(code: u32) -> KeyPress {
    KeyPress::Down(KeyMatcher::keycode(code, Modifiers::SHIFT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_helpers() {
        let k = key(30);
        assert!(k.matcher().modifiers().is_none());

        let c = ctrl(30);
        assert!(c.matcher().modifiers().control);

        let a = alt(30);
        assert!(a.matcher().modifiers().alt);

        let s = shift(30);
        assert!(s.matcher().modifiers().shift);
    }

    #[test]
    fn test_parse_and_dispatch_end_to_end() {
        let table = KeycodeTable::logical();
        let mut engine: BindingEngine<&'static str, ()> = BindingEngine::new();

        let goto = parse_sequence("gd", &table).unwrap();
        engine.add_binding(goto, |_| true, "goto_definition").unwrap();

        let save = parse_sequence("<c-s>", &table).unwrap();
        engine.add_binding(save, |_| true, "save").unwrap();

        let g = table.keycode(&KeySymbol::Character('g')).unwrap();
        let d = table.keycode(&KeySymbol::Character('d')).unwrap();
        let s = table.keycode(&KeySymbol::Character('s')).unwrap();

        assert_eq!(
            engine.key_down(&(), KeyEvent::new(0, g, Modifiers::NONE)),
            vec![]
        );
        assert_eq!(
            engine.key_down(&(), KeyEvent::new(0, d, Modifiers::NONE)),
            vec![Effect::Execute("goto_definition")]
        );
        assert_eq!(
            engine.key_down(&(), KeyEvent::new(0, s, Modifiers::CONTROL)),
            vec![Effect::Execute("save")]
        );
    }

    #[test]
    fn test_parse_and_remap_end_to_end() {
        let table = KeycodeTable::logical();
        let mut engine: BindingEngine<&'static str, ()> = BindingEngine::new();

        let g = table.keycode(&KeySymbol::Character('g')).unwrap();
        let d = table.keycode(&KeySymbol::Character('d')).unwrap();

        let goto = parse_sequence("gd", &table).unwrap();
        engine.add_binding(goto, |_| true, "goto_definition").unwrap();

        let alias = parse_sequence("q", &table).unwrap();
        engine
            .add_mapping(
                alias,
                |_| true,
                vec![
                    KeyEvent::new(0, g, Modifiers::NONE),
                    KeyEvent::new(0, d, Modifiers::NONE),
                ],
            )
            .unwrap();

        let q = table.keycode(&KeySymbol::Character('q')).unwrap();
        assert_eq!(
            engine.key_down(&(), KeyEvent::new(0, q, Modifiers::NONE)),
            vec![Effect::Execute("goto_definition")]
        );
    }
}
