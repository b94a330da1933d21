//! Terminal key adapter
//!
//! Maps crossterm key events onto the calculator token set.

use crate::token::Token;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a terminal key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Feed a token to the engine
    Token(Token),
    /// Leave the interactive session
    Quit,
    /// Ignored input
    None,
}

/// Maps key events to actions
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyMapper;

impl KeyMapper {
    /// Creates a key mapper
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Maps a key event to an action
    #[must_use]
    pub fn map(&self, event: KeyEvent) -> KeyAction {
        let KeyEvent {
            code,
            modifiers,
            kind,
            ..
        } = event;

        if kind == KeyEventKind::Release {
            return KeyAction::None;
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            return match code {
                KeyCode::Char('c' | 'q') => KeyAction::Quit,
                KeyCode::Char('l') => KeyAction::Token(Token::Clear),
                _ => KeyAction::None,
            };
        }

        match code {
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Char(c) => {
                let mut buf = [0u8; 4];
                Token::from_key(c.encode_utf8(&mut buf)).map_or(KeyAction::None, KeyAction::Token)
            }
            KeyCode::Enter => KeyAction::Token(Token::Equals),
            KeyCode::Backspace => KeyAction::Token(Token::Backspace),
            KeyCode::Esc | KeyCode::Delete => KeyAction::Token(Token::Clear),
            _ => KeyAction::None,
        }
    }
}
