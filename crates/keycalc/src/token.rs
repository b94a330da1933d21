//! Token alphabet, key map and keypad layout
//!
//! Button activations and keyboard keys both map to the same [`Token`]
//! set. Each key maps to exactly one token; keys outside the alphabet map
//! to nothing.

use crate::core::Operator;
use crate::error::KeyError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One discrete unit of input understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Digit 0-9
    Digit(u8),
    /// Decimal point
    Point,
    /// Binary operator
    Op(Operator),
    /// Percent
    Percent,
    /// Equals
    Equals,
    /// Remove the last typed character
    Backspace,
    /// Reset everything
    Clear,
}

/// Named keys and their tokens; digits `0`-`9` map to themselves
pub const KEY_MAP: &[(&str, Token)] = &[
    (".", Token::Point),
    (",", Token::Point),
    ("+", Token::Op(Operator::Add)),
    ("-", Token::Op(Operator::Subtract)),
    ("−", Token::Op(Operator::Subtract)),
    ("*", Token::Op(Operator::Multiply)),
    ("x", Token::Op(Operator::Multiply)),
    ("×", Token::Op(Operator::Multiply)),
    ("/", Token::Op(Operator::Divide)),
    ("÷", Token::Op(Operator::Divide)),
    ("%", Token::Percent),
    ("=", Token::Equals),
    ("Enter", Token::Equals),
    ("Backspace", Token::Backspace),
    ("⌫", Token::Backspace),
    ("Escape", Token::Clear),
    ("AC", Token::Clear),
];

impl Token {
    /// Maps a key name or button label to a token
    ///
    /// Accepts digits, the single-character keys of [`KEY_MAP`], keyboard
    /// names (`Enter`, `Backspace`, `Escape`) and the keypad labels (`AC`,
    /// `⌫`, `−`, `×`, `÷`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::digit_key(key).or_else(|| {
            KEY_MAP
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, token)| *token)
        })
    }

    fn digit_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_digit(10).map(|d| Self::Digit(d as u8)),
            _ => None,
        }
    }

    /// Label printed on the keypad button
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Digit(d) => d.to_string(),
            Self::Point => ".".to_string(),
            Self::Op(op) => op.symbol().to_string(),
            Self::Percent => "%".to_string(),
            Self::Equals => "=".to_string(),
            Self::Backspace => "⌫".to_string(),
            Self::Clear => "AC".to_string(),
        }
    }

    /// Stable element id for the keypad button
    #[must_use]
    pub fn button_id(&self) -> String {
        match self {
            Self::Digit(d) => format!("btn-{d}"),
            Self::Point => "btn-decimal".to_string(),
            Self::Op(op) => format!("btn-{}", op.name()),
            Self::Percent => "btn-percent".to_string(),
            Self::Equals => "btn-equals".to_string(),
            Self::Backspace => "btn-backspace".to_string(),
            Self::Clear => "btn-clear".to_string(),
        }
    }
}

impl FromStr for Token {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| KeyError::Unknown(s.to_string()))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Iterator over the keys of a key string
///
/// `{Name}` yields `Name`; whitespace is skipped; any other character is a
/// key on its own.
#[derive(Debug, Clone)]
pub struct Keys<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Keys<'a> {
    /// Creates an iterator over `input`
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Keys<'a> {
    type Item = Result<&'a str, KeyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.input[self.pos..];
            let c = rest.chars().next()?;
            let start = self.pos;
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }
            if c == '{' {
                let Some(end) = rest.find('}') else {
                    self.pos = self.input.len();
                    return Some(Err(KeyError::Unterminated(start)));
                };
                self.pos += end + 1;
                return Some(Ok(&rest[1..end]));
            }
            self.pos += c.len_utf8();
            return Some(Ok(&rest[..c.len_utf8()]));
        }
    }
}

/// Converts a key string to tokens, skipping unknown keys
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Keys::new(input)
        .filter_map(Result::ok)
        .filter_map(Token::from_key)
        .collect()
}

/// Converts a key string to tokens, failing on the first unknown key
pub fn parse_keys(input: &str) -> Result<Vec<Token>, KeyError> {
    Keys::new(input)
        .map(|key| key.and_then(str::parse::<Token>))
        .collect()
}

/// One button of the keypad grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadButton {
    /// Token sent when the button is activated
    pub token: Token,
    /// Element id
    pub id: String,
    /// Grid row (0-indexed)
    pub row: usize,
    /// Grid column (0-indexed)
    pub col: usize,
}

impl KeypadButton {
    /// Creates a button at the given grid position
    #[must_use]
    pub fn new(token: Token, row: usize, col: usize) -> Self {
        Self {
            id: token.button_id(),
            token,
            row,
            col,
        }
    }
}

/// Standard calculator keypad
///
/// ```text
/// [ AC ] [ ⌫ ] [ % ] [ ÷ ]
/// [ 7 ]  [ 8 ] [ 9 ] [ × ]
/// [ 4 ]  [ 5 ] [ 6 ] [ − ]
/// [ 1 ]  [ 2 ] [ 3 ] [ + ]
/// [ 0 ]  [ . ] [ = ]
/// ```
#[derive(Debug, Clone)]
pub struct Keypad {
    buttons: Vec<KeypadButton>,
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Keypad {
    /// Number of grid rows
    pub const ROWS: usize = 5;
    /// Number of grid columns
    pub const COLS: usize = 4;

    /// Creates the standard layout
    #[must_use]
    pub fn new() -> Self {
        let grid: [&[Token]; Self::ROWS] = [
            &[
                Token::Clear,
                Token::Backspace,
                Token::Percent,
                Token::Op(Operator::Divide),
            ],
            &[
                Token::Digit(7),
                Token::Digit(8),
                Token::Digit(9),
                Token::Op(Operator::Multiply),
            ],
            &[
                Token::Digit(4),
                Token::Digit(5),
                Token::Digit(6),
                Token::Op(Operator::Subtract),
            ],
            &[
                Token::Digit(1),
                Token::Digit(2),
                Token::Digit(3),
                Token::Op(Operator::Add),
            ],
            &[Token::Digit(0), Token::Point, Token::Equals],
        ];
        let buttons = grid
            .iter()
            .enumerate()
            .flat_map(|(row, tokens)| {
                tokens
                    .iter()
                    .enumerate()
                    .map(move |(col, token)| KeypadButton::new(*token, row, col))
            })
            .collect();
        Self { buttons }
    }

    /// All buttons, row by row
    #[must_use]
    pub fn buttons(&self) -> &[KeypadButton] {
        &self.buttons
    }

    /// Button at a grid position
    #[must_use]
    pub fn button_at(&self, row: usize, col: usize) -> Option<&KeypadButton> {
        self.buttons.iter().find(|b| b.row == row && b.col == col)
    }

    /// Button by element id
    #[must_use]
    pub fn button_by_id(&self, id: &str) -> Option<&KeypadButton> {
        self.buttons.iter().find(|b| b.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_map_directly() {
        for d in 0..=9u8 {
            assert_eq!(Token::from_key(&d.to_string()), Some(Token::Digit(d)));
        }
    }

    #[test]
    fn test_keyboard_map() {
        assert_eq!(Token::from_key("Enter"), Some(Token::Equals));
        assert_eq!(Token::from_key("="), Some(Token::Equals));
        assert_eq!(Token::from_key("Escape"), Some(Token::Clear));
        assert_eq!(Token::from_key("Backspace"), Some(Token::Backspace));
        assert_eq!(Token::from_key("."), Some(Token::Point));
        assert_eq!(Token::from_key(","), Some(Token::Point));
        assert_eq!(Token::from_key("%"), Some(Token::Percent));
        assert_eq!(Token::from_key("+"), Some(Token::Op(Operator::Add)));
        assert_eq!(Token::from_key("-"), Some(Token::Op(Operator::Subtract)));
        assert_eq!(Token::from_key("*"), Some(Token::Op(Operator::Multiply)));
        assert_eq!(Token::from_key("x"), Some(Token::Op(Operator::Multiply)));
        assert_eq!(Token::from_key("/"), Some(Token::Op(Operator::Divide)));
    }

    #[test]
    fn test_button_labels_map_back() {
        for button in Keypad::new().buttons() {
            assert_eq!(Token::from_key(&button.token.label()), Some(button.token));
        }
    }

    #[test]
    fn test_key_map_names_unique() {
        let names: std::collections::HashSet<_> = KEY_MAP.iter().map(|(name, _)| name).collect();
        assert_eq!(names.len(), KEY_MAP.len());
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(Token::from_key("F5"), None);
        assert_eq!(Token::from_key("12"), None);
        assert_eq!(Token::from_key(""), None);
        assert_eq!(Token::from_key("^"), None);
        assert_eq!(
            "Tab".parse::<Token>(),
            Err(KeyError::Unknown("Tab".to_string()))
        );
    }

    #[test]
    fn test_tokenize_plain() {
        assert_eq!(
            tokenize("12+3="),
            vec![
                Token::Digit(1),
                Token::Digit(2),
                Token::Op(Operator::Add),
                Token::Digit(3),
                Token::Equals
            ]
        );
    }

    #[test]
    fn test_tokenize_named_keys_and_whitespace() {
        assert_eq!(
            tokenize("9 {Backspace} 8 {Enter} {AC}"),
            vec![
                Token::Digit(9),
                Token::Backspace,
                Token::Digit(8),
                Token::Equals,
                Token::Clear
            ]
        );
    }

    #[test]
    fn test_tokenize_skips_unknown() {
        assert_eq!(
            tokenize("1^2{F5}"),
            vec![Token::Digit(1), Token::Digit(2)]
        );
        assert_eq!(tokenize("7{Enter"), vec![Token::Digit(7)]);
    }

    #[test]
    fn test_parse_keys_strict() {
        assert_eq!(
            parse_keys("5÷0="),
            Ok(vec![
                Token::Digit(5),
                Token::Op(Operator::Divide),
                Token::Digit(0),
                Token::Equals
            ])
        );
        assert_eq!(parse_keys("1^"), Err(KeyError::Unknown("^".to_string())));
        assert_eq!(parse_keys("12{Ent"), Err(KeyError::Unterminated(2)));
    }

    #[test]
    fn test_keypad_layout() {
        let keypad = Keypad::new();
        assert_eq!(keypad.buttons().len(), 19);
        assert_eq!(keypad.button_at(0, 0).unwrap().token, Token::Clear);
        assert_eq!(keypad.button_at(4, 2).unwrap().token, Token::Equals);
        assert!(keypad.button_at(4, 3).is_none());
        assert!(keypad.button_at(Keypad::ROWS, 0).is_none());
        assert_eq!(
            keypad.button_by_id("btn-times").unwrap().token,
            Token::Op(Operator::Multiply)
        );
    }

    #[test]
    fn test_keypad_ids_unique() {
        let keypad = Keypad::new();
        let ids: std::collections::HashSet<_> = keypad.buttons().iter().map(|b| &b.id).collect();
        assert_eq!(ids.len(), keypad.buttons().len());
    }
}
