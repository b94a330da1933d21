//! Calculator core: operators, arithmetic and the keypad state machine
//!
//! Arithmetic never fails. Edge cases such as division by zero produce a
//! non-finite value which the display layer renders as [`INFINITY_GLYPH`].

pub mod engine;
pub mod format;
pub mod history;

pub use engine::Calculator;
pub use format::{format_number, INFINITY_GLYPH};
pub use history::{HistoryLine, Tape};

use serde::{Deserialize, Serialize};

/// Binary operator accepted by the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Addition (+)
    Add,
    /// Subtraction (−)
    Subtract,
    /// Multiplication (×)
    Multiply,
    /// Division (÷)
    Divide,
}

impl Operator {
    /// All operators in keypad order
    pub const ALL: [Self; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    /// Returns the glyph shown on the keypad and in history lines
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "−",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }

    /// Returns a short ASCII name, used for button ids
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add => "plus",
            Self::Subtract => "minus",
            Self::Multiply => "times",
            Self::Divide => "divide",
        }
    }

    /// Applies the operator to two operands
    ///
    /// Division by zero yields NaN rather than an error.
    #[must_use]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => {
                if b == 0.0 {
                    f64::NAN
                } else {
                    a / b
                }
            }
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The most recently completed "=" computation, replayed by repeated "="
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    /// First operand
    pub a: f64,
    /// Second operand
    pub b: f64,
    /// Operator
    pub op: Operator,
}
