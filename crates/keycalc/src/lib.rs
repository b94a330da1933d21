//! keycalc - keypad calculator engine
//!
//! A small, deterministic state machine driven by discrete keypad tokens
//! (digits, decimal point, the four operators, percent, equals, backspace,
//! clear). After every token the engine reports the formatted display to a
//! [`Sink`]; each completed computation is reported as a history line.
//!
//! The engine never fails. Division by zero and other non-finite results
//! show as `∞`, and keys outside the alphabet are ignored.
//!
//! # Example
//!
//! ```rust
//! use keycalc::prelude::*;
//!
//! let mut calc = Calculator::new();
//! calc.press_keys("2+3=");
//! assert_eq!(calc.display(), "5");
//!
//! // Repeated "=" reapplies the last operation
//! calc.press("=");
//! assert_eq!(calc.display(), "8");
//!
//! assert_eq!(calc.sink().export_formatted(), "2 + 3 = 5\n5 + 3 = 8");
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::float_cmp
    )
)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

pub mod bridge;
pub mod core;
pub mod error;
pub mod sink;
pub mod token;

#[cfg(feature = "term")]
pub mod term;

pub use crate::core::{Calculator, HistoryLine, Operator, Tape};
pub use crate::error::{BridgeError, KeyError};
pub use crate::sink::{Sink, Status};
pub use crate::token::Token;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bridge::{
        readiness, record_visit, HostBridge, MemoryBridge, PollPolicy, ReadyVia,
    };
    pub use crate::core::{format_number, Calculator, Equation, HistoryLine, Operator, Tape};
    pub use crate::error::{BridgeError, BridgeResult, KeyError};
    pub use crate::sink::{NullSink, Sink, Status};
    pub use crate::token::{parse_keys, tokenize, Keypad, KeypadButton, Token, KEY_MAP};

    #[cfg(feature = "term")]
    pub use crate::term::{KeyAction, KeyMapper};
}
