//! Keypad calculator state machine
//!
//! The engine consumes one [`Token`] at a time and reports through its
//! [`Sink`]. It never fails: every token is handled to completion and the
//! machine always accepts further input.

use crate::core::format::{format_number, parse_display};
use crate::core::history::{HistoryLine, Tape};
use crate::core::{Equation, Operator};
use crate::sink::{Sink, Status};
use crate::token::{Keys, Token};
use tracing::{debug, trace};

/// Keypad calculator
///
/// Holds the arithmetic state (first operand, pending operator, entry
/// flags, last equation) and the display text. The second operand is read
/// from the display at commit time.
#[derive(Debug)]
pub struct Calculator<S: Sink = Tape> {
    a: Option<f64>,
    op: Option<Operator>,
    entering_b: bool,
    overwrite: bool,
    last_equation: Option<Equation>,
    display: String,
    sink: S,
}

impl Default for Calculator<Tape> {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator<Tape> {
    /// Creates a calculator recording into a default [`Tape`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Tape::new())
    }

    /// Creates a calculator whose tape keeps at most `max_lines` history lines
    #[must_use]
    pub fn with_history_limit(max_lines: usize) -> Self {
        Self::with_sink(Tape::with_capacity(max_lines))
    }
}

impl<S: Sink> Calculator<S> {
    /// Creates a calculator reporting to `sink`
    ///
    /// The sink immediately receives the initial display and a
    /// [`Status::Ready`].
    pub fn with_sink(mut sink: S) -> Self {
        sink.display("0");
        sink.status(&Status::Ready);
        Self {
            a: None,
            op: None,
            entering_b: false,
            overwrite: true,
            last_equation: None,
            display: "0".to_string(),
            sink,
        }
    }

    /// Current display text
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Current display read back as a number (the infinity glyph reads as NaN)
    #[must_use]
    pub fn display_value(&self) -> f64 {
        parse_display(&self.display)
    }

    /// First operand, once committed
    #[must_use]
    pub fn first_operand(&self) -> Option<f64> {
        self.a
    }

    /// Pending operator
    #[must_use]
    pub fn pending_op(&self) -> Option<Operator> {
        self.op
    }

    /// True between an operator choice and the commit of the second operand
    #[must_use]
    pub fn is_entering_second(&self) -> bool {
        self.entering_b
    }

    /// True when the next digit replaces the display
    #[must_use]
    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    /// Last "=" computation, replayed by a repeated "="
    #[must_use]
    pub fn last_equation(&self) -> Option<Equation> {
        self.last_equation
    }

    /// The sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the calculator, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Reports that a host bridge is attached
    pub fn attach_bridge(&mut self) {
        self.sink.status(&Status::Connected);
    }

    /// Handles one token
    pub fn handle_token(&mut self, token: Token) {
        trace!(%token, "handling token");
        match token {
            Token::Digit(d) => self.input_digit(d),
            Token::Point => self.input_point(),
            Token::Op(op) => self.choose_op(op),
            Token::Percent => self.percent(),
            Token::Equals => self.equals(),
            Token::Backspace => self.backspace(),
            Token::Clear => self.clear(),
        }
    }

    /// Handles a key name or button label; unknown keys are ignored
    ///
    /// Returns whether the key mapped to a token.
    pub fn press(&mut self, key: &str) -> bool {
        match Token::from_key(key) {
            Some(token) => {
                self.handle_token(token);
                true
            }
            None => {
                trace!(key, "ignoring unknown key");
                false
            }
        }
    }

    /// Handles every key of a key string (see [`Keys`])
    ///
    /// Returns the number of keys that mapped to a token.
    pub fn press_keys(&mut self, keys: &str) -> usize {
        Keys::new(keys)
            .filter_map(Result::ok)
            .filter(|key| self.press(key))
            .count()
    }

    /// Enters a digit; values above 9 are ignored
    pub fn input_digit(&mut self, digit: u8) {
        if let Some(c) = char::from_digit(u32::from(digit), 10) {
            self.enter_char(c);
        }
        self.emit_display();
    }

    /// Enters a decimal point
    pub fn input_point(&mut self) {
        self.enter_char('.');
        self.emit_display();
    }

    fn enter_char(&mut self, c: char) {
        if self.overwrite {
            self.display = if c == '.' { "0.".to_string() } else { c.to_string() };
            self.overwrite = false;
            return;
        }
        if c == '.' && self.display.contains('.') {
            return;
        }
        if self.display == "0" && c != '.' {
            self.display = c.to_string();
        } else {
            self.display.push(c);
        }
    }

    /// Removes the last typed character
    ///
    /// Does nothing while the display shows a produced value.
    pub fn backspace(&mut self) {
        if !self.overwrite {
            self.display.pop();
            if self.display.is_empty() || self.display == "-" {
                self.display = "0".to_string();
                self.overwrite = true;
            }
        }
        self.emit_display();
    }

    /// Chooses the pending operator
    ///
    /// With no first operand the display becomes the first operand. While a
    /// typed second operand is on the display the pending computation is
    /// committed first and its result becomes the first operand. Otherwise
    /// only the operator is replaced.
    pub fn choose_op(&mut self, op: Operator) {
        match (self.a, self.op) {
            (None, _) => self.a = Some(self.display_value()),
            (Some(a), Some(pending)) if self.entering_b && !self.overwrite => {
                let b = self.display_value();
                let r = pending.apply(a, b);
                self.record(a, pending, b, r);
                self.a = Some(r);
                self.display = format_number(r);
            }
            // Repeated operator, or right after "="; a pending op without
            // entering_b never occurs since "=" clears the op
            _ => {}
        }
        self.op = Some(op);
        self.entering_b = true;
        self.overwrite = true;
        self.sink.status(&Status::Op(op));
        self.emit_display();
    }

    /// Applies percent
    ///
    /// While the second operand is being entered the display becomes
    /// `a * (display / 100)`; otherwise `display / 100`.
    pub fn percent(&mut self) {
        let value = self.display_value();
        let shown = match self.a {
            Some(a) if self.entering_b => a * (value / 100.0),
            _ => value / 100.0,
        };
        self.display = format_number(shown);
        self.overwrite = true;
        self.sink.status(&Status::Percent);
        self.emit_display();
    }

    /// Computes the pending operation, or repeats the last one
    ///
    /// A repeat applies the stored operator and second operand to the
    /// current display. With nothing pending and nothing to repeat this is
    /// a no-op.
    pub fn equals(&mut self) {
        let (a, op, b) = match (self.a, self.op) {
            (Some(a), Some(op)) => {
                let b = self.display_value();
                self.last_equation = Some(Equation { a, b, op });
                (a, op, b)
            }
            _ => match self.last_equation {
                Some(eq) => (self.display_value(), eq.op, eq.b),
                None => {
                    self.emit_display();
                    return;
                }
            },
        };
        let r = op.apply(a, b);
        self.record(a, op, b, r);
        self.display = format_number(r);
        self.a = Some(r);
        self.op = None;
        self.entering_b = false;
        self.overwrite = true;
        self.sink.status(&Status::Done);
        self.emit_display();
    }

    /// Resets every field and shows `0`
    pub fn clear(&mut self) {
        self.a = None;
        self.op = None;
        self.entering_b = false;
        self.overwrite = true;
        self.last_equation = None;
        self.display = "0".to_string();
        self.sink.status(&Status::Ready);
        self.emit_display();
    }

    fn record(&mut self, a: f64, op: Operator, b: f64, result: f64) {
        let line = HistoryLine::new(a, op, b, result);
        debug!(line = %line, "computation committed");
        self.sink.history(&line);
    }

    fn emit_display(&mut self) {
        self.sink.display(&self.display);
    }
}
