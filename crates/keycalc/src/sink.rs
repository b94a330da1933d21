//! Output sinks for the calculator engine
//!
//! The engine reports everything it does through a [`Sink`]: the formatted
//! display after every handled token, one [`HistoryLine`] per completed
//! computation and an occasional [`Status`].

use crate::core::history::HistoryLine;
use crate::core::Operator;
use serde::{Deserialize, Serialize};

/// Short status message reported alongside the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Fresh or cleared calculator
    Ready,
    /// A host bridge is attached
    Connected,
    /// An operator was chosen
    Op(Operator),
    /// Percent applied
    Percent,
    /// "=" computed a result
    Done,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Connected => write!(f, "Connected"),
            Self::Op(op) => write!(f, "Op: {op}"),
            Self::Percent => write!(f, "Percent"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Receiver for everything the engine emits
pub trait Sink {
    /// Called with the formatted display after every handled token
    fn display(&mut self, text: &str);

    /// Called once per completed computation
    fn history(&mut self, line: &HistoryLine);

    /// Called when the status changes
    fn status(&mut self, _status: &Status) {}
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn display(&mut self, text: &str) {
        (**self).display(text);
    }

    fn history(&mut self, line: &HistoryLine) {
        (**self).history(line);
    }

    fn status(&mut self, status: &Status) {
        (**self).status(status);
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn display(&mut self, _text: &str) {}

    fn history(&mut self, _line: &HistoryLine) {}
}
