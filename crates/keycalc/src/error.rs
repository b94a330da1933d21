//! Error types for the edges of the library
//!
//! The engine itself never fails; these cover strict key parsing and the
//! host bridge.

use thiserror::Error;

/// Errors from strict key parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key has no token
    #[error("unknown key: {0:?}")]
    Unknown(String),

    /// A `{name}` key was opened but never closed
    #[error("unterminated key name starting at byte {0}")]
    Unterminated(usize),
}

/// Errors from the host bridge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Neither the ready notification nor the probe fired in time
    #[error("host bridge not ready after {attempts} polls")]
    Timeout {
        /// Number of polls made
        attempts: u32,
    },

    /// Every notifier was dropped without signalling
    #[error("readiness notifier dropped")]
    Closed,

    /// A host call failed
    #[error("host call `{call}` failed: {message}")]
    Call {
        /// Name of the call
        call: &'static str,
        /// Failure description
        message: String,
    },
}

impl BridgeError {
    /// Creates a call failure
    #[must_use]
    pub fn call(call: &'static str, message: impl Into<String>) -> Self {
        Self::Call {
            call,
            message: message.into(),
        }
    }
}

/// Result type for host bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
