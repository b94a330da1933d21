//! History lines and the default recording sink

use crate::core::format::format_number;
use crate::core::Operator;
use crate::sink::{Sink, Status};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One completed computation
///
/// Non-finite values serialize as `null` and read back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLine {
    /// First operand
    #[serde(with = "nullable_f64")]
    pub a: f64,
    /// Operator applied
    pub op: Operator,
    /// Second operand
    #[serde(with = "nullable_f64")]
    pub b: f64,
    /// Result (may be non-finite)
    #[serde(with = "nullable_f64")]
    pub result: f64,
    /// When the computation completed (Unix epoch millis)
    pub timestamp: u64,
}

mod nullable_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

impl HistoryLine {
    /// Creates a history line stamped with the current time
    #[must_use]
    pub fn new(a: f64, op: Operator, b: f64, result: f64) -> Self {
        Self::with_timestamp(a, op, b, result, Self::current_timestamp())
    }

    /// Creates a history line with a specific timestamp
    #[must_use]
    pub fn with_timestamp(a: f64, op: Operator, b: f64, result: f64, timestamp: u64) -> Self {
        Self {
            a,
            op,
            b,
            result,
            timestamp,
        }
    }

    fn current_timestamp() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Returns the line as shown in the history log: `"<a> <op> <b> = <result>"`
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "{} {} {} = {}",
            format_number(self.a),
            self.op,
            format_number(self.b),
            format_number(self.result)
        )
    }
}

impl std::fmt::Display for HistoryLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// Recording sink: last display, last status and a bounded history log
///
/// The log is append-only from the engine's point of view; once it reaches
/// its capacity the oldest line is dropped.
#[derive(Debug, Clone)]
pub struct Tape {
    display: String,
    status: Option<Status>,
    lines: VecDeque<HistoryLine>,
    max_lines: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    /// Default maximum number of history lines
    pub const DEFAULT_MAX_LINES: usize = 100;

    /// Creates a tape with the default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_LINES)
    }

    /// Creates a tape keeping at most `max_lines` history lines
    #[must_use]
    pub fn with_capacity(max_lines: usize) -> Self {
        Self {
            display: "0".to_string(),
            status: None,
            lines: VecDeque::with_capacity(max_lines.min(1024)),
            max_lines: max_lines.max(1),
        }
    }

    /// Last display text received
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Last status received
    #[must_use]
    pub fn last_status(&self) -> Option<Status> {
        self.status
    }

    /// Number of history lines kept
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no computation has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of history lines kept
    #[must_use]
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// History lines, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryLine> {
        self.lines.iter()
    }

    /// Most recent history line
    #[must_use]
    pub fn last(&self) -> Option<&HistoryLine> {
        self.lines.back()
    }

    /// History line at `index` (0 = oldest)
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryLine> {
        self.lines.get(index)
    }

    /// Drops every history line
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// History log as text, one line per computation
    #[must_use]
    pub fn export_formatted(&self) -> String {
        self.lines
            .iter()
            .map(HistoryLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serializes the history log to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Restores a history log from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let lines: Vec<HistoryLine> = serde_json::from_str(json)?;
        let mut tape = Self::new();
        for line in lines {
            tape.push(line);
        }
        Ok(tape)
    }

    fn push(&mut self, line: HistoryLine) {
        if self.lines.len() >= self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

impl Sink for Tape {
    fn display(&mut self, text: &str) {
        text.clone_into(&mut self.display);
    }

    fn history(&mut self, line: &HistoryLine) {
        self.push(line.clone());
    }

    fn status(&mut self, status: &Status) {
        self.status = Some(*status);
    }
}
