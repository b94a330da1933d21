//! Output formatting

use crate::config::CliConfig;
use console::Style;
use keycalc::{HistoryLine, Status, Token};

/// Formats calculator output for the terminal
///
/// Every method returns the finished line; callers decide where it goes.
#[derive(Debug, Clone)]
pub struct Printer {
    display: Style,
    history: Style,
    status: Style,
    heading: Style,
    /// Suppress history and status lines
    pub quiet: bool,
    /// Print status lines
    pub show_status: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(false, false, false)
    }
}

impl Printer {
    /// Create a printer
    #[must_use]
    pub fn new(use_color: bool, quiet: bool, show_status: bool) -> Self {
        let styled = |style: Style| style.force_styling(use_color);
        Self {
            display: styled(Style::new().bold()),
            history: styled(Style::new().dim()),
            status: styled(Style::new().cyan()),
            heading: styled(Style::new().bold().underlined()),
            quiet,
            show_status,
        }
    }

    /// Create a printer from the CLI configuration
    #[must_use]
    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(
            config.color.should_color(),
            config.verbosity.is_quiet(),
            config.show_status,
        )
    }

    /// Display line
    #[must_use]
    pub fn display(&self, text: &str) -> String {
        self.display.apply_to(text).to_string()
    }

    /// History line, indented under the display
    #[must_use]
    pub fn history(&self, line: &HistoryLine) -> Option<String> {
        if self.quiet {
            return None;
        }
        Some(format!("  {}", self.history.apply_to(line.text())))
    }

    /// Status line, if status output is on
    #[must_use]
    pub fn status(&self, status: &Status) -> Option<String> {
        if self.quiet || !self.show_status {
            return None;
        }
        Some(format!("[{}]", self.status.apply_to(status)))
    }

    /// Section heading
    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        self.heading.apply_to(text).to_string()
    }

    /// Key table row: key name and what it does
    #[must_use]
    pub fn key_row(&self, key: &str, token: Token) -> String {
        format!("  {key:<10} {}", describe(token))
    }
}

/// Human-readable meaning of a token
#[must_use]
pub fn describe(token: Token) -> String {
    match token {
        Token::Digit(d) => format!("digit {d}"),
        Token::Point => "decimal point".to_string(),
        Token::Op(op) => format!("{} ({op})", op.name()),
        Token::Percent => "percent".to_string(),
        Token::Equals => "equals".to_string(),
        Token::Backspace => "backspace".to_string(),
        Token::Clear => "clear (AC)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keycalc::Operator;

    fn plain() -> Printer {
        Printer::new(false, false, true)
    }

    #[test]
    fn test_display_plain() {
        assert_eq!(plain().display("42"), "42");
    }

    #[test]
    fn test_display_colored() {
        let printer = Printer::new(true, false, false);
        let out = printer.display("42");
        assert!(out.contains("42"));
        assert!(out.contains('\u{1b}'));
    }

    #[test]
    fn test_history_indented() {
        let line = HistoryLine::with_timestamp(2.0, Operator::Add, 3.0, 5.0, 0);
        assert_eq!(plain().history(&line).as_deref(), Some("  2 + 3 = 5"));
    }

    #[test]
    fn test_status_shown() {
        assert_eq!(
            plain().status(&Status::Op(Operator::Multiply)).as_deref(),
            Some("[Op: ×]")
        );
    }

    #[test]
    fn test_status_hidden_by_default() {
        assert!(Printer::default().status(&Status::Done).is_none());
    }

    #[test]
    fn test_quiet_suppresses_history_and_status() {
        let printer = Printer::new(false, true, true);
        let line = HistoryLine::with_timestamp(1.0, Operator::Add, 1.0, 2.0, 0);
        assert!(printer.history(&line).is_none());
        assert!(printer.status(&Status::Done).is_none());
        assert_eq!(printer.display("2"), "2");
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(Token::Digit(4)), "digit 4");
        assert_eq!(describe(Token::Op(Operator::Divide)), "divide (÷)");
        assert_eq!(describe(Token::Clear), "clear (AC)");
    }

    #[test]
    fn test_key_row() {
        assert_eq!(
            plain().key_row("Enter", Token::Equals),
            "  Enter      equals"
        );
    }
}
