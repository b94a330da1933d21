//! Command implementations
//!
//! Each command drives a [`Calculator`] over a [`Feed`] sink and writes its
//! output to the given writers, so everything but the raw-mode loop runs
//! under test without a terminal.

use crate::commands::{BridgeArgs, EvalArgs, EvalFormat, KeysArgs, ReplArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Printer;
use keycalc::bridge::{readiness, record_visit, HostBridge, MemoryBridge, PollPolicy, ReadyVia};
use keycalc::token::{parse_keys, tokenize, Keypad, KEY_MAP};
use keycalc::{Calculator, HistoryLine, Sink, Status, Tape, Token};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sink that keeps a [`Tape`] and queues what is new since the last drain
#[derive(Debug)]
pub struct Feed {
    tape: Tape,
    fresh: Vec<HistoryLine>,
    statuses: Vec<Status>,
}

impl Feed {
    /// Feed whose tape keeps at most `max_lines` lines
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        Self {
            tape: Tape::with_capacity(max_lines),
            fresh: Vec::new(),
            statuses: Vec::new(),
        }
    }

    /// Recorded tape
    #[must_use]
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// History lines added since the last call
    pub fn take_history(&mut self) -> Vec<HistoryLine> {
        std::mem::take(&mut self.fresh)
    }

    /// Latest status since the last call
    pub fn take_status(&mut self) -> Option<Status> {
        self.statuses.drain(..).last()
    }
}

impl Sink for Feed {
    fn display(&mut self, text: &str) {
        self.tape.display(text);
    }

    fn history(&mut self, line: &HistoryLine) {
        self.tape.history(line);
        self.fresh.push(line.clone());
    }

    fn status(&mut self, status: &Status) {
        self.tape.status(status);
        self.statuses.push(*status);
    }
}

fn calculator(config: &CliConfig, history_limit: Option<usize>) -> CliResult<Calculator<Feed>> {
    let limit = history_limit.unwrap_or(config.history_limit);
    if limit == 0 {
        return Err(CliError::invalid_argument("history limit must be at least 1"));
    }
    let mut calc = Calculator::with_sink(Feed::new(limit));
    calc.sink_mut().take_status();
    Ok(calc)
}

fn keys_to_tokens(keys: &str, strict: bool) -> CliResult<Vec<Token>> {
    if strict {
        Ok(parse_keys(keys)?)
    } else {
        Ok(tokenize(keys))
    }
}

fn write_opt(out: &mut impl Write, line: Option<String>) -> CliResult<()> {
    if let Some(line) = line {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct EvalReport<'a> {
    display: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    history: Vec<HistoryEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct HistoryEntry<'a> {
    text: String,
    #[serde(flatten)]
    line: &'a HistoryLine,
}

/// `keycalc eval`
pub fn eval(config: &CliConfig, args: &EvalArgs, out: &mut impl Write) -> CliResult<()> {
    let tokens = keys_to_tokens(&args.keys, args.strict)?;
    let mut calc = calculator(config, args.history_limit)?;
    debug!(tokens = tokens.len(), "evaluating key string");
    for token in tokens {
        calc.handle_token(token);
    }

    let show_status = args.status || config.show_status;
    let status = calc.sink().tape().last_status();
    let tape = calc.sink().tape();

    match args.format {
        EvalFormat::Json => {
            let report = EvalReport {
                display: calc.display(),
                status: status.filter(|_| show_status).map(|s| s.to_string()),
                history: if args.history {
                    tape.iter()
                        .map(|line| HistoryEntry {
                            text: line.text(),
                            line,
                        })
                        .collect()
                } else {
                    Vec::new()
                },
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        EvalFormat::Text => {
            let mut printer = Printer::from_config(config);
            printer.show_status = show_status;
            if args.history {
                for line in tape.iter() {
                    write_opt(out, printer.history(line))?;
                }
            }
            writeln!(out, "{}", printer.display(calc.display()))?;
            if let Some(status) = status {
                write_opt(out, printer.status(&status))?;
            }
        }
    }
    Ok(())
}

/// `keycalc repl`: one key string per input line
///
/// Lines with unknown keys are reported on `err` in strict mode and
/// skipped; `quit` or `exit` ends the session.
pub fn repl(
    config: &CliConfig,
    args: &ReplArgs,
    input: impl BufRead,
    out: &mut impl Write,
    err: &mut impl Write,
) -> CliResult<()> {
    let mut calc = calculator(config, args.history_limit)?;
    let mut printer = Printer::from_config(config);
    printer.show_status = args.status || config.show_status;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        let tokens = match keys_to_tokens(line, args.strict) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(line, "rejected input line");
                writeln!(err, "{e}")?;
                continue;
            }
        };
        for token in tokens {
            calc.handle_token(token);
        }

        for history in calc.sink_mut().take_history() {
            write_opt(out, printer.history(&history))?;
        }
        writeln!(out, "{}", printer.display(calc.display()))?;
        if let Some(status) = calc.sink_mut().take_status() {
            write_opt(out, printer.status(&status))?;
        }
        out.flush()?;
    }
    info!(lines = calc.sink().tape().len(), "repl finished");
    Ok(())
}

/// `keycalc keys`
pub fn keys(config: &CliConfig, args: &KeysArgs, out: &mut impl Write) -> CliResult<()> {
    let printer = Printer::from_config(config);
    if args.keypad {
        let keypad = Keypad::new();
        for row in 0..Keypad::ROWS {
            let cells: Vec<String> = (0..Keypad::COLS)
                .filter_map(|col| keypad.button_at(row, col))
                .map(|button| format!("[{:^4}]", button.token.label()))
                .collect();
            writeln!(out, "{}", cells.join(" "))?;
        }
        return Ok(());
    }

    writeln!(out, "{}", printer.heading("Keys"))?;
    writeln!(out, "  {:<10} digit", "0-9")?;
    for (key, token) in KEY_MAP {
        writeln!(out, "{}", printer.key_row(key, *token))?;
    }
    writeln!(out)?;
    writeln!(out, "Named keys go in braces inside key strings: {{Enter}}, {{AC}}")?;
    Ok(())
}

/// `keycalc bridge`: attach an in-process host bridge and report on it
pub fn bridge(config: &CliConfig, args: &BridgeArgs, out: &mut impl Write) -> CliResult<()> {
    if args.interval_ms == 0 {
        return Err(CliError::invalid_argument("--interval-ms must be positive"));
    }
    if args.attempts == 0 {
        return Err(CliError::invalid_argument("--attempts must be positive"));
    }
    let policy = PollPolicy {
        interval: Duration::from_millis(args.interval_ms),
        max_attempts: args.attempts,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let host = MemoryBridge::new();
    let report = runtime.block_on(async {
        let (notifier, waiter) = readiness();
        if !args.poll {
            tokio::spawn(async move {
                notifier.notify();
            });
        }
        let visible = args.poll;
        let via = waiter.wait(move || visible, policy).await?;

        host.log("keycalc attached");
        let version = host.version().await?;
        let echo = host.echo(&args.echo).await?;
        let visits = record_visit(&host).await?;
        Ok::<_, CliError>((via, version, echo, visits))
    })?;
    let (via, version, echo, visits) = report;

    let mut calc = calculator(config, None)?;
    calc.attach_bridge();

    let printer = Printer::from_config(config);
    let via = match via {
        ReadyVia::Event => "event",
        ReadyVia::Poll => "poll",
    };
    writeln!(out, "ready:   {via}")?;
    writeln!(out, "version: {version}")?;
    writeln!(out, "echo:    {echo}")?;
    writeln!(out, "visits:  {visits}")?;
    if let Some(status) = calc.sink_mut().take_status() {
        write_opt(out, printer.status(&status))?;
    }
    Ok(())
}

/// `keycalc run`: raw-mode interactive calculator
pub fn run(config: &CliConfig) -> CliResult<()> {
    use crossterm::cursor::MoveToColumn;
    use crossterm::event::{read, Event};
    use crossterm::style::Print;
    use crossterm::terminal::{Clear, ClearType};
    use crossterm::{execute, queue};
    use keycalc::term::{KeyAction, KeyMapper};
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Err(CliError::invalid_argument(
            "run needs an interactive terminal; pipe key strings to `keycalc repl` instead",
        ));
    }

    let printer = Printer::from_config(config);
    let mapper = KeyMapper::new();
    let mut calc = calculator(config, None)?;
    let mut stdout = std::io::stdout();

    let _raw = RawMode::enable()?;
    execute!(
        stdout,
        Print("keycalc (q to quit)\r\n"),
        Print(printer.display(calc.display()))
    )?;

    loop {
        let Event::Key(event) = read()? else {
            continue;
        };
        match mapper.map(event) {
            KeyAction::Quit => break,
            KeyAction::None => continue,
            KeyAction::Token(token) => calc.handle_token(token),
        }

        queue!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        for line in calc.sink_mut().take_history() {
            if let Some(text) = printer.history(&line) {
                queue!(stdout, Print(text), Print("\r\n"))?;
            }
        }
        let mut text = printer.display(calc.display());
        if let Some(status) = calc.sink_mut().take_status().and_then(|s| printer.status(&s)) {
            text = format!("{text}  {status}");
        }
        queue!(stdout, Print(text))?;
        stdout.flush()?;
    }

    execute!(stdout, Print("\r\n"))?;
    Ok(())
}

/// Restores cooked mode when dropped
struct RawMode;

impl RawMode {
    fn enable() -> std::io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
