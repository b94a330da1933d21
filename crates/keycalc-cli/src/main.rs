//! keycalc: keypad calculator for the terminal
//!
//! ## Usage
//!
//! ```bash
//! keycalc eval "12+7="            # 19
//! keycalc eval "2+3==" --history  # tape plus 8
//! echo "6×7=" | keycalc repl      # one key string per line
//! keycalc run                     # interactive
//! keycalc keys --keypad           # keypad layout
//! ```

use clap::Parser;
use keycalc_cli::{execute, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
