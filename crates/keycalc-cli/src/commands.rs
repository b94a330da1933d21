//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// keycalc: keypad calculator for the terminal
#[derive(Parser, Debug)]
#[command(name = "keycalc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, global = true)]
    pub color: Option<ColorArg>,

    /// Configuration file (YAML)
    #[arg(long, global = true, env = "KEYCALC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a key string and print the display
    ///
    /// Named keys go in braces: `12+7{Enter}`, `{AC}`, `{Backspace}`.
    Eval(EvalArgs),

    /// Read key strings from stdin, one line at a time
    Repl(ReplArgs),

    /// Interactive calculator in the terminal
    Run,

    /// Show the key map
    Keys(KeysArgs),

    /// Attach an in-process host bridge and exercise it
    Bridge(BridgeArgs),
}

/// Arguments for the eval command
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Keys to press, in order
    pub keys: String,

    /// Print the history tape
    #[arg(long)]
    pub history: bool,

    /// Reject unknown keys instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Print status messages
    #[arg(long)]
    pub status: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: EvalFormat,

    /// Maximum history lines kept
    #[arg(long)]
    pub history_limit: Option<usize>,
}

/// Arguments for the repl command
#[derive(Parser, Debug)]
pub struct ReplArgs {
    /// Reject lines containing unknown keys
    #[arg(long)]
    pub strict: bool,

    /// Print status messages
    #[arg(long)]
    pub status: bool,

    /// Maximum history lines kept
    #[arg(long)]
    pub history_limit: Option<usize>,
}

/// Arguments for the keys command
#[derive(Parser, Debug)]
pub struct KeysArgs {
    /// Show the keypad layout instead of the key map
    #[arg(long)]
    pub keypad: bool,
}

/// Arguments for the bridge command
#[derive(Parser, Debug)]
pub struct BridgeArgs {
    /// Skip the ready event and rely on polling
    #[arg(long)]
    pub poll: bool,

    /// Text for the echo round trip
    #[arg(long, default_value = "ping")]
    pub echo: String,

    /// Polling interval in milliseconds
    #[arg(long, default_value = "50")]
    pub interval_ms: u64,

    /// Polls before giving up
    #[arg(long, default_value = "100")]
    pub attempts: u32,
}

/// Output format for eval
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvalFormat {
    /// Plain text
    #[default]
    Text,
    /// JSON object with display and history
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_eval() {
            let cli = Cli::parse_from(["keycalc", "eval", "2+3="]);
            match cli.command {
                Commands::Eval(args) => {
                    assert_eq!(args.keys, "2+3=");
                    assert!(!args.history);
                    assert_eq!(args.format, EvalFormat::Text);
                }
                _ => panic!("expected eval"),
            }
        }

        #[test]
        fn test_parse_eval_flags() {
            let cli = Cli::parse_from([
                "keycalc",
                "eval",
                "1+1=",
                "--history",
                "--strict",
                "--format",
                "json",
                "--history-limit",
                "3",
            ]);
            match cli.command {
                Commands::Eval(args) => {
                    assert!(args.history);
                    assert!(args.strict);
                    assert_eq!(args.format, EvalFormat::Json);
                    assert_eq!(args.history_limit, Some(3));
                }
                _ => panic!("expected eval"),
            }
        }

        #[test]
        fn test_parse_global_flags() {
            let cli = Cli::parse_from([
                "keycalc", "-vv", "--color", "never", "--config", "k.yaml", "keys",
            ]);
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.color, Some(ColorArg::Never));
            assert_eq!(cli.config, Some(PathBuf::from("k.yaml")));
            assert!(matches!(cli.command, Commands::Keys(_)));
        }

        #[test]
        fn test_parse_global_flag_after_subcommand() {
            let cli = Cli::parse_from(["keycalc", "repl", "-q"]);
            assert!(cli.quiet);
            assert!(matches!(cli.command, Commands::Repl(_)));
        }

        #[test]
        fn test_parse_bridge_defaults() {
            let cli = Cli::parse_from(["keycalc", "bridge"]);
            match cli.command {
                Commands::Bridge(args) => {
                    assert!(!args.poll);
                    assert_eq!(args.echo, "ping");
                    assert_eq!(args.interval_ms, 50);
                    assert_eq!(args.attempts, 100);
                }
                _ => panic!("expected bridge"),
            }
        }

        #[test]
        fn test_parse_run() {
            let cli = Cli::parse_from(["keycalc", "run"]);
            assert!(matches!(cli.command, Commands::Run));
        }

        #[test]
        fn test_missing_subcommand_fails() {
            assert!(Cli::try_parse_from(["keycalc"]).is_err());
        }
    }

    mod color_tests {
        use super::*;
        use crate::config::ColorChoice;

        #[test]
        fn test_color_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        }
    }
}
